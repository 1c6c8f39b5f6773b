// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error as _;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The remote end refused the connection.
    ConnectionRefused,
    /// Host name resolution failed.
    Dns,
    /// The connection was reset or aborted mid-flight.
    Reset,
    /// Any other connect/IO failure.
    Other,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::ConnectionRefused => write!(f, "connection refused"),
            TransportKind::Dns => write!(f, "dns failure"),
            TransportKind::Reset => write!(f, "connection reset"),
            TransportKind::Other => write!(f, "transport failure"),
        }
    }
}

/// Flat classification of [`OrderDashError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transport(TransportKind),
    Timeout,
    AuthRejected,
    MissingToken,
    InvalidResponse,
    HttpStatus,
    Validation,
    Unknown,
}

#[derive(Debug, Error)]
pub enum OrderDashError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error ({kind}): {message}")]
    Transport {
        kind: TransportKind,
        message: String,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Authentication failed: {status} {status_text}")]
    AuthRejected { status: u16, status_text: String },

    #[error("No token in authentication response")]
    MissingToken,

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {status} {status_text}")]
    HttpStatus { status: u16, status_text: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl OrderDashError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderDashError::Config(_) => ErrorKind::Config,
            OrderDashError::Transport { kind, .. } => ErrorKind::Transport(*kind),
            OrderDashError::Timeout(_) => ErrorKind::Timeout,
            OrderDashError::AuthRejected { .. } => ErrorKind::AuthRejected,
            OrderDashError::MissingToken => ErrorKind::MissingToken,
            OrderDashError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            OrderDashError::HttpStatus { .. } => ErrorKind::HttpStatus,
            OrderDashError::Validation(_) => ErrorKind::Validation,
            OrderDashError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            OrderDashError::AuthRejected { status, .. }
            | OrderDashError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an error from a non-success HTTP status.
    pub(crate) fn http_status(status: reqwest::StatusCode) -> Self {
        OrderDashError::HttpStatus {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// Map a reqwest failure, reporting `timeout` when the request deadline hit.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return OrderDashError::Timeout(timeout);
        }
        if err.is_decode() {
            return OrderDashError::InvalidResponse(err.to_string());
        }
        if err.is_builder() {
            return OrderDashError::Config(err.to_string());
        }
        let kind = transport_kind(&err);
        OrderDashError::Transport {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for OrderDashError {
    fn from(err: reqwest::Error) -> Self {
        OrderDashError::from_reqwest(err, Duration::ZERO)
    }
}

/// Walk the source chain looking for an IO error that tells us what went wrong.
fn transport_kind(err: &reqwest::Error) -> TransportKind {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => return TransportKind::ConnectionRefused,
                std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof => return TransportKind::Reset,
                _ => {}
            }
        }
        // hyper-util reports resolver failures as "dns error: ..."
        if cause.to_string().starts_with("dns error") {
            return TransportKind::Dns;
        }
        source = cause.source();
    }
    TransportKind::Other
}

pub type Result<T> = std::result::Result<T, OrderDashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            OrderDashError::Config("x".into()).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            OrderDashError::Timeout(Duration::from_secs(15)).kind(),
            ErrorKind::Timeout
        );
        assert_eq!(OrderDashError::MissingToken.kind(), ErrorKind::MissingToken);
        assert_eq!(
            OrderDashError::Transport {
                kind: TransportKind::Dns,
                message: "lookup failed".into(),
            }
            .kind(),
            ErrorKind::Transport(TransportKind::Dns)
        );
    }

    #[test]
    fn test_status_accessor() {
        let rejected = OrderDashError::AuthRejected {
            status: 401,
            status_text: "Unauthorized".into(),
        };
        assert_eq!(rejected.status(), Some(401));
        assert_eq!(OrderDashError::MissingToken.status(), None);
    }

    #[test]
    fn test_http_status_constructor() {
        let err = OrderDashError::http_status(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Request failed: 503 Service Unavailable");
    }

    #[test]
    fn test_display_messages() {
        let rejected = OrderDashError::AuthRejected {
            status: 403,
            status_text: "Forbidden".into(),
        };
        assert_eq!(rejected.to_string(), "Authentication failed: 403 Forbidden");
        assert_eq!(
            OrderDashError::MissingToken.to_string(),
            "No token in authentication response"
        );
    }
}
