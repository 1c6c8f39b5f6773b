// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging for authenticated HTTP requests.
//!
//! Provides timing, status and redacted header logging for every call made
//! through [`crate::auth::AuthenticatedFetch`].
//!
//! # Example
//!
//! ```
//! use orderdash_core::runtime::{LogLevel, LoggingConfig, RequestLogger};
//!
//! let logger = RequestLogger::with_config(
//!     LoggingConfig::new()
//!         .with_success_level(LogLevel::Debug)
//!         .with_sensitive_header("x-partner-key"),
//! );
//! let span = logger.start("GET", "https://api.example.com/orders");
//! logger.finish_success(span, 200);
//! assert_eq!(logger.metrics().successful_requests(), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use http::HeaderMap;
use tracing::{debug, error, info, trace, warn};

/// Log level for request logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Trace level - most verbose.
    Trace,
    /// Debug level.
    #[default]
    Debug,
    /// Info level.
    Info,
    /// Warn level.
    Warn,
    /// Error level - only errors.
    Error,
    /// Disabled - no logging.
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

fn emit(level: LogLevel, msg: &str) {
    match level {
        LogLevel::Trace => trace!(target: "orderdash::http", "{}", msg),
        LogLevel::Debug => debug!(target: "orderdash::http", "{}", msg),
        LogLevel::Info => info!(target: "orderdash::http", "{}", msg),
        LogLevel::Warn => warn!(target: "orderdash::http", "{}", msg),
        LogLevel::Error => error!(target: "orderdash::http", "{}", msg),
        LogLevel::Off => {}
    }
}

fn default_sensitive_headers() -> Vec<String> {
    vec![
        "authorization".to_string(),
        "x-api-key".to_string(),
        "x-auth-token".to_string(),
    ]
}

/// Configuration for request logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for successful requests.
    pub success_level: LogLevel,
    /// Log level for failed requests.
    pub error_level: LogLevel,
    /// Whether to log outgoing request headers.
    pub log_headers: bool,
    /// Whether to redact sensitive headers.
    pub redact_sensitive: bool,
    /// List of sensitive header names to redact.
    pub sensitive_headers: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            success_level: LogLevel::Debug,
            error_level: LogLevel::Warn,
            log_headers: false,
            redact_sensitive: true,
            sensitive_headers: default_sensitive_headers(),
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success log level.
    #[must_use]
    pub fn with_success_level(mut self, level: LogLevel) -> Self {
        self.success_level = level;
        self
    }

    /// Set the error log level.
    #[must_use]
    pub fn with_error_level(mut self, level: LogLevel) -> Self {
        self.error_level = level;
        self
    }

    /// Enable or disable header logging.
    #[must_use]
    pub fn with_headers(mut self, enabled: bool) -> Self {
        self.log_headers = enabled;
        self
    }

    /// Enable or disable sensitive data redaction.
    #[must_use]
    pub fn with_redaction(mut self, enabled: bool) -> Self {
        self.redact_sensitive = enabled;
        self
    }

    /// Add a sensitive header to redact.
    #[must_use]
    pub fn with_sensitive_header(mut self, header: impl Into<String>) -> Self {
        self.sensitive_headers.push(header.into());
        self
    }

    /// Create a verbose configuration for debugging.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            success_level: LogLevel::Info,
            error_level: LogLevel::Error,
            log_headers: true,
            ..Self::default()
        }
    }

    /// Create a quiet configuration for production.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            success_level: LogLevel::Off,
            error_level: LogLevel::Warn,
            log_headers: false,
            ..Self::default()
        }
    }

    fn is_sensitive(&self, name: &str) -> bool {
        self.redact_sensitive
            && self
                .sensitive_headers
                .iter()
                .any(|h| h.eq_ignore_ascii_case(name))
    }
}

/// Request counters collected by a [`RequestLogger`].
#[derive(Debug, Default)]
pub struct RequestMetrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
}

impl RequestMetrics {
    /// Create a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful request.
    pub fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed request.
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of requests.
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Get the number of successful requests.
    #[must_use]
    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed)
    }

    /// Get the number of failed requests.
    #[must_use]
    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }

    /// Get the success rate (0.0 to 1.0).
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 1.0;
        }
        let successful = self.successful_requests.load(Ordering::Relaxed);
        successful as f64 / total as f64
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.successful_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
    }
}

/// A request logger that tracks timing and logs responses.
#[derive(Debug, Default)]
pub struct RequestLogger {
    config: LoggingConfig,
    metrics: RequestMetrics,
}

impl RequestLogger {
    /// Create a new request logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request logger with custom configuration.
    #[must_use]
    pub fn with_config(config: LoggingConfig) -> Self {
        Self {
            config,
            metrics: RequestMetrics::new(),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Get the metrics.
    #[must_use]
    pub fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// Render headers for logging, masking sensitive values.
    ///
    /// With redaction disabled every value is printed verbatim, including
    /// values flagged sensitive on the [`http::HeaderValue`] itself.
    #[must_use]
    pub fn redact_headers(&self, headers: &HeaderMap) -> String {
        let parts: Vec<String> = headers
            .iter()
            .map(|(name, value)| {
                let name = name.as_str();
                if self.config.is_sensitive(name) {
                    return format!("{}=[REDACTED]", name);
                }
                // HeaderValue's Debug hides values flagged sensitive
                match value.to_str() {
                    Ok(text) => format!("{}={:?}", name, text),
                    Err(_) => format!("{}={:?}", name, value),
                }
            })
            .collect();
        parts.join(", ")
    }

    /// Start tracking a request.
    #[must_use]
    pub fn start(&self, method: &str, url: &str) -> RequestSpan {
        RequestSpan {
            method: method.to_string(),
            url: url.to_string(),
            start: Instant::now(),
        }
    }

    /// Log outgoing headers, if enabled.
    pub fn log_request_headers(&self, span: &RequestSpan, headers: &HeaderMap) {
        if !self.config.log_headers || self.config.success_level == LogLevel::Off {
            return;
        }
        let msg = format!(
            "request {} {} headers=[{}]",
            span.method,
            span.url,
            self.redact_headers(headers)
        );
        emit(self.config.success_level, &msg);
    }

    /// Finish tracking a request that produced an HTTP response.
    pub fn finish_success(&self, span: RequestSpan, status: u16) {
        self.metrics.record_success();
        let elapsed = span.start.elapsed();

        if self.config.success_level == LogLevel::Off {
            return;
        }

        let msg = format!(
            "response: {} {} -> {} in {:?}",
            span.method, span.url, status, elapsed
        );
        emit(self.config.success_level, &msg);
    }

    /// Finish tracking a request that failed before a response arrived.
    pub fn finish_error(&self, span: RequestSpan, error: &str) {
        self.metrics.record_failure();
        let elapsed = span.start.elapsed();

        if self.config.error_level == LogLevel::Off {
            return;
        }

        let msg = format!(
            "error: {} {} failed in {:?}: {}",
            span.method, span.url, elapsed, error
        );
        emit(self.config.error_level, &msg);
    }
}

/// A span representing an in-flight request.
#[derive(Debug)]
pub struct RequestSpan {
    method: String,
    url: String,
    start: Instant,
}

impl RequestSpan {
    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{AUTHORIZATION, CONTENT_TYPE};
    use http::HeaderValue;

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "TRACE");
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Off.to_string(), "OFF");
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.success_level, LogLevel::Debug);
        assert_eq!(config.error_level, LogLevel::Warn);
        assert!(!config.log_headers);
        assert!(config.redact_sensitive);
        assert!(config
            .sensitive_headers
            .contains(&"authorization".to_string()));
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_success_level(LogLevel::Info)
            .with_error_level(LogLevel::Error)
            .with_headers(true)
            .with_redaction(false)
            .with_sensitive_header("x-partner-key");

        assert_eq!(config.success_level, LogLevel::Info);
        assert_eq!(config.error_level, LogLevel::Error);
        assert!(config.log_headers);
        assert!(!config.redact_sensitive);
        assert!(config
            .sensitive_headers
            .contains(&"x-partner-key".to_string()));
    }

    #[test]
    fn test_logging_config_presets() {
        assert!(LoggingConfig::verbose().log_headers);
        assert_eq!(LoggingConfig::quiet().success_level, LogLevel::Off);
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::new();
        assert_eq!(metrics.success_rate(), 1.0);

        metrics.record_success();
        metrics.record_success();
        metrics.record_failure();

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.successful_requests(), 2);
        assert_eq!(metrics.failed_requests(), 1);
        assert!((metrics.success_rate() - 0.666_666_666_666_666_6).abs() < 0.001);

        metrics.reset();
        assert_eq!(metrics.total_requests(), 0);
    }

    #[test]
    fn test_redact_headers() {
        let logger = RequestLogger::new();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let rendered = logger.redact_headers(&headers);
        assert!(rendered.contains("authorization=[REDACTED]"));
        assert!(rendered.contains("content-type=\"application/json\""));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_redaction_disabled() {
        let logger = RequestLogger::with_config(LoggingConfig::new().with_redaction(false));
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer visible"));

        assert!(logger.redact_headers(&headers).contains("visible"));
    }

    #[test]
    fn test_redaction_disabled_shows_flagged_bearer() {
        let headers = crate::auth::build_auth_headers(&HeaderMap::new(), "tok-42").unwrap();
        assert!(headers[AUTHORIZATION].is_sensitive());

        let plain = RequestLogger::with_config(LoggingConfig::new().with_redaction(false));
        assert!(plain
            .redact_headers(&headers)
            .contains("authorization=\"Bearer tok-42\""));

        let redacting = RequestLogger::new();
        assert!(!redacting.redact_headers(&headers).contains("tok-42"));
    }

    #[test]
    fn test_request_logger_lifecycle() {
        let logger = RequestLogger::new();
        let span = logger.start("GET", "http://localhost/orders");

        assert_eq!(span.method(), "GET");
        assert_eq!(span.url(), "http://localhost/orders");
        assert!(span.elapsed() < std::time::Duration::from_secs(1));

        logger.finish_success(span, 200);
        let span = logger.start("POST", "http://localhost/orders");
        logger.finish_error(span, "connection refused");

        assert_eq!(logger.metrics().total_requests(), 2);
        assert_eq!(logger.metrics().successful_requests(), 1);
        assert_eq!(logger.metrics().failed_requests(), 1);
    }
}
