// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-authenticated HTTP requests.

use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;

use super::manager::TokenManager;
use crate::error::{OrderDashError, Result};

const JSON: &str = "application/json";

/// Per-request options for [`AuthenticatedFetch::fetch`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// A plain GET.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A request with the given method and no body.
    #[must_use]
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Add (or replace) a caller header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| OrderDashError::Validation(format!("Invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| OrderDashError::Validation(format!("Invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(body)
            .map_err(|e| OrderDashError::Validation(format!("Failed to encode body: {e}")))?;
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    /// Use raw bytes as the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Bound this request by `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Copy the caller's headers and add the bearer token and JSON content headers.
///
/// Auth and content headers override caller values of the same name; every
/// other caller header is kept. The caller's map is left untouched.
pub fn build_auth_headers(caller: &HeaderMap, token: &str) -> Result<HeaderMap> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        OrderDashError::InvalidResponse("token is not a valid header value".to_string())
    })?;
    bearer.set_sensitive(true);

    let mut headers = caller.clone();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON));
    Ok(headers)
}

/// Issues requests with a bearer token from a [`TokenManager`].
#[derive(Debug, Clone)]
pub struct AuthenticatedFetch {
    manager: TokenManager,
}

impl AuthenticatedFetch {
    pub(crate) fn new(manager: TokenManager) -> Self {
        Self { manager }
    }

    /// The token manager behind this wrapper.
    #[must_use]
    pub fn manager(&self) -> &TokenManager {
        &self.manager
    }

    /// Send a request to `url` with a cached (or freshly acquired) token.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<reqwest::Response> {
        let token = self.manager.get_auth_token(false).await?;
        self.send_with_token(url, options, &token).await
    }

    /// Send a request with an explicit token, bypassing the cache.
    pub async fn send_with_token(
        &self,
        url: &str,
        options: &FetchOptions,
        token: &str,
    ) -> Result<reqwest::Response> {
        let url = url::Url::parse(url)
            .map_err(|e| OrderDashError::Validation(format!("Invalid URL {url}: {e}")))?;
        let headers = build_auth_headers(&options.headers, token)?;

        let logger = self.manager.logger();
        let span = logger.start(options.method.as_str(), url.as_str());
        logger.log_request_headers(&span, &headers);

        let mut request = self
            .manager
            .http()
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        match request.send().await {
            Ok(response) => {
                logger.finish_success(span, response.status().as_u16());
                Ok(response)
            }
            Err(e) => {
                let err = OrderDashError::from_reqwest(e, options.timeout.unwrap_or_default());
                logger.finish_error(span, &err.to_string());
                Err(err)
            }
        }
    }
}
