// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated client bound to the partner API base URL.

use http::Method;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::fetch::{AuthenticatedFetch, FetchOptions};
use crate::error::{OrderDashError, Result};
use crate::runtime::RetryOptions;

/// Convenience client over [`AuthenticatedFetch`].
///
/// A `401 Unauthorized` triggers one forced token refresh and a replay of
/// the request. With [`AuthClient::with_retry`], checked calls are retried
/// on transient failures only.
#[derive(Debug, Clone)]
pub struct AuthClient {
    fetch: AuthenticatedFetch,
    retry: Option<RetryOptions<OrderDashError>>,
}

impl AuthClient {
    pub(crate) fn new(fetch: AuthenticatedFetch) -> Self {
        Self { fetch, retry: None }
    }

    /// Retry checked calls under `options`, limited to retryable errors.
    #[must_use]
    pub fn with_retry(mut self, options: RetryOptions<OrderDashError>) -> Self {
        self.retry = Some(options.only_retryable());
        self
    }

    /// The underlying fetch wrapper.
    #[must_use]
    pub fn fetch(&self) -> &AuthenticatedFetch {
        &self.fetch
    }

    /// Send a request to `path` and return the raw response, whatever its status.
    pub async fn request(&self, path: &str, options: &FetchOptions) -> Result<reqwest::Response> {
        let url = self.fetch.manager().config().join(path)?;
        let response = self.fetch.fetch(url.as_str(), options).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!(
            target: "orderdash::auth",
            path,
            "request unauthorized, forcing token refresh"
        );
        let token = self.fetch.manager().get_auth_token(true).await?;
        self.fetch.send_with_token(url.as_str(), options, &token).await
    }

    /// Send a request and turn non-2xx responses into [`OrderDashError::HttpStatus`].
    pub async fn request_checked(
        &self,
        path: &str,
        options: &FetchOptions,
    ) -> Result<reqwest::Response> {
        match &self.retry {
            Some(retry) => {
                retry
                    .execute(|| self.request_checked_once(path, options))
                    .await
            }
            None => self.request_checked_once(path, options).await,
        }
    }

    async fn request_checked_once(
        &self,
        path: &str,
        options: &FetchOptions,
    ) -> Result<reqwest::Response> {
        let response = self.request(path, options).await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(OrderDashError::http_status(status))
        }
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        self.request_checked(path, &FetchOptions::get()).await
    }

    /// DELETE `path`.
    pub async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        self.request_checked(path, &FetchOptions::method(Method::DELETE))
            .await
    }

    /// POST `body` as JSON to `path`.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let options = FetchOptions::method(Method::POST).json(body)?;
        self.request_checked(path, &options).await
    }

    /// PUT `body` as JSON to `path`.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let options = FetchOptions::method(Method::PUT).json(body)?;
        self.request_checked(path, &options).await
    }

    /// PATCH `body` as JSON to `path`.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let options = FetchOptions::method(Method::PATCH).json(body)?;
        self.request_checked(path, &options).await
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(self.get(path).await?).await
    }

    /// POST `body` to `path` and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(self.post(path, body).await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| OrderDashError::InvalidResponse(e.to_string()))
}
