// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token lifecycle: cached fast path, login exchange and forced refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use super::cache::TokenCache;
use super::client::AuthClient;
use super::fetch::AuthenticatedFetch;
use crate::config::PartnerConfig;
use crate::error::{OrderDashError, Result};
use crate::runtime::{LoggingConfig, RequestLogger};

/// Token lifetime assumed when the login response carries no `expires_in`.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Response fields probed for the token, in priority order.
pub const TOKEN_FIELDS: [&str; 3] = ["token", "access_token", "accessToken"];

/// How concurrent cache misses are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Every caller that misses logs in; the last completed login wins the cache.
    #[default]
    LastWriterWins,
    /// Cache misses queue on a refresh gate and re-check the cache, so one
    /// login serves all waiting callers.
    SingleFlight,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    partner_client_id: &'a str,
    partner_client_secret: &'a str,
}

/// Token and lifetime extracted from a login response.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub token: String,
    pub ttl: Duration,
}

impl TokenGrant {
    /// Extract a grant from a login response body.
    ///
    /// Returns `None` when none of [`TOKEN_FIELDS`] holds a non-empty string.
    #[must_use]
    pub fn from_json(payload: &Value) -> Option<Self> {
        let token = TOKEN_FIELDS.iter().find_map(|field| {
            payload
                .get(field)
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
        })?;

        Some(Self {
            token: token.to_string(),
            ttl: expires_in(payload).unwrap_or(DEFAULT_TOKEN_TTL),
        })
    }
}

/// `expires_in` as seconds; numeric strings are accepted, non-positive values ignored.
fn expires_in(payload: &Value) -> Option<Duration> {
    let secs = match payload.get("expires_in")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

struct Inner {
    config: PartnerConfig,
    http: reqwest::Client,
    cache: Arc<TokenCache>,
    mode: RefreshMode,
    refresh_gate: Mutex<()>,
    logger: RequestLogger,
    logins: AtomicU64,
}

/// Acquires, caches and refreshes the partner bearer token.
///
/// Cloning is cheap; clones share the cache, HTTP client and counters.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("config", &self.inner.config)
            .field("mode", &self.inner.mode)
            .field("logins", &self.login_count())
            .finish()
    }
}

impl TokenManager {
    /// Create a manager with its own empty cache.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` is invalid or the HTTP client cannot be built.
    pub fn new(config: PartnerConfig) -> Result<Self> {
        TokenManagerBuilder::new(config).build()
    }

    /// Start building a manager with non-default collaborators.
    pub fn builder(config: PartnerConfig) -> TokenManagerBuilder {
        TokenManagerBuilder::new(config)
    }

    /// Get a bearer token, logging in when the cache is empty, stale or `force_refresh` is set.
    pub async fn get_auth_token(&self, force_refresh: bool) -> Result<String> {
        if !force_refresh {
            if let Some(token) = self.inner.cache.valid_token().await {
                trace!(target: "orderdash::auth", "using cached token");
                return Ok(token);
            }
        }

        match self.inner.mode {
            RefreshMode::LastWriterWins => self.refresh().await,
            RefreshMode::SingleFlight => {
                let _gate = self.inner.refresh_gate.lock().await;
                if !force_refresh {
                    if let Some(token) = self.inner.cache.valid_token().await {
                        trace!(target: "orderdash::auth", "token refreshed by concurrent caller");
                        return Ok(token);
                    }
                }
                self.refresh().await
            }
        }
    }

    /// Drop the cached token.
    pub async fn invalidate(&self) {
        debug!(target: "orderdash::auth", "invalidating cached token");
        self.inner.cache.invalidate().await;
    }

    /// The cache backing this manager.
    #[must_use]
    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.inner.cache
    }

    /// The partner configuration.
    #[must_use]
    pub fn config(&self) -> &PartnerConfig {
        &self.inner.config
    }

    /// Number of login exchanges issued so far.
    #[must_use]
    pub fn login_count(&self) -> u64 {
        self.inner.logins.load(Ordering::Relaxed)
    }

    /// Request logger shared by this manager and its fetch wrappers.
    #[must_use]
    pub fn logger(&self) -> &RequestLogger {
        &self.inner.logger
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Build a fetch wrapper that injects this manager's bearer token.
    #[must_use]
    pub fn authenticated_fetch(&self) -> AuthenticatedFetch {
        AuthenticatedFetch::new(self.clone())
    }

    /// Build a client bound to the configured base URL.
    #[must_use]
    pub fn auth_client(&self) -> AuthClient {
        AuthClient::new(self.authenticated_fetch())
    }

    async fn refresh(&self) -> Result<String> {
        let grant = self.login().await?;
        self.inner.cache.store(grant.token.clone(), grant.ttl).await;
        info!(
            target: "orderdash::auth",
            ttl_secs = grant.ttl.as_secs(),
            "partner token refreshed"
        );
        Ok(grant.token)
    }

    async fn login(&self) -> Result<TokenGrant> {
        let config = &self.inner.config;
        let url = config.login_url()?;
        let timeout = config.login_timeout();
        let body = LoginRequest {
            partner_client_id: &config.client_id,
            partner_client_secret: &config.client_secret,
        };

        self.inner.logins.fetch_add(1, Ordering::Relaxed);
        let span = self.inner.logger.start("POST", url.as_str());

        let response = match self
            .inner
            .http
            .post(url.clone())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = OrderDashError::from_reqwest(e, timeout);
                self.inner.logger.finish_error(span, &err.to_string());
                return Err(err);
            }
        };

        let status = response.status();
        self.inner.logger.finish_success(span, status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                target: "orderdash::auth",
                status = status.as_u16(),
                body = %body,
                "partner login rejected"
            );
            return Err(OrderDashError::AuthRejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| OrderDashError::from_reqwest(e, timeout))?;
        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|e| OrderDashError::InvalidResponse(e.to_string()))?;

        TokenGrant::from_json(&payload).ok_or_else(|| {
            warn!(target: "orderdash::auth", "login response carried no token");
            OrderDashError::MissingToken
        })
    }
}

/// Builder for [`TokenManager`].
pub struct TokenManagerBuilder {
    config: PartnerConfig,
    http: Option<reqwest::Client>,
    cache: Option<Arc<TokenCache>>,
    mode: RefreshMode,
    logging: LoggingConfig,
}

impl TokenManagerBuilder {
    fn new(config: PartnerConfig) -> Self {
        Self {
            config,
            http: None,
            cache: None,
            mode: RefreshMode::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Share an existing cache instead of creating a fresh one.
    #[must_use]
    pub fn cache(mut self, cache: Arc<TokenCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Set the refresh mode.
    #[must_use]
    pub fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the request logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Build the manager.
    pub fn build(self) -> Result<TokenManager> {
        self.config.validate()?;
        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| OrderDashError::Config(format!("Failed to build HTTP client: {e}")))?,
        };

        Ok(TokenManager {
            inner: Arc::new(Inner {
                config: self.config,
                http,
                cache: self.cache.unwrap_or_default(),
                mode: self.mode,
                refresh_gate: Mutex::new(()),
                logger: RequestLogger::with_config(self.logging),
                logins: AtomicU64::new(0),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grant_field_priority() {
        let payload = json!({
            "accessToken": "camel",
            "access_token": "snake",
            "token": "plain",
        });
        assert_eq!(TokenGrant::from_json(&payload).unwrap().token, "plain");

        let payload = json!({ "accessToken": "camel", "access_token": "snake" });
        assert_eq!(TokenGrant::from_json(&payload).unwrap().token, "snake");

        let payload = json!({ "accessToken": "camel" });
        assert_eq!(TokenGrant::from_json(&payload).unwrap().token, "camel");
    }

    #[test]
    fn test_grant_skips_empty_and_non_string_tokens() {
        let payload = json!({ "token": "", "access_token": 42, "accessToken": "real" });
        assert_eq!(TokenGrant::from_json(&payload).unwrap().token, "real");
    }

    #[test]
    fn test_grant_missing_token() {
        assert!(TokenGrant::from_json(&json!({ "expires_in": 60 })).is_none());
        assert!(TokenGrant::from_json(&json!([])).is_none());
    }

    #[test]
    fn test_grant_expiry() {
        let grant = TokenGrant::from_json(&json!({ "token": "t", "expires_in": 120 })).unwrap();
        assert_eq!(grant.ttl, Duration::from_secs(120));

        let grant = TokenGrant::from_json(&json!({ "token": "t", "expires_in": "90" })).unwrap();
        assert_eq!(grant.ttl, Duration::from_secs(90));

        let grant = TokenGrant::from_json(&json!({ "token": "t" })).unwrap();
        assert_eq!(grant.ttl, DEFAULT_TOKEN_TTL);

        let grant = TokenGrant::from_json(&json!({ "token": "t", "expires_in": 0 })).unwrap();
        assert_eq!(grant.ttl, DEFAULT_TOKEN_TTL);
    }

    #[test]
    fn test_login_request_wire_format() {
        let body = LoginRequest {
            partner_client_id: "id",
            partner_client_secret: "secret",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "partnerClientId": "id", "partnerClientSecret": "secret" })
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = TokenManager::new(PartnerConfig::new("::nope::", "id", "secret"));
        assert!(matches!(result, Err(OrderDashError::Config(_))));
    }

    #[tokio::test]
    async fn test_cached_token_skips_login() {
        let cache = Arc::new(TokenCache::new());
        cache.store("warm", Duration::from_secs(60)).await;

        let manager = TokenManager::builder(PartnerConfig::default())
            .cache(cache)
            .build()
            .unwrap();

        assert_eq!(manager.get_auth_token(false).await.unwrap(), "warm");
        assert_eq!(manager.login_count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let manager = TokenManager::new(PartnerConfig::new("http://127.0.0.1:9", "id", "secret"))
            .unwrap();

        let err = manager.get_auth_token(false).await.unwrap_err();
        assert!(crate::runtime::is_retryable_error(&err), "got {err:?}");
        assert_eq!(manager.login_count(), 1);
    }
}
