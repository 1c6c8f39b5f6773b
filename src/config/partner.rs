// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partner API configuration
//!
//! Credentials and endpoint for the partner order-list API. Values are
//! layered: built-in development defaults, then an optional YAML file, then
//! environment variables.
//!
//! # Example
//!
//! ```no_run
//! use orderdash_core::config::PartnerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PartnerConfig::load_with_env()?;
//! println!("Logging in at {}", config.login_url()?);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{OrderDashError, Result};

/// Environment variable pointing at a YAML config file.
pub const ENV_CONFIG_PATH: &str = "ORDERDASH_CONFIG";
/// Environment variable overriding the API base URL.
pub const ENV_API_BASE_URL: &str = "ORDERDASH_API_BASE_URL";
/// Environment variable overriding the partner client id.
pub const ENV_PARTNER_CLIENT_ID: &str = "ORDERDASH_PARTNER_CLIENT_ID";
/// Environment variable overriding the partner client secret.
pub const ENV_PARTNER_CLIENT_SECRET: &str = "ORDERDASH_PARTNER_CLIENT_SECRET";

/// Path of the login endpoint, relative to the base URL.
pub const LOGIN_PATH: &str = "/auth/poc-orderlist/login";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_CLIENT_ID: &str = "poc-orderlist-dev";
const DEFAULT_CLIENT_SECRET: &str = "dev-secret";
const DEFAULT_LOGIN_TIMEOUT_MS: u64 = 15_000;

/// Connection settings for the partner API.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PartnerConfig {
    /// Base URL of the partner API, e.g. `https://partner.example.com/api`
    pub base_url: String,

    /// Partner client identifier sent on login
    pub client_id: String,

    /// Partner client secret sent on login
    pub client_secret: String,

    /// Upper bound on a single login exchange, in milliseconds
    pub login_timeout_ms: u64,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            login_timeout_ms: DEFAULT_LOGIN_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for PartnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("login_timeout_ms", &self.login_timeout_ms)
            .finish()
    }
}

impl PartnerConfig {
    /// Create a configuration with explicit values and the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            login_timeout_ms: DEFAULT_LOGIN_TIMEOUT_MS,
        }
    }

    /// Set the login timeout, kept at millisecond precision (minimum 1 ms).
    #[must_use]
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        self
    }

    /// Load configuration from the config file (if any) with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly configured file cannot be read, the
    /// file is malformed, or the resulting configuration is invalid.
    pub fn load_with_env() -> Result<Self> {
        let config = Self::load_default()?.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from `$ORDERDASH_CONFIG`, else `~/.orderdash/config.yaml`, else defaults.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load_default() -> Result<Self> {
        if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
            return Self::load_from_path(env_path);
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file is malformed YAML
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            OrderDashError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| OrderDashError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    /// Get the default config file path (~/.orderdash/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            OrderDashError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".orderdash").join("config.yaml"))
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = non_empty(ENV_API_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(client_id) = non_empty(ENV_PARTNER_CLIENT_ID) {
            self.client_id = client_id;
        }
        if let Some(client_secret) = non_empty(ENV_PARTNER_CLIENT_SECRET) {
            self.client_secret = client_secret;
        }
        self
    }

    /// Check that the configuration can be used for a login exchange.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| OrderDashError::Config(format!("Invalid base URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(OrderDashError::Config(format!(
                "Unsupported base URL scheme: {}",
                url.scheme()
            )));
        }
        if self.client_id.trim().is_empty() {
            return Err(OrderDashError::Config(
                "Partner client id is empty".to_string(),
            ));
        }
        if self.client_secret.trim().is_empty() {
            return Err(OrderDashError::Config(
                "Partner client secret is empty".to_string(),
            ));
        }
        if self.login_timeout_ms == 0 {
            return Err(OrderDashError::Config(
                "Login timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of the login endpoint.
    pub fn login_url(&self) -> Result<url::Url> {
        self.join(LOGIN_PATH)
    }

    /// Resolve `path` against the base URL, keeping any base path prefix.
    pub fn join(&self, path: &str) -> Result<url::Url> {
        let full = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url::Url::parse(&full)
            .map_err(|e| OrderDashError::Config(format!("Invalid URL {full}: {e}")))
    }

    /// Login timeout as a [`Duration`].
    #[must_use]
    pub fn login_timeout(&self) -> Duration {
        Duration::from_millis(self.login_timeout_ms)
    }
}
