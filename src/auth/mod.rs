// SPDX-License-Identifier: MIT OR Apache-2.0

//! Partner API authentication.
//!
//! A [`TokenManager`] owns a [`TokenCache`] and performs the login exchange
//! against `{base_url}/auth/poc-orderlist/login`. Managers are injectable and
//! cheap to clone; the free functions in this module use one process-wide
//! manager configured from the environment.
//!
//! # Example
//!
//! ```no_run
//! use orderdash_core::auth::TokenManager;
//! use orderdash_core::config::PartnerConfig;
//!
//! # async fn demo() -> orderdash_core::error::Result<()> {
//! let manager = TokenManager::new(PartnerConfig::load_with_env()?)?;
//! let client = manager.auth_client();
//! let orders: serde_json::Value = client.get_json("/orders").await?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod client;
mod fetch;
mod manager;

use std::sync::OnceLock;

pub use cache::{CachedToken, TokenCache, MAX_CACHE_TTL};
pub use client::AuthClient;
pub use fetch::{build_auth_headers, AuthenticatedFetch, FetchOptions};
pub use manager::{
    RefreshMode, TokenGrant, TokenManager, TokenManagerBuilder, DEFAULT_TOKEN_TTL, TOKEN_FIELDS,
};

use crate::config::PartnerConfig;
use crate::error::Result;

static GLOBAL_MANAGER: OnceLock<TokenManager> = OnceLock::new();

/// The process-wide manager, created from the environment on first use.
///
/// If two threads race the first call both load the config, and the first
/// to finish is kept.
pub fn global_manager() -> Result<&'static TokenManager> {
    if let Some(manager) = GLOBAL_MANAGER.get() {
        return Ok(manager);
    }
    let manager = TokenManager::new(PartnerConfig::load_with_env()?)?;
    Ok(GLOBAL_MANAGER.get_or_init(|| manager))
}

/// Get a bearer token from the process-wide manager.
pub async fn get_auth_token(force_refresh: bool) -> Result<String> {
    global_manager()?.get_auth_token(force_refresh).await
}

/// Fetch wrapper over the process-wide manager.
pub fn create_authenticated_fetch() -> Result<AuthenticatedFetch> {
    Ok(global_manager()?.authenticated_fetch())
}

/// Client over the process-wide manager.
pub fn create_auth_client() -> Result<AuthClient> {
    Ok(global_manager()?.auth_client())
}
