// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token cache with absolute expiry.

use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Upper bound on how long any token is cached, whatever the server claims.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A token together with the instant it stops being usable.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Create a token that expires `ttl` (capped at [`MAX_CACHE_TTL`]) after `issued_at`.
    #[must_use]
    pub fn new(token: impl Into<String>, issued_at: Instant, ttl: Duration) -> Self {
        Self {
            token: token.into(),
            expires_at: issued_at + ttl.min(MAX_CACHE_TTL),
        }
    }

    /// The opaque token value.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Instant after which the token is stale.
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// A token is usable strictly before its expiry instant.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Time left before expiry, zero once stale.
    #[must_use]
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Shared token slot. Writers overwrite unconditionally (last write wins).
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token if present and unexpired.
    pub async fn valid_token(&self) -> Option<String> {
        self.valid_token_at(Instant::now()).await
    }

    /// Return the cached token if it is still valid at `now`.
    pub async fn valid_token_at(&self, now: Instant) -> Option<String> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.is_valid_at(now))
            .map(|cached| cached.token.clone())
    }

    /// Store a freshly issued token valid for `ttl` from now.
    pub async fn store(&self, token: impl Into<String>, ttl: Duration) -> CachedToken {
        let cached = CachedToken::new(token, Instant::now(), ttl);
        *self.slot.write().await = Some(cached.clone());
        cached
    }

    /// Drop the cached token so the next lookup misses.
    pub async fn invalidate(&self) {
        self.slot.write().await.take();
    }

    /// Current cache contents, valid or not.
    pub async fn snapshot(&self) -> Option<CachedToken> {
        self.slot.read().await.clone()
    }
}
