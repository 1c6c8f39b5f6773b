// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry policies and backoff strategies for resilient API calls.
//!
//! The retry loop is unconditional by default: every failure is retried until
//! `max_attempts` is reached. Selective retry is opt-in through
//! [`RetryOptions::retry_if`] or [`RetryOptions::only_retryable`], which
//! compose the [`is_retryable_error`] classifier into the loop.
//!
//! # Example
//!
//! ```
//! use orderdash_core::runtime::{retry_with_backoff, RetryOptions};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<u32, String> {
//! let options = RetryOptions::new()
//!     .max_attempts(5)
//!     .initial_delay(Duration::from_millis(200))
//!     .on_retry(|attempt, err: &String| eprintln!("attempt {attempt} failed: {err}"));
//!
//! retry_with_backoff(|| async { Ok::<_, String>(7) }, &options).await
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ErrorKind, OrderDashError};

/// HTTP statuses that usually signal transient server overload.
pub const RETRYABLE_STATUS_CODES: [u16; 4] = [429, 502, 503, 504];

/// Default fraction of the unjittered delay used as jitter amplitude.
pub const DEFAULT_JITTER_FRACTION: f64 = 0.1;

/// Default growth factor between attempts.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Defines a backoff strategy for retry delays.
pub trait BackoffStrategy: Clone + Send + Sync + 'static {
    /// Calculate the delay after a failed attempt.
    ///
    /// # Arguments
    /// * `attempt` - The attempt that just failed (1-indexed)
    fn delay(&self, attempt: u32) -> Duration;
}

// =============================================================================
// No Backoff
// =============================================================================

/// No delay between retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

impl NoBackoff {
    /// Create a new no-backoff strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl BackoffStrategy for NoBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

// =============================================================================
// Exponential Backoff
// =============================================================================

/// Exponential backoff with symmetric random jitter.
///
/// `delay = min(initial * factor^(attempt-1) + jitter, max)` where jitter is
/// drawn uniformly from `±jitter_fraction` of the unjittered delay.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter_fraction: f64,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff strategy.
    #[must_use]
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay: Duration::from_secs(30),
            multiplier: DEFAULT_MULTIPLIER,
            jitter_fraction: DEFAULT_JITTER_FRACTION,
        }
    }

    /// Set the maximum delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the multiplier for exponential growth.
    ///
    /// Values below 1 are treated as 1; non-finite values keep the default of 2.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = sanitize_multiplier(multiplier);
        self
    }

    /// Set the jitter amplitude as a fraction of the delay. `0.0` disables jitter.
    #[must_use]
    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Unjittered delay for `attempt`, in milliseconds.
    fn base_millis(&self, attempt: u32) -> f64 {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent)
    }
}

fn sanitize_multiplier(multiplier: f64) -> f64 {
    if multiplier.is_finite() {
        multiplier.max(1.0)
    } else {
        DEFAULT_MULTIPLIER
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_millis(attempt);
        let jitter = if self.jitter_fraction > 0.0 {
            // uniform in [-1, 1)
            let unit = rand::random::<f64>() * 2.0 - 1.0;
            base * self.jitter_fraction * unit
        } else {
            0.0
        };

        let capped = (base + jitter).min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

// =============================================================================
// Retryability
// =============================================================================

/// Classifies errors as transient (worth retrying) or permanent.
pub trait Retryable {
    /// Returns `true` if the failure is likely transient.
    fn is_retryable(&self) -> bool;
}

impl Retryable for OrderDashError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::Transport(_) | ErrorKind::Timeout => true,
            ErrorKind::AuthRejected | ErrorKind::HttpStatus => self
                .status()
                .is_some_and(|status| RETRYABLE_STATUS_CODES.contains(&status)),
            _ => false,
        }
    }
}

/// Advisory predicate: is this error worth retrying?
///
/// Not consulted by [`retry_with_backoff`] unless the options opt in.
pub fn is_retryable_error<E: Retryable + ?Sized>(error: &E) -> bool {
    error.is_retryable()
}

// =============================================================================
// Retry Options
// =============================================================================

type RetryObserver<E> = Arc<dyn Fn(u32, &E) + Send + Sync>;
type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Retry configuration for a single call site.
pub struct RetryOptions<E, B: BackoffStrategy = ExponentialBackoff> {
    max_attempts: u32,
    backoff: B,
    on_retry: Option<RetryObserver<E>>,
    retry_if: Option<RetryPredicate<E>>,
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: ExponentialBackoff::default(),
            on_retry: None,
            retry_if: None,
        }
    }
}

impl<E> RetryOptions<E> {
    /// Options with defaults: 3 attempts, 1s initial delay, 30s cap, factor 2.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay after the first failure.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.backoff.initial_delay = delay;
        self
    }

    /// Set the delay cap.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.backoff.max_delay = delay;
        self
    }

    /// Set the growth factor between attempts (same bounds as
    /// [`ExponentialBackoff::with_multiplier`]).
    #[must_use]
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff.multiplier = sanitize_multiplier(factor);
        self
    }
}

impl<E, B: BackoffStrategy> RetryOptions<E, B> {
    /// Set the total number of attempts (values below 1 are treated as 1).
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Replace the backoff strategy.
    #[must_use]
    pub fn backoff<B2: BackoffStrategy>(self, backoff: B2) -> RetryOptions<E, B2> {
        RetryOptions {
            max_attempts: self.max_attempts,
            backoff,
            on_retry: self.on_retry,
            retry_if: self.retry_if,
        }
    }

    /// Register a callback invoked with the attempt number and error before each retry.
    #[must_use]
    pub fn on_retry(mut self, observer: impl Fn(u32, &E) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(observer));
        self
    }

    /// Only retry errors accepted by `predicate`; others are returned immediately.
    #[must_use]
    pub fn retry_if(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.retry_if = Some(Arc::new(predicate));
        self
    }

    /// Get the configured attempt limit.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the backoff strategy.
    #[must_use]
    pub fn backoff_strategy(&self) -> &B {
        &self.backoff
    }

    /// Execute an async operation with retry logic.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt >= max_attempts {
                        warn!(
                            target: "orderdash::retry",
                            attempt,
                            error = %e,
                            "retries exhausted"
                        );
                        return Err(e);
                    }

                    if let Some(predicate) = &self.retry_if {
                        if !predicate(&e) {
                            debug!(target: "orderdash::retry", attempt, error = %e, "error not retryable");
                            return Err(e);
                        }
                    }

                    if let Some(observer) = &self.on_retry {
                        observer(attempt, &e);
                    }

                    let delay = self.backoff.delay(attempt);
                    warn!(
                        target: "orderdash::retry",
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "attempt failed, retrying"
                    );
                    drop(e);
                    tokio::time::sleep(delay).await;

                    attempt += 1;
                }
            }
        }
    }
}

impl<E: Retryable + 'static, B: BackoffStrategy> RetryOptions<E, B> {
    /// Only retry errors classified retryable by [`is_retryable_error`].
    #[must_use]
    pub fn only_retryable(self) -> Self {
        self.retry_if(|e: &E| is_retryable_error(e))
    }
}

impl<E, B: BackoffStrategy> Clone for RetryOptions<E, B> {
    fn clone(&self) -> Self {
        Self {
            max_attempts: self.max_attempts,
            backoff: self.backoff.clone(),
            on_retry: self.on_retry.clone(),
            retry_if: self.retry_if.clone(),
        }
    }
}

impl<E, B: BackoffStrategy + fmt::Debug> fmt::Debug for RetryOptions<E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("on_retry", &self.on_retry.is_some())
            .field("retry_if", &self.retry_if.is_some())
            .finish()
    }
}

/// Run `operation` under `options`, returning the last error unchanged on exhaustion.
pub async fn retry_with_backoff<T, E, F, Fut, B>(
    operation: F,
    options: &RetryOptions<E, B>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
    B: BackoffStrategy,
{
    options.execute(operation).await
}

/// Boxed future returned by [`with_retry`] wrappers.
pub type RetryFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

/// Wrap `f` so that every invocation runs under `options`.
///
/// Arguments are cloned for each attempt.
pub fn with_retry<A, T, E, F, Fut, B>(
    f: F,
    options: RetryOptions<E, B>,
) -> impl Fn(A) -> RetryFuture<T, E> + Clone + Send + Sync
where
    A: Clone + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
    B: BackoffStrategy,
{
    let f = Arc::new(f);
    let options = Arc::new(options);
    move |args: A| {
        let f = Arc::clone(&f);
        let options = Arc::clone(&options);
        Box::pin(async move {
            let operation = move || f(args.clone());
            options.execute(operation).await
        })
    }
}
