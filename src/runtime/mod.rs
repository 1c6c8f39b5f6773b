// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime utilities for resilience and observability.
//!
//! This module provides the retry engine used around flaky partner endpoints
//! and the request logger used by the authenticated fetch wrapper.

mod logging;
mod retry;

pub use logging::{LogLevel, LoggingConfig, RequestLogger, RequestMetrics, RequestSpan};
pub use retry::{
    is_retryable_error, retry_with_backoff, with_retry, BackoffStrategy, ExponentialBackoff,
    NoBackoff, RetryFuture, RetryOptions, Retryable, DEFAULT_JITTER_FRACTION,
    DEFAULT_MULTIPLIER, RETRYABLE_STATUS_CODES,
};
