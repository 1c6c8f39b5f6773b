// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod auth;
pub mod config;
pub mod error;
pub mod runtime;
pub mod sla;

pub use auth::{get_auth_token, AuthClient, AuthenticatedFetch, TokenCache, TokenManager};
pub use config::PartnerConfig;
pub use error::{ErrorKind, OrderDashError};
pub use runtime::{is_retryable_error, retry_with_backoff, with_retry, RetryOptions};
pub use sla::{calculate_sla_status, Order, OrderStatus, SlaClassification};
