// SPDX-License-Identifier: MIT OR Apache-2.0

//! SLA evaluation for in-flight orders.
//!
//! Everything here is pure and safe to call concurrently. Upstream timing
//! fields are labelled in minutes but carry seconds; see [`SlaInfo`].
//!
//! # Example
//!
//! ```
//! use orderdash_core::sla::{calculate_sla_status, Order, OrderStatus, SlaFlag, SlaInfo};
//!
//! let order = Order::new("ORD-1", OrderStatus::Processing)
//!     .with_sla(SlaInfo::new(300.0, 250.0, SlaFlag::Active));
//!
//! let status = calculate_sla_status(&order);
//! assert!(status.is_approaching);
//! assert_eq!(status.remaining_seconds, 50.0);
//! ```

mod order;
mod status;

pub use order::{Order, OrderStatus, SlaFlag, SlaInfo};
pub use status::{
    calculate_sla_compliance_rate, calculate_sla_status, filter_approaching_sla,
    filter_sla_breach, summarize, SlaClassification, SlaSummary, CRITICAL_THRESHOLD_FRACTION,
    DEFAULT_TARGET_SECONDS,
};
