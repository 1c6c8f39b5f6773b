// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

use super::order::{Order, SlaFlag};

/// Target assumed when an order carries no usable target.
pub const DEFAULT_TARGET_SECONDS: f64 = 300.0;

/// Fraction of the target below which remaining time counts as "approaching".
pub const CRITICAL_THRESHOLD_FRACTION: f64 = 0.2;

/// SLA verdict for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlaClassification {
    pub is_breach: bool,
    pub is_approaching: bool,
    pub is_compliant: bool,
    /// Never negative.
    pub remaining_seconds: f64,
    pub elapsed_seconds: f64,
    pub target_seconds: f64,
}

impl SlaClassification {
    fn terminal() -> Self {
        Self {
            is_breach: false,
            is_approaching: false,
            is_compliant: true,
            remaining_seconds: 0.0,
            elapsed_seconds: 0.0,
            target_seconds: 0.0,
        }
    }

    fn untracked() -> Self {
        Self {
            target_seconds: DEFAULT_TARGET_SECONDS,
            ..Self::terminal()
        }
    }

    /// Remaining time at or below which an in-flight order is approaching breach.
    #[must_use]
    pub fn critical_threshold_seconds(&self) -> f64 {
        self.target_seconds * CRITICAL_THRESHOLD_FRACTION
    }
}

/// Zero, NaN and absent values all fall back to `default`.
fn or_default(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v != 0.0 && !v.is_nan() => v,
        _ => default,
    }
}

/// Classify one order. Pure: no I/O, no shared state.
#[must_use]
pub fn calculate_sla_status(order: &Order) -> SlaClassification {
    let terminal = order.status.is_terminal();
    if terminal {
        return SlaClassification::terminal();
    }

    let Some(sla) = &order.sla_info else {
        return SlaClassification::untracked();
    };

    let target_seconds = or_default(sla.target_seconds, DEFAULT_TARGET_SECONDS);
    let elapsed_seconds = or_default(sla.elapsed_seconds, 0.0);

    let is_breach = elapsed_seconds > target_seconds || sla.status == Some(SlaFlag::Breach);

    let remaining_seconds = target_seconds - elapsed_seconds;
    let is_approaching = !is_breach
        && remaining_seconds <= target_seconds * CRITICAL_THRESHOLD_FRACTION
        && remaining_seconds > 0.0;

    let is_compliant =
        sla.status == Some(SlaFlag::Compliant) || terminal || (!is_breach && !is_approaching);

    SlaClassification {
        is_breach,
        is_approaching,
        is_compliant,
        remaining_seconds: remaining_seconds.max(0.0),
        elapsed_seconds,
        target_seconds,
    }
}

/// Orders currently in breach.
#[must_use]
pub fn filter_sla_breach(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| calculate_sla_status(order).is_breach)
        .collect()
}

/// Orders close to breaching.
#[must_use]
pub fn filter_approaching_sla(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| calculate_sla_status(order).is_approaching)
        .collect()
}

/// Percentage of compliant orders; an empty slice is 100% compliant.
#[must_use]
pub fn calculate_sla_compliance_rate(orders: &[Order]) -> f64 {
    if orders.is_empty() {
        return 100.0;
    }
    let compliant = orders
        .iter()
        .filter(|order| calculate_sla_status(order).is_compliant)
        .count();
    100.0 * compliant as f64 / orders.len() as f64
}

/// KPI counts for a set of orders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlaSummary {
    pub total: usize,
    pub breached: usize,
    pub approaching: usize,
    pub compliant: usize,
    pub compliance_rate: f64,
}

/// Classify every order once and tally the results.
#[must_use]
pub fn summarize(orders: &[Order]) -> SlaSummary {
    let mut summary = SlaSummary {
        total: orders.len(),
        breached: 0,
        approaching: 0,
        compliant: 0,
        compliance_rate: 100.0,
    };

    for status in orders.iter().map(calculate_sla_status) {
        summary.breached += usize::from(status.is_breach);
        summary.approaching += usize::from(status.is_approaching);
        summary.compliant += usize::from(status.is_compliant);
    }

    if summary.total > 0 {
        summary.compliance_rate = 100.0 * summary.compliant as f64 / summary.total as f64;
    }
    summary
}
