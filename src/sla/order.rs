// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Order lifecycle state as reported by the partner API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Picking,
    Packed,
    Shipped,
    OutForDelivery,
    Delivered,
    Fulfilled,
    Cancelled,
    Returned,
    #[default]
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Delivered and fulfilled orders are outside SLA tracking.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Fulfilled)
    }
}

/// Upstream SLA flag carried alongside the timing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlaFlag {
    Active,
    Breach,
    Compliant,
    #[serde(other)]
    Other,
}

/// SLA timing block of an order.
///
/// The upstream fields are named `target_minutes` / `elapsed_minutes` but
/// hold seconds. Wire names are kept; the Rust fields say what they contain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlaInfo {
    #[serde(
        rename = "target_minutes",
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_seconds: Option<f64>,

    #[serde(
        rename = "elapsed_minutes",
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub elapsed_seconds: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SlaFlag>,
}

/// Timing value as a number or numeric string; anything else reads as absent.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

impl SlaInfo {
    /// Build an SLA block from second-valued timings.
    #[must_use]
    pub fn new(target_seconds: f64, elapsed_seconds: f64, status: SlaFlag) -> Self {
        Self {
            target_seconds: Some(target_seconds),
            elapsed_seconds: Some(elapsed_seconds),
            status: Some(status),
        }
    }
}

/// The subset of an order the SLA engine reads. Other fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: String,

    /// Missing or unrecognised values read as [`OrderStatus::Unknown`].
    #[serde(default)]
    pub status: OrderStatus,

    #[serde(
        rename = "slaInfo",
        alias = "sla_info",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sla_info: Option<SlaInfo>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// An order with no SLA block.
    pub fn new(id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: id.into(),
            status,
            sla_info: None,
            extra: Map::new(),
        }
    }

    /// Attach an SLA block.
    #[must_use]
    pub fn with_sla(mut self, sla_info: SlaInfo) -> Self {
        self.sla_info = Some(sla_info);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_wire_order() {
        let order: Order = serde_json::from_value(json!({
            "id": "ORD-1001",
            "status": "OUT_FOR_DELIVERY",
            "customer": "Acme",
            "slaInfo": {
                "target_minutes": 300,
                "elapsed_minutes": 120.5,
                "status": "ACTIVE"
            }
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::OutForDelivery);
        let sla = order.sla_info.as_ref().unwrap();
        assert_eq!(sla.target_seconds, Some(300.0));
        assert_eq!(sla.elapsed_seconds, Some(120.5));
        assert_eq!(sla.status, Some(SlaFlag::Active));
        assert_eq!(order.extra["customer"], "Acme");
    }

    #[test]
    fn test_unknown_values_tolerated() {
        let order: Order = serde_json::from_value(json!({
            "status": "ON_HOLD",
            "sla_info": { "status": "PAUSED", "target_minutes": null }
        }))
        .unwrap();

        assert_eq!(order.status, OrderStatus::Unknown);
        let sla = order.sla_info.unwrap();
        assert_eq!(sla.status, Some(SlaFlag::Other));
        assert_eq!(sla.target_seconds, None);
        assert_eq!(sla.elapsed_seconds, None);
    }

    #[test]
    fn test_missing_status_is_unknown() {
        let order: Order = serde_json::from_value(json!({ "id": "B" })).unwrap();
        assert_eq!(order.id, "B");
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.sla_info, None);

        let feed: Vec<Order> = serde_json::from_str(
            r#"[
                {"id":"A","status":"PROCESSING","slaInfo":{"target_minutes":300,"elapsed_minutes":310,"status":"ACTIVE"}},
                {"id":"B","slaInfo":{"target_minutes":300,"elapsed_minutes":10,"status":"ACTIVE"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].status, OrderStatus::Processing);
        assert_eq!(feed[1].status, OrderStatus::Unknown);
        assert_eq!(
            feed[1].sla_info.as_ref().and_then(|sla| sla.elapsed_seconds),
            Some(10.0)
        );
    }

    #[test]
    fn test_numeric_string_timings() {
        let sla: SlaInfo = serde_json::from_value(json!({
            "target_minutes": "300",
            "elapsed_minutes": " 42.5 ",
            "status": "ACTIVE"
        }))
        .unwrap();
        assert_eq!(sla.target_seconds, Some(300.0));
        assert_eq!(sla.elapsed_seconds, Some(42.5));

        let sla: SlaInfo =
            serde_json::from_value(json!({ "target_minutes": "soon", "elapsed_minutes": true }))
                .unwrap();
        assert_eq!(sla.target_seconds, None);
        assert_eq!(sla.elapsed_seconds, None);
    }

    #[test]
    fn test_serialize_keeps_wire_names() {
        let order = Order::new("ORD-7", OrderStatus::Processing)
            .with_sla(SlaInfo::new(300.0, 10.0, SlaFlag::Active));

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "PROCESSING");
        assert_eq!(value["slaInfo"]["target_minutes"], 300.0);
        assert_eq!(value["slaInfo"]["elapsed_minutes"], 10.0);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Fulfilled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(!OrderStatus::Cancelled.is_terminal());
    }
}
