use crate::ids::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An order is read-only to the core: it is produced by the upstream
/// order-entry service and never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub items: Vec<OrderItem>,
    pub priority: Priority,
    pub gift_wrap: bool,
    pub total_value: f64,
    pub promised_delivery_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: String,
    pub qty: i64,
    pub weight: f64,
    pub flags: ItemFlags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFlags {
    pub fragile: bool,
    pub hazmat: bool,
    pub cold_chain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    // Ordered worst-to-best so `Ord` gives ascending urgency; callers sort
    // `.rev()` or compare directly as needed.
    Standard,
    NextDay,
    SameDay,
}

impl Order {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|i| i.weight * i.qty as f64).sum()
    }

    pub fn max_item_weight(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.weight)
            .fold(0.0_f64, f64::max)
    }
}
