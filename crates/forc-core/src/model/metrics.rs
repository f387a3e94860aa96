use crate::ids::{OrderId, StationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// In-memory, per-facility snapshot regenerated once per optimization
/// cycle (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingMetricsSnapshot {
    pub station_utilization: HashMap<StationId, f64>,
    pub capacity_constrained_rate: f64,
    pub average_confidence: f64,
    pub route_changes: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceEvent {
    pub order_id: OrderId,
    pub from: StationId,
    pub to: StationId,
    pub before_util: f64,
    pub after_util: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityHealth {
    Healthy,
    Degraded,
    Critical,
}
