use crate::model::process_path::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationTrigger {
    StationUnavailable,
    CapacityExceeded,
    EquipmentUnavailable,
    WorkerUnavailable,
    Timeout,
    QualityIssue,
}

/// Append-only element of `ProcessPath::escalation_history` (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationEvent {
    pub from_tier: Tier,
    pub to_tier: Tier,
    pub trigger: EscalationTrigger,
    pub reason: String,
    pub at: DateTime<Utc>,
}
