use crate::ids::{OrderId, StationId, WaveId};
use crate::model::process_path::Requirement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most-specialized to least-specialized, matching the type-assignment
/// ordering of spec §4.3: hazmat > coldChain > highValue > fragile >
/// specialized (giftWrap|oversized) > standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WaveType {
    Standard,
    Specialized,
    Fragile,
    HighValue,
    ColdChain,
    Hazmat,
}

impl WaveType {
    pub fn for_requirements(requirements: &[Requirement]) -> Self {
        if requirements.contains(&Requirement::Hazmat) {
            WaveType::Hazmat
        } else if requirements.contains(&Requirement::ColdChain) {
            WaveType::ColdChain
        } else if requirements.contains(&Requirement::HighValue) {
            WaveType::HighValue
        } else if requirements.contains(&Requirement::Fragile) {
            WaveType::Fragile
        } else if requirements.contains(&Requirement::GiftWrap)
            || requirements.contains(&Requirement::Oversized)
        {
            WaveType::Specialized
        } else {
            WaveType::Standard
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveStatus {
    Planning,
    Scheduled,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    pub wave_id: WaveId,
    pub wave_type: WaveType,
    pub required_capabilities: Vec<Requirement>,
    pub special_handling_types: Vec<Requirement>,
    pub station_requirements: Vec<String>,
    pub target_station_ids: Vec<StationId>,
    pub requires_certified_labor: bool,
    pub orders: Vec<OrderId>,
    pub scheduled_start: DateTime<Utc>,
    pub status: WaveStatus,
}

#[derive(Debug, Clone)]
pub struct WavePlanningConfig {
    pub required_process_paths: Option<Vec<Requirement>>,
    pub excluded_process_paths: Option<Vec<Requirement>>,
    pub special_handling_filter: Option<Vec<Requirement>>,
    pub group_by_process_path: bool,
    pub max_orders_per_wave: usize,
    pub priority_bias: bool,
}

impl Default for WavePlanningConfig {
    fn default() -> Self {
        Self {
            required_process_paths: None,
            excluded_process_paths: None,
            special_handling_filter: None,
            group_by_process_path: false,
            max_orders_per_wave: 50,
            priority_bias: true,
        }
    }
}
