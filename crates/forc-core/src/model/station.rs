use crate::ids::StationId;
use crate::model::process_path::Requirement;
use serde::{Deserialize, Serialize};

/// Read-through projection of a station owned by the Facility collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub station_id: StationId,
    pub zone: String,
    pub station_type: StationType,
    pub capabilities: Vec<Requirement>,
    pub equipment: Vec<EquipmentType>,
    pub max_concurrent_tasks: u32,
    pub current_tasks: u32,
    pub pending_reserved_slots: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationType {
    Packing,
    Consolidation,
    Specialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentType {
    HazmatKit,
    HazmatPpe,
    ColdStorageUnit,
    TemperatureMonitor,
    Forklift,
    PalletJack,
}

impl Station {
    /// `max(0, maxConcurrentTasks - currentTasks - pendingReservedSlots)` (spec §3).
    pub fn available_capacity(&self) -> u32 {
        self.max_concurrent_tasks
            .saturating_sub(self.current_tasks)
            .saturating_sub(self.pending_reserved_slots)
    }

    pub fn supports(&self, requirements: &[Requirement]) -> bool {
        requirements.iter().all(|r| self.capabilities.contains(r))
    }
}
