use crate::ids::{OrderId, PathId, StationId};
use crate::model::escalation::EscalationEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Closed vocabulary of process-path requirements (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Requirement {
    SingleItem,
    MultiItem,
    GiftWrap,
    Hazmat,
    Oversized,
    Fragile,
    ColdChain,
    HighValue,
}

impl Requirement {
    /// Tags counted toward `ProcessPath::special_handling` (spec §3/§4.2).
    pub const SPECIAL_HANDLING: [Requirement; 6] = [
        Requirement::Hazmat,
        Requirement::ColdChain,
        Requirement::HighValue,
        Requirement::Fragile,
        Requirement::GiftWrap,
        Requirement::Oversized,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Optimal,
    Standard,
    Degraded,
    Manual,
}

impl Tier {
    pub fn worsen(self) -> Self {
        match self {
            Tier::Optimal => Tier::Standard,
            Tier::Standard => Tier::Degraded,
            Tier::Degraded | Tier::Manual => Tier::Manual,
        }
    }

    pub fn is_terminal_for_escalation(self) -> bool {
        matches!(self, Tier::Manual)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPath {
    pub path_id: PathId,
    pub order_id: OrderId,
    pub requirements: BTreeSet<Requirement>,
    pub consolidation_required: bool,
    pub gift_wrap_required: bool,
    pub special_handling: Vec<Requirement>,
    pub target_station_id: Option<StationId>,
    pub fallback_station_ids: Vec<StationId>,
    pub tier: Tier,
    pub escalation_history: Vec<EscalationEvent>,
}

impl ProcessPath {
    /// True when `other` can be satisfied by a wave offering exactly these
    /// capabilities, i.e. the compatibility rule of spec §4.3.
    pub fn requirements_subset_of(&self, capabilities: &BTreeSet<Requirement>) -> bool {
        self.requirements.is_subset(capabilities)
    }

    pub fn special_handling_subset_of(&self, types: &[Requirement]) -> bool {
        self.special_handling.iter().all(|r| types.contains(r))
    }

    pub fn push_fallback(&mut self, station_id: StationId, limit: usize) {
        if self.fallback_station_ids.len() < limit
            && Some(station_id) != self.target_station_id
            && !self.fallback_station_ids.contains(&station_id)
        {
            self.fallback_station_ids.push(station_id);
        }
    }
}
