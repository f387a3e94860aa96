use crate::ids::{AssignmentId, OrderId, StationId, WorkerId};
use crate::model::process_path::Requirement;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    HazmatHandling,
    HazmatCompliance,
    ColdChainHandling,
    TemperatureControl,
    HighValueVerification,
    SecureHandling,
    GiftWrapping,
    QualityPackaging,
    ForkliftOperation,
    HeavyLifting,
}

/// Required skills as a function of a process path's requirements (spec §3).
pub fn required_skills(requirements: &BTreeSet<Requirement>) -> BTreeSet<Skill> {
    let mut skills = BTreeSet::new();
    for req in requirements {
        match req {
            Requirement::Hazmat => {
                skills.insert(Skill::HazmatHandling);
                skills.insert(Skill::HazmatCompliance);
            }
            Requirement::ColdChain => {
                skills.insert(Skill::ColdChainHandling);
                skills.insert(Skill::TemperatureControl);
            }
            Requirement::HighValue => {
                skills.insert(Skill::HighValueVerification);
                skills.insert(Skill::SecureHandling);
            }
            Requirement::GiftWrap => {
                skills.insert(Skill::GiftWrapping);
                skills.insert(Skill::QualityPackaging);
            }
            Requirement::Oversized => {
                skills.insert(Skill::ForkliftOperation);
                skills.insert(Skill::HeavyLifting);
            }
            Requirement::SingleItem | Requirement::MultiItem | Requirement::Fragile => {}
        }
    }
    skills
}

/// A critical skill is one whose source requirement may never be silently
/// skipped — escalation must go straight to `manual` (spec §4.4 step 6).
pub fn is_critical_skill(skill: Skill) -> bool {
    matches!(
        skill,
        Skill::HazmatHandling | Skill::HazmatCompliance | Skill::ColdChainHandling | Skill::TemperatureControl
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub worker_id: WorkerId,
    pub skills: BTreeSet<Skill>,
    pub zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborAssignment {
    pub assignment_id: AssignmentId,
    pub order_id: OrderId,
    pub station_id: StationId,
    pub worker_id: WorkerId,
    pub required_skills: BTreeSet<Skill>,
}
