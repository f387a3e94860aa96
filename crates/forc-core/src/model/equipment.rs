use crate::ids::{OrderId, ReservationId};
use crate::model::process_path::Requirement;
use crate::model::station::EquipmentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Required equipment as a function of a process path's requirements
/// (spec §3, analogous to `required_skills`).
pub fn required_equipment(requirements: &BTreeSet<Requirement>) -> BTreeSet<EquipmentType> {
    let mut equipment = BTreeSet::new();
    for req in requirements {
        match req {
            Requirement::Hazmat => {
                equipment.insert(EquipmentType::HazmatKit);
                equipment.insert(EquipmentType::HazmatPpe);
            }
            Requirement::ColdChain => {
                equipment.insert(EquipmentType::ColdStorageUnit);
                equipment.insert(EquipmentType::TemperatureMonitor);
            }
            Requirement::Oversized => {
                equipment.insert(EquipmentType::Forklift);
                equipment.insert(EquipmentType::PalletJack);
            }
            _ => {}
        }
    }
    equipment
}

/// hazmat/coldChain equipment is critical: unavailability escalates straight
/// to `manual` rather than degrading gracefully (spec §4.4 step 6).
pub fn is_critical_equipment(equipment: EquipmentType) -> bool {
    matches!(
        equipment,
        EquipmentType::HazmatKit
            | EquipmentType::HazmatPpe
            | EquipmentType::ColdStorageUnit
            | EquipmentType::TemperatureMonitor
    )
}

impl PartialOrd for EquipmentType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EquipmentType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentReservation {
    pub reservation_id: ReservationId,
    pub order_id: OrderId,
    pub equipment_type: EquipmentType,
    pub reserved_equipment_ids: Vec<String>,
}
