//! Seeds the in-memory collaborator fakes with a small, representative
//! facility so `forc plan`/`forc optimize` have something to react against
//! without a live backend (spec §1 "out of scope: external collaborators").

use forc_collaborators::InMemoryFixtures;
use forc_core::ids::{StationId, WaveId, WorkerId};
use forc_core::model::labor::{Skill, Worker};
use forc_core::model::process_path::Requirement;
use forc_core::model::station::{EquipmentType, Station, StationType};
use forc_core::model::wave::{Wave, WaveStatus, WaveType};
use std::collections::BTreeSet;

pub struct DemoFacility {
    pub standard_station: StationId,
    pub hazmat_station: StationId,
    pub cold_chain_station: StationId,
}

pub fn seed(fixtures: &InMemoryFixtures) -> DemoFacility {
    let standard_station = StationId::new();
    let hazmat_station = StationId::new();
    let cold_chain_station = StationId::new();

    fixtures.facility.seed(Station {
        station_id: standard_station,
        zone: "z1".into(),
        station_type: StationType::Packing,
        capabilities: vec![
            Requirement::SingleItem,
            Requirement::MultiItem,
            Requirement::GiftWrap,
            Requirement::Fragile,
            Requirement::Oversized,
            Requirement::HighValue,
        ],
        equipment: vec![EquipmentType::Forklift, EquipmentType::PalletJack],
        max_concurrent_tasks: 8,
        current_tasks: 0,
        pending_reserved_slots: 0,
    });

    fixtures.facility.seed(Station {
        station_id: hazmat_station,
        zone: "z1".into(),
        station_type: StationType::Specialized,
        capabilities: vec![Requirement::SingleItem, Requirement::MultiItem, Requirement::Hazmat],
        equipment: vec![EquipmentType::HazmatKit, EquipmentType::HazmatPpe],
        max_concurrent_tasks: 4,
        current_tasks: 0,
        pending_reserved_slots: 0,
    });

    fixtures.facility.seed(Station {
        station_id: cold_chain_station,
        zone: "z1".into(),
        station_type: StationType::Specialized,
        capabilities: vec![Requirement::SingleItem, Requirement::MultiItem, Requirement::ColdChain],
        equipment: vec![EquipmentType::ColdStorageUnit, EquipmentType::TemperatureMonitor],
        max_concurrent_tasks: 4,
        current_tasks: 0,
        pending_reserved_slots: 0,
    });

    fixtures.equipment.seed(EquipmentType::HazmatKit, vec!["KIT-1".into(), "KIT-2".into()]);
    fixtures.equipment.seed(EquipmentType::HazmatPpe, vec!["PPE-1".into(), "PPE-2".into()]);
    fixtures.equipment.seed(EquipmentType::ColdStorageUnit, vec!["COLD-1".into()]);
    fixtures.equipment.seed(EquipmentType::TemperatureMonitor, vec!["TEMP-1".into()]);
    fixtures.equipment.seed(EquipmentType::Forklift, vec!["FORK-1".into()]);
    fixtures.equipment.seed(EquipmentType::PalletJack, vec!["JACK-1".into()]);

    fixtures.labor.seed(Worker {
        worker_id: WorkerId::new(),
        skills: all_skills(),
        zone: "z1".into(),
    });

    fixtures.wave.seed(Wave {
        wave_id: WaveId::new(),
        wave_type: WaveType::Standard,
        required_capabilities: vec![
            Requirement::SingleItem,
            Requirement::MultiItem,
            Requirement::GiftWrap,
            Requirement::Fragile,
            Requirement::Oversized,
            Requirement::HighValue,
        ],
        special_handling_types: vec![
            Requirement::GiftWrap,
            Requirement::Fragile,
            Requirement::Oversized,
            Requirement::HighValue,
        ],
        station_requirements: vec![],
        target_station_ids: vec![standard_station],
        requires_certified_labor: false,
        orders: vec![],
        scheduled_start: chrono::Utc::now(),
        status: WaveStatus::Planning,
    });

    fixtures.wave.seed(Wave {
        wave_id: WaveId::new(),
        wave_type: WaveType::Hazmat,
        required_capabilities: vec![Requirement::SingleItem, Requirement::MultiItem, Requirement::Hazmat],
        special_handling_types: vec![Requirement::Hazmat],
        station_requirements: vec![],
        target_station_ids: vec![hazmat_station],
        requires_certified_labor: true,
        orders: vec![],
        scheduled_start: chrono::Utc::now(),
        status: WaveStatus::Planning,
    });

    fixtures.wave.seed(Wave {
        wave_id: WaveId::new(),
        wave_type: WaveType::ColdChain,
        required_capabilities: vec![Requirement::SingleItem, Requirement::MultiItem, Requirement::ColdChain],
        special_handling_types: vec![Requirement::ColdChain],
        station_requirements: vec![],
        target_station_ids: vec![cold_chain_station],
        requires_certified_labor: true,
        orders: vec![],
        scheduled_start: chrono::Utc::now(),
        status: WaveStatus::Planning,
    });

    DemoFacility { standard_station, hazmat_station, cold_chain_station }
}

fn all_skills() -> BTreeSet<Skill> {
    [
        Skill::HazmatHandling,
        Skill::HazmatCompliance,
        Skill::ColdChainHandling,
        Skill::TemperatureControl,
        Skill::HighValueVerification,
        Skill::SecureHandling,
        Skill::GiftWrapping,
        Skill::QualityPackaging,
        Skill::ForkliftOperation,
        Skill::HeavyLifting,
    ]
    .into_iter()
    .collect()
}
