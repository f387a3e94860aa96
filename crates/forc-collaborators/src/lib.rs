//! RPC Collaborators façade (spec §4.1): a typed client surface over every
//! external service the core consumes. The façade owns no domain state —
//! each operation maps 1:1 to an external service call, with retries and
//! idempotency layered on top (`forc_core::retry`, `idempotency`).

pub mod fakes;
pub mod idempotency;
pub mod traits;

pub use idempotency::{IdempotencyKey, IdempotencyStore};
pub use traits::*;

use std::sync::Arc;

/// Bundles one `Arc<dyn Trait>` per collaborator, constructed once at
/// startup and cloned cheaply into every workflow/controller instance —
/// the same "construct once, share via Arc" idiom the reference platform
/// uses for its `PlatformConfig`/`EventBus`.
#[derive(Clone)]
pub struct Collaborators {
    pub order: Arc<dyn OrderClient>,
    pub unit: Arc<dyn UnitClient>,
    pub facility: Arc<dyn FacilityClient>,
    pub labor: Arc<dyn LaborClient>,
    pub equipment: Arc<dyn EquipmentClient>,
    pub process_path: Arc<dyn ProcessPathClient>,
    pub routing: Arc<dyn RoutingClient>,
    pub wave: Arc<dyn WaveClient>,
}

/// Convenience constructor wiring the full in-memory fake stack together
/// (demo binary and integration tests).
pub fn in_memory_collaborators() -> (Collaborators, InMemoryFixtures) {
    let order = Arc::new(fakes::InMemoryOrder::new());
    let unit = Arc::new(fakes::InMemoryUnit::new());
    let facility = Arc::new(fakes::InMemoryFacility::new());
    let labor = Arc::new(fakes::InMemoryLabor::new());
    let equipment = Arc::new(fakes::InMemoryEquipment::new());
    let process_path = Arc::new(fakes::InMemoryProcessPath::new());
    let routing = Arc::new(fakes::InMemoryRouting::new(facility.clone()));
    let wave = Arc::new(fakes::InMemoryWave::new());

    let fixtures = InMemoryFixtures {
        order: order.clone(),
        unit: unit.clone(),
        facility: facility.clone(),
        labor: labor.clone(),
        equipment: equipment.clone(),
        routing: routing.clone(),
        wave: wave.clone(),
    };

    let collaborators = Collaborators {
        order,
        unit,
        facility,
        labor,
        equipment,
        process_path,
        routing,
        wave,
    };

    (collaborators, fixtures)
}

/// Handles to the concrete in-memory fakes, for seeding fixtures and
/// poking test-only hooks (`fail_next_optimization`, `deliver_wave_assigned`, ...)
/// that are not part of the collaborator trait surface itself.
#[derive(Clone)]
pub struct InMemoryFixtures {
    pub order: Arc<fakes::InMemoryOrder>,
    pub unit: Arc<fakes::InMemoryUnit>,
    pub facility: Arc<fakes::InMemoryFacility>,
    pub labor: Arc<fakes::InMemoryLabor>,
    pub equipment: Arc<fakes::InMemoryEquipment>,
    pub routing: Arc<fakes::InMemoryRouting>,
    pub wave: Arc<fakes::InMemoryWave>,
}
