//! Deterministic in-memory fakes for every collaborator trait. Used by the
//! demo binary and by the full C4/C5 test suite so neither needs a live
//! external system (spec §1 "Out of scope: external collaborators").

pub mod equipment;
pub mod facility;
pub mod labor;
pub mod order;
pub mod process_path;
pub mod routing;
pub mod unit;
pub mod wave;

pub use equipment::InMemoryEquipment;
pub use facility::InMemoryFacility;
pub use labor::InMemoryLabor;
pub use order::InMemoryOrder;
pub use process_path::InMemoryProcessPath;
pub use routing::InMemoryRouting;
pub use unit::InMemoryUnit;
pub use wave::InMemoryWave;
