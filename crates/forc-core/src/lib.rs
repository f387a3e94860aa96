//! Platform substrate for the fulfillment orchestration core.
//!
//! Mirrors the split used across the reference platform's own core crate:
//! domain model, error taxonomy, layered configuration, structured logging,
//! an in-process event bus, health reporting for the long-running
//! subsystems, and a TTL cache used for reservation lease bookkeeping.

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod ids;
pub mod logging;
pub mod model;
pub mod retry;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use health::*;
pub use ids::*;
pub use model::*;
pub use retry::*;
