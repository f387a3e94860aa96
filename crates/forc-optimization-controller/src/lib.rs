//! Continuous Optimization Controller (C5, spec §4.5): a long-lived,
//! per-facility loop that monitors station health, rebalances load,
//! reroutes in-flight orders, and predicts near-future capacity. Runs
//! independently of any single planning workflow instance; its decisions
//! are honored by *subsequent* C4 runs rather than mutating ones already
//! in flight (spec §9).

pub mod controller;
pub mod monitor;
pub mod predict;
pub mod rebalance;
pub mod reroute;

pub use controller::{ControllerStatus, CycleReport, OptimizationController};
pub use monitor::{monitor_health, MonitorReport, OVERLOADED_THRESHOLD};
pub use predict::{predict_capacity, PredictParams, PredictedBottleneck, PredictionReport};
pub use rebalance::rebalance;
pub use reroute::{reroute, RerouteEvent};
