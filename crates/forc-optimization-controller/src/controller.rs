//! The per-facility long-running loop (spec §4.5) tying the four phases
//! together. Grounded on the reference platform's `OptimizationEngine`
//! (`aion-optimization-engine::lib`): one struct owning each subsystem,
//! a `start`/`stop` pair, and a status query — generalized here from the
//! reference's ML auto-tuner loop to the deterministic monitor →
//! rebalance → reroute → predict cycle spec §4.5 actually calls for.

use crate::monitor::{monitor_health, MonitorReport};
use crate::predict::{predict_capacity, PredictParams, PredictionReport};
use crate::rebalance::rebalance;
use crate::reroute::{reroute, RerouteEvent};
use chrono::{DateTime, Utc};
use forc_collaborators::Collaborators;
use forc_core::config::ControllerConfig;
use forc_core::error::CollaboratorError;
use forc_core::model::metrics::{FacilityHealth, RebalanceEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub health: FacilityHealth,
    pub monitor: MonitorReport,
    pub rebalance: Vec<RebalanceEvent>,
    pub reroute: Vec<RerouteEvent>,
    pub prediction: Option<PredictionReport>,
}

/// Queryable counters exposed alongside the loop (spec §4.5
/// "totalCycles/rebalanceEvents/rerouteEvents ... exposed as queryable
/// state"), mirroring `OptimizationEngine::get_status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub total_cycles: u64,
    pub rebalance_events: u64,
    pub reroute_events: u64,
    pub last_health: Option<FacilityHealth>,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

pub struct OptimizationController {
    facility_id: String,
    zone: Option<String>,
    collaborators: Collaborators,
    config: ControllerConfig,
    stop: Arc<Notify>,
    status: Arc<RwLock<ControllerStatus>>,
}

impl OptimizationController {
    pub fn new(facility_id: impl Into<String>, zone: Option<String>, collaborators: Collaborators, config: ControllerConfig) -> Self {
        Self {
            facility_id: facility_id.into(),
            zone,
            collaborators,
            config,
            stop: Arc::new(Notify::new()),
            status: Arc::new(RwLock::new(ControllerStatus::default())),
        }
    }

    /// Handle the caller uses to fire `stopOptimization` between cycles.
    pub fn stop_handle(&self) -> Arc<Notify> {
        self.stop.clone()
    }

    pub async fn status(&self) -> ControllerStatus {
        self.status.read().await.clone()
    }

    /// Runs the four phases once, in order, each an independent call
    /// (spec §4.5). Rebalance only fires when enabled and health isn't
    /// already `Healthy`; reroute and predict are independently gated by
    /// their own feature flags.
    pub async fn run_cycle(&self) -> Result<CycleReport, CollaboratorError> {
        let monitor = monitor_health(
            &self.collaborators,
            &self.facility_id,
            self.zone.as_deref(),
            self.config.underutilization_threshold,
            3600,
        )
        .await?;

        let rebalance_events = if self.config.enable_auto_rebalance && monitor.health != FacilityHealth::Healthy {
            rebalance(&self.collaborators, &monitor, self.config.max_orders_per_rebalance).await?
        } else {
            Vec::new()
        };

        let reroute_events = if self.config.enable_auto_reroute {
            reroute(&self.collaborators, self.config.reroute_confidence_min).await?
        } else {
            Vec::new()
        };

        let prediction = if self.config.enable_capacity_prediction {
            let params = PredictParams {
                facility_id: self.facility_id.clone(),
                zone: self.zone.clone(),
                historical_window_secs: self.config.historical_window_secs,
                growth_factor: self.config.growth_factor,
                capacity_threshold: self.config.capacity_threshold,
                staffing_per_utilization_bucket: self.config.staffing_per_utilization_bucket,
            };
            Some(predict_capacity(&self.collaborators, &params).await?)
        } else {
            None
        };

        {
            let mut status = self.status.write().await;
            status.total_cycles += 1;
            status.rebalance_events += rebalance_events.len() as u64;
            status.reroute_events += reroute_events.len() as u64;
            status.last_health = Some(monitor.health);
            status.last_cycle_at = Some(Utc::now());
        }

        Ok(CycleReport { health: monitor.health, monitor, rebalance: rebalance_events, reroute: reroute_events, prediction })
    }

    /// Spawns the long-lived per-facility task: tick on
    /// `monitoringInterval`, run one cycle, and keep going until
    /// `stopOptimization` fires (spec §4.5).
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.monitoring_interval());
            interval.tick().await; // first tick fires immediately; consume it

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match self.run_cycle().await {
                            Ok(report) => tracing::info!(
                                facility = %self.facility_id,
                                health = ?report.health,
                                rebalanced = report.rebalance.len(),
                                rerouted = report.reroute.len(),
                                "optimization cycle completed",
                            ),
                            Err(error) => tracing::warn!(
                                facility = %self.facility_id,
                                %error,
                                "optimization cycle failed",
                            ),
                        }
                    }
                    _ = self.stop.notified() => {
                        tracing::info!(facility = %self.facility_id, "optimization controller stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forc_collaborators::ReserveStationCapacityRequest;
    use forc_core::ids::{OrderId, ReservationId, StationId};
    use forc_core::model::process_path::Requirement;
    use forc_core::model::station::{Station, StationType};
    use std::collections::HashMap;

    fn station(id: StationId, max: u32) -> Station {
        Station {
            station_id: id,
            zone: "z1".into(),
            station_type: StationType::Packing,
            capabilities: vec![Requirement::SingleItem],
            equipment: Vec::new(),
            max_concurrent_tasks: max,
            current_tasks: 0,
            pending_reserved_slots: 0,
        }
    }

    #[tokio::test]
    async fn disabled_phases_are_skipped_and_status_still_advances() {
        let (collaborators, fixtures) = forc_collaborators::in_memory_collaborators();
        let a = StationId::new();
        fixtures.facility.seed(station(a, 10));
        let mut util = HashMap::new();
        util.insert(a, 0.10);
        fixtures.routing.set_metrics(forc_core::model::metrics::RoutingMetricsSnapshot {
            station_utilization: util,
            capacity_constrained_rate: 0.0,
            average_confidence: 1.0,
            route_changes: 0,
            updated_at: Utc::now(),
        });

        let mut config = ControllerConfig::default();
        config.enable_auto_rebalance = false;
        config.enable_auto_reroute = false;
        config.enable_capacity_prediction = false;

        let controller = OptimizationController::new("FAC-1", None, collaborators, config);
        let report = controller.run_cycle().await.unwrap();

        assert!(report.rebalance.is_empty());
        assert!(report.reroute.is_empty());
        assert!(report.prediction.is_none());

        let status = controller.status().await;
        assert_eq!(status.total_cycles, 1);
        assert_eq!(status.rebalance_events, 0);
    }

    // S5: rebalance cycle end-to-end through the controller, not just the
    // rebalance module directly.
    #[tokio::test]
    async fn full_cycle_rebalances_an_overloaded_facility() {
        let (collaborators, fixtures) = forc_collaborators::in_memory_collaborators();
        let a = StationId::new();
        let b = StationId::new();
        let c = StationId::new();
        let d = StationId::new();
        for (id, max) in [(a, 10), (b, 10), (c, 10), (d, 10)] {
            fixtures.facility.seed(station(id, max));
        }

        for source in [a, b, c] {
            collaborators
                .facility
                .reserve_station_capacity(ReserveStationCapacityRequest {
                    station_id: source,
                    order_id: OrderId::new(),
                    required_slots: 1,
                    reservation_id: ReservationId::new(),
                })
                .await
                .unwrap();
        }

        let mut util = HashMap::new();
        util.insert(a, 0.95);
        util.insert(b, 0.93);
        util.insert(c, 0.91);
        util.insert(d, 0.20);
        fixtures.routing.set_metrics(forc_core::model::metrics::RoutingMetricsSnapshot {
            station_utilization: util,
            capacity_constrained_rate: 0.5,
            average_confidence: 0.8,
            route_changes: 0,
            updated_at: Utc::now(),
        });

        let controller = OptimizationController::new("FAC-1", None, collaborators, ControllerConfig::default());
        let report = controller.run_cycle().await.unwrap();

        assert_eq!(report.health, FacilityHealth::Critical);
        assert!(!report.rebalance.is_empty());
        assert!(report.rebalance.iter().all(|e| e.to == d));
    }
}
