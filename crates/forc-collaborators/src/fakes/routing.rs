use crate::fakes::facility::InMemoryFacility;
use crate::traits::{
    AlternateStation, OptimizeStationSelectionRequest, OptimizeStationSelectionResult, RerouteResult,
    RoutingClient, RoutingMetricsRequest,
};
use async_trait::async_trait;
use chrono::Utc;
use forc_core::error::{CollaboratorError, SystemError};
use forc_core::ids::{OrderId, StationId};
use forc_core::model::metrics::RoutingMetricsSnapshot;
use forc_core::model::station::Station;
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Weighted factors from spec §4.4 step 3: capacity 30%, distance 15%,
/// utilization 20%, throughput 20%, SLA (time-to-deadline) 10%,
/// certification match 5%.
pub const WEIGHT_CAPACITY: f64 = 0.30;
pub const WEIGHT_DISTANCE: f64 = 0.15;
pub const WEIGHT_UTILIZATION: f64 = 0.20;
pub const WEIGHT_THROUGHPUT: f64 = 0.20;
pub const WEIGHT_SLA: f64 = 0.10;
pub const WEIGHT_CERTIFICATION: f64 = 0.05;

pub struct InMemoryRouting {
    facility: Arc<InMemoryFacility>,
    metrics: RwLock<RoutingMetricsSnapshot>,
    rerouting_candidates: RwLock<Vec<OrderId>>,
    fail_next: AtomicBool,
}

impl InMemoryRouting {
    pub fn new(facility: Arc<InMemoryFacility>) -> Self {
        Self {
            facility,
            metrics: RwLock::new(RoutingMetricsSnapshot {
                station_utilization: HashMap::new(),
                capacity_constrained_rate: 0.0,
                average_confidence: 1.0,
                route_changes: 0,
                updated_at: Utc::now(),
            }),
            rerouting_candidates: RwLock::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Test/ops hook: seed the metrics snapshot a controller cycle should
    /// observe (spec §4.5 phase 1).
    pub fn set_metrics(&self, snapshot: RoutingMetricsSnapshot) {
        *self.metrics.write().unwrap() = snapshot;
    }

    pub fn set_rerouting_candidates(&self, orders: Vec<OrderId>) {
        *self.rerouting_candidates.write().unwrap() = orders;
    }

    /// Test hook: force the next `optimize_station_selection` call to fail,
    /// exercising the fallback-to-`findCapableStations` path (spec §4.4
    /// step 3).
    pub fn fail_next_optimization(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn score_station(station: &Station, req: &OptimizeStationSelectionRequest) -> (f64, HashMap<String, f64>) {
        let capacity_norm = (station.available_capacity() as f64
            / station.max_concurrent_tasks.max(1) as f64)
            .clamp(0.0, 1.0);
        let utilization_norm = 1.0
            - (station.current_tasks as f64 / station.max_concurrent_tasks.max(1) as f64).clamp(0.0, 1.0);
        // No real geography in this in-memory fake: same zone scores best.
        let distance_norm = if req.zone.as_deref() == Some(station.zone.as_str()) {
            1.0
        } else {
            0.5
        };
        // Larger stations model higher throughput headroom.
        let throughput_norm = (station.max_concurrent_tasks as f64 / 20.0).clamp(0.0, 1.0);
        let hours_to_deadline = (req.promised_delivery_at - Utc::now()).num_minutes() as f64 / 60.0;
        let sla_norm = (hours_to_deadline / 48.0).clamp(0.0, 1.0);
        let certification_norm = if station.supports(&req.requirements) { 1.0 } else { 0.0 };

        let mut reasoning = HashMap::new();
        reasoning.insert("capacity".to_string(), WEIGHT_CAPACITY * capacity_norm);
        reasoning.insert("distance".to_string(), WEIGHT_DISTANCE * distance_norm);
        reasoning.insert("utilization".to_string(), WEIGHT_UTILIZATION * utilization_norm);
        reasoning.insert("throughput".to_string(), WEIGHT_THROUGHPUT * throughput_norm);
        reasoning.insert("sla".to_string(), WEIGHT_SLA * sla_norm);
        reasoning.insert("certification".to_string(), WEIGHT_CERTIFICATION * certification_norm);

        let score = reasoning.values().sum();
        (score, reasoning)
    }
}

#[async_trait]
impl RoutingClient for InMemoryRouting {
    async fn optimize_station_selection(
        &self,
        req: OptimizeStationSelectionRequest,
    ) -> Result<OptimizeStationSelectionResult, CollaboratorError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CollaboratorError::System(SystemError::ServiceUnavailable));
        }

        let candidates = self
            .facility
            .find_capable_stations(&req.requirements, req.station_type, req.zone.as_deref())
            .await?;

        if candidates.is_empty() {
            return Err(CollaboratorError::System(SystemError::ServiceUnavailable));
        }

        let mut scored: Vec<(Station, f64, HashMap<String, f64>)> = candidates
            .into_iter()
            .map(|s| {
                let (score, reasoning) = Self::score_station(&s, &req);
                (s, score, reasoning)
            })
            .collect();

        scored.sort_by(|a, b| {
            OrderedFloat(b.1)
                .cmp(&OrderedFloat(a.1))
                .then_with(|| a.0.station_id.as_uuid().cmp(&b.0.station_id.as_uuid()))
        });

        let (best, best_score, reasoning) = scored.remove(0);

        let alternates: Vec<AlternateStation> = scored
            .iter()
            .enumerate()
            .map(|(idx, (station, score, _))| AlternateStation {
                station_id: station.station_id,
                score: *score,
                rank: (idx + 1) as u32,
            })
            .collect();

        // Confidence quantifies how decisively the top station dominates the
        // best alternate (spec GLOSSARY "Confidence").
        let confidence = match alternates.first() {
            Some(next) if best_score > 0.0 => ((best_score - next.score) / best_score).clamp(0.0, 1.0).max(0.5),
            _ => 1.0,
        };

        Ok(OptimizeStationSelectionResult {
            selected_station_id: best.station_id,
            score: best_score,
            reasoning,
            alternate_stations: alternates,
            confidence,
            decision_time: Utc::now(),
        })
    }

    async fn get_routing_metrics(
        &self,
        _req: RoutingMetricsRequest,
    ) -> Result<RoutingMetricsSnapshot, CollaboratorError> {
        Ok(self.metrics.read().unwrap().clone())
    }

    async fn reroute_order(
        &self,
        _order_id: OrderId,
        _reason: &str,
        _force_reroute: bool,
    ) -> Result<RerouteResult, CollaboratorError> {
        let station_ids = self.facility.all_station_ids();
        let station_id = station_ids
            .into_iter()
            .next()
            .ok_or(CollaboratorError::System(SystemError::ServiceUnavailable))?;
        Ok(RerouteResult {
            new_station_id: station_id,
            confidence: 0.8,
        })
    }

    async fn rerouting_candidates(&self) -> Result<Vec<OrderId>, CollaboratorError> {
        Ok(self.rerouting_candidates.read().unwrap().clone())
    }
}
