//! Phase 4: predict capacity (spec §4.5). Advisory-only: projects each
//! station's utilization forward by a flat growth factor and flags the
//! ones that would cross `capacityThreshold` as predicted bottlenecks,
//! recommending a staffing level for each.

use chrono::{DateTime, Utc};
use forc_collaborators::{Collaborators, RoutingMetricsRequest};
use forc_core::error::CollaboratorError;
use forc_core::ids::StationId;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictedBottleneck {
    pub station_id: StationId,
    pub projected_utilization: f64,
    pub recommended_workers: u32,
}

#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub bottlenecks: Vec<PredictedBottleneck>,
    pub generated_at: DateTime<Utc>,
}

pub struct PredictParams {
    pub facility_id: String,
    pub zone: Option<String>,
    pub historical_window_secs: u64,
    pub growth_factor: f64,
    pub capacity_threshold: f64,
    pub staffing_per_utilization_bucket: f64,
}

pub async fn predict_capacity(
    collaborators: &Collaborators,
    params: &PredictParams,
) -> Result<PredictionReport, CollaboratorError> {
    let snapshot = collaborators
        .routing
        .get_routing_metrics(RoutingMetricsRequest {
            facility_id: Some(params.facility_id.clone()),
            zone: params.zone.clone(),
            time_window_secs: params.historical_window_secs,
        })
        .await?;

    let mut bottlenecks: Vec<PredictedBottleneck> = snapshot
        .station_utilization
        .iter()
        .filter_map(|(station_id, utilization)| {
            let projected = (utilization * (1.0 + params.growth_factor)).min(1.0);
            if projected > params.capacity_threshold {
                let recommended_workers =
                    (projected / params.staffing_per_utilization_bucket).ceil() as u32;
                Some(PredictedBottleneck { station_id: *station_id, projected_utilization: projected, recommended_workers })
            } else {
                None
            }
        })
        .collect();

    // Deterministic ordering for callers/tests that print or diff reports.
    bottlenecks.sort_by(|a, b| a.station_id.as_uuid().cmp(&b.station_id.as_uuid()));

    Ok(PredictionReport { bottlenecks, generated_at: Utc::now() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn growth_factor_flags_stations_crossing_the_threshold() {
        let (collaborators, fixtures) = forc_collaborators::in_memory_collaborators();
        let hot = StationId::new();
        let cool = StationId::new();

        let mut util = std::collections::HashMap::new();
        util.insert(hot, 0.80); // 0.80 * 1.2 = 0.96 > 0.85
        util.insert(cool, 0.40); // 0.40 * 1.2 = 0.48 <= 0.85
        fixtures.routing.set_metrics(forc_core::model::metrics::RoutingMetricsSnapshot {
            station_utilization: util,
            capacity_constrained_rate: 0.1,
            average_confidence: 0.9,
            route_changes: 0,
            updated_at: Utc::now(),
        });

        let params = PredictParams {
            facility_id: "FAC-1".into(),
            zone: None,
            historical_window_secs: 7 * 24 * 3600,
            growth_factor: 0.20,
            capacity_threshold: 0.85,
            staffing_per_utilization_bucket: 0.20,
        };

        let report = predict_capacity(&collaborators, &params).await.unwrap();

        assert_eq!(report.bottlenecks.len(), 1);
        assert_eq!(report.bottlenecks[0].station_id, hot);
        assert_eq!(report.bottlenecks[0].recommended_workers, 5); // ceil(0.96 / 0.20) = 5
    }
}
