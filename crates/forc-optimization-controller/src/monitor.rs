//! Phase 1: monitor health (spec §4.5). Pulls a routing-metrics snapshot and
//! classifies the facility's overall health from the per-station
//! utilization it carries.

use forc_collaborators::{Collaborators, RoutingMetricsRequest};
use forc_core::error::CollaboratorError;
use forc_core::ids::StationId;
use forc_core::model::metrics::{FacilityHealth, RoutingMetricsSnapshot};

/// Stations report overloaded/underutilized at these fixed thresholds
/// regardless of `ControllerConfig` (spec §4.5 phase 1 prose); the
/// config's `capacityThreshold` is a distinct knob consumed by the
/// predict phase's bottleneck flag, not this classification (see
/// DESIGN.md).
pub const OVERLOADED_THRESHOLD: f64 = 0.90;
const HEALTHY_OVERLOADED_MAX: usize = 3;
const HEALTHY_CONSTRAINED_RATE_MAX: f64 = 0.20;
const CRITICAL_OVERLOADED_MIN: usize = 3;
const CRITICAL_CONSTRAINED_RATE_MIN: f64 = 0.40;

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub snapshot: RoutingMetricsSnapshot,
    pub overloaded: Vec<StationId>,
    pub underutilized: Vec<StationId>,
    pub health: FacilityHealth,
}

pub async fn monitor_health(
    collaborators: &Collaborators,
    facility_id: &str,
    zone: Option<&str>,
    underutilization_threshold: f64,
    time_window_secs: u64,
) -> Result<MonitorReport, CollaboratorError> {
    let snapshot = collaborators
        .routing
        .get_routing_metrics(RoutingMetricsRequest {
            facility_id: Some(facility_id.to_string()),
            zone: zone.map(str::to_string),
            time_window_secs,
        })
        .await?;

    let overloaded: Vec<StationId> = snapshot
        .station_utilization
        .iter()
        .filter(|(_, util)| **util > OVERLOADED_THRESHOLD)
        .map(|(id, _)| *id)
        .collect();

    let underutilized: Vec<StationId> = snapshot
        .station_utilization
        .iter()
        .filter(|(_, util)| **util < underutilization_threshold)
        .map(|(id, _)| *id)
        .collect();

    let health = classify_health(overloaded.len(), snapshot.capacity_constrained_rate);

    Ok(MonitorReport { snapshot, overloaded, underutilized, health })
}

/// Classification order matters: a facility with many overloaded stations
/// is `Critical` even if its constrained rate happens to be low, so the
/// critical check runs before the healthy check (spec §4.5 phase 1).
fn classify_health(overloaded_count: usize, capacity_constrained_rate: f64) -> FacilityHealth {
    if overloaded_count >= CRITICAL_OVERLOADED_MIN || capacity_constrained_rate > CRITICAL_CONSTRAINED_RATE_MIN {
        FacilityHealth::Critical
    } else if overloaded_count < HEALTHY_OVERLOADED_MAX && capacity_constrained_rate <= HEALTHY_CONSTRAINED_RATE_MAX {
        FacilityHealth::Healthy
    } else {
        FacilityHealth::Degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_overloaded_and_low_constrained_rate_is_healthy() {
        assert_eq!(classify_health(1, 0.10), FacilityHealth::Healthy);
    }

    #[test]
    fn three_or_more_overloaded_is_critical_even_with_low_constrained_rate() {
        assert_eq!(classify_health(3, 0.05), FacilityHealth::Critical);
    }

    #[test]
    fn high_constrained_rate_is_critical_regardless_of_overload_count() {
        assert_eq!(classify_health(0, 0.45), FacilityHealth::Critical);
    }

    #[test]
    fn middling_numbers_are_degraded() {
        assert_eq!(classify_health(2, 0.30), FacilityHealth::Degraded);
    }
}
