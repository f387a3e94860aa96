//! Phase 3: dynamic reroute (spec §4.5). Applies `Routing.rerouteOrder` to
//! every order the latest metrics snapshot flagged as a rerouting
//! candidate, gated on confidence.
//!
//! Per spec §9's open question, a reroute here never mutates a live
//! planning workflow in flight; it only records the decision. The *next*
//! planning attempt for that order is expected to consult
//! `rerouting_candidates`/`reroute_order` itself when it re-selects a
//! station.

use forc_collaborators::Collaborators;
use forc_core::error::CollaboratorError;
use forc_core::ids::{OrderId, StationId};

#[derive(Debug, Clone, PartialEq)]
pub struct RerouteEvent {
    pub order_id: OrderId,
    pub new_station_id: StationId,
    pub confidence: f64,
}

pub async fn reroute(
    collaborators: &Collaborators,
    confidence_min: f64,
) -> Result<Vec<RerouteEvent>, CollaboratorError> {
    let candidates = collaborators.routing.rerouting_candidates().await?;
    let mut events = Vec::with_capacity(candidates.len());

    for order_id in candidates {
        let result = collaborators
            .routing
            .reroute_order(order_id, "routing-metrics-flagged-rerouting-opportunity", false)
            .await?;

        if result.confidence >= confidence_min {
            events.push(RerouteEvent {
                order_id,
                new_station_id: result.new_station_id,
                confidence: result.confidence,
            });
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forc_core::model::process_path::Requirement;
    use forc_core::model::station::{Station, StationType};

    #[tokio::test]
    async fn only_high_confidence_reroutes_are_applied() {
        let (collaborators, fixtures) = forc_collaborators::in_memory_collaborators();
        let station_id = forc_core::ids::StationId::new();
        fixtures.facility.seed(Station {
            station_id,
            zone: "z1".into(),
            station_type: StationType::Packing,
            capabilities: vec![Requirement::SingleItem],
            equipment: Vec::new(),
            max_concurrent_tasks: 5,
            current_tasks: 0,
            pending_reserved_slots: 0,
        });

        let order_id = OrderId::new();
        fixtures.routing.set_rerouting_candidates(vec![order_id]);

        let events = reroute(&collaborators, 0.7).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].order_id, order_id);
        assert!(events[0].confidence >= 0.7);
    }

    #[tokio::test]
    async fn no_candidates_produces_no_events() {
        let (collaborators, _fixtures) = forc_collaborators::in_memory_collaborators();
        let events = reroute(&collaborators, 0.7).await.unwrap();
        assert!(events.is_empty());
    }
}
