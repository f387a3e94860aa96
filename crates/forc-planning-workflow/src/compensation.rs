//! Compensating actions (spec §4.4.4): every successful reserve step has a
//! matched release, pushed onto a stack alongside the reserve and popped
//! LIFO on terminal failure. Each `apply` is idempotent and individually
//! retried, bounded, without blocking the terminal transition.

use forc_collaborators::{
    Collaborators, ReleaseStationCapacityRequest,
};
use forc_core::error::CollaboratorError;
use forc_core::ids::{AssignmentId, OrderId, ReservationId, StationId};

#[derive(Debug, Clone)]
pub enum CompensatingAction {
    ReleaseStationCapacity {
        station_id: StationId,
        order_id: OrderId,
        reservation_id: ReservationId,
    },
    ReleaseWorker {
        assignment_id: AssignmentId,
    },
    ReleaseEquipment {
        reservation_id: ReservationId,
    },
    ReleaseUnits {
        reservation_id: ReservationId,
    },
}

impl CompensatingAction {
    pub fn name(&self) -> &'static str {
        match self {
            CompensatingAction::ReleaseStationCapacity { .. } => "release_station_capacity",
            CompensatingAction::ReleaseWorker { .. } => "release_worker",
            CompensatingAction::ReleaseEquipment { .. } => "release_equipment",
            CompensatingAction::ReleaseUnits { .. } => "release_units",
        }
    }

    pub async fn apply(&self, collaborators: &Collaborators) -> Result<(), CollaboratorError> {
        match self {
            CompensatingAction::ReleaseStationCapacity {
                station_id,
                order_id,
                reservation_id,
            } => {
                collaborators
                    .facility
                    .release_station_capacity(ReleaseStationCapacityRequest {
                        station_id: *station_id,
                        order_id: *order_id,
                        reservation_id: *reservation_id,
                        reason: Some("compensation".to_string()),
                    })
                    .await
            }
            CompensatingAction::ReleaseWorker { assignment_id } => {
                collaborators.labor.release_worker(*assignment_id).await
            }
            CompensatingAction::ReleaseEquipment { reservation_id } => {
                collaborators.equipment.release_equipment(*reservation_id).await
            }
            CompensatingAction::ReleaseUnits { reservation_id } => {
                collaborators.unit.release_units(*reservation_id).await
            }
        }
    }
}

/// Pops the compensation stack LIFO, retrying each action up to
/// `max_attempts` times. A compensation that exhausts its attempts is
/// logged and skipped — it never blocks the rest of the stack or the
/// terminal transition (spec §4.4.4, §7).
pub async fn run_compensations(
    stack: &mut Vec<CompensatingAction>,
    collaborators: &Collaborators,
    max_attempts: u32,
) -> Vec<crate::events::WorkflowEvent> {
    let mut log = Vec::new();

    while let Some(action) = stack.pop() {
        let mut succeeded = false;
        for attempt in 0..max_attempts {
            match action.apply(collaborators).await {
                Ok(()) => {
                    succeeded = true;
                    break;
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(action = action.name(), attempt, error = %err, "compensation retry");
                    continue;
                }
                Err(err) => {
                    tracing::error!(action = action.name(), error = %err, "compensation failed permanently");
                    break;
                }
            }
        }
        if !succeeded {
            tracing::error!(action = action.name(), "compensation exhausted retries, continuing");
        }
        log.push(crate::events::WorkflowEvent::Compensated {
            action: action.name().to_string(),
            succeeded,
            at: chrono::Utc::now(),
        });
    }

    log
}
