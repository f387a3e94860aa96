use crate::traits::ProcessPathClient;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use forc_core::error::{BusinessError, CollaboratorError};
use forc_core::ids::{OrderId, PathId, StationId};
use forc_core::model::escalation::{EscalationEvent, EscalationTrigger};
use forc_core::model::order::Order;
use forc_core::model::process_path::{ProcessPath, Tier};
use std::sync::Arc;

/// Persists `ProcessPath` records keyed by `pathId` with a secondary index
/// by `orderId` (spec §6). `determine_path` delegates the pure derivation to
/// `forc-process-path` and persists the result — the façade itself owns no
/// derivation logic.
pub struct InMemoryProcessPath {
    by_id: DashMap<PathId, ProcessPath>,
    by_order: DashMap<OrderId, PathId>,
    determine: Arc<dyn Fn(&Order) -> Result<ProcessPath, forc_process_path::PathError> + Send + Sync>,
}

impl InMemoryProcessPath {
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            by_order: DashMap::new(),
            determine: Arc::new(forc_process_path::determine_path),
        }
    }
}

impl Default for InMemoryProcessPath {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessPathClient for InMemoryProcessPath {
    async fn determine_path(&self, order: &Order) -> Result<ProcessPath, CollaboratorError> {
        let path = (self.determine)(order)
            .map_err(|e| CollaboratorError::Business(BusinessError::OrderInvalid(e.to_string())))?;

        self.by_order.insert(order.order_id, path.path_id);
        self.by_id.insert(path.path_id, path.clone());
        Ok(path)
    }

    async fn get_by_order(&self, order_id: OrderId) -> Result<ProcessPath, CollaboratorError> {
        let path_id = self
            .by_order
            .get(&order_id)
            .map(|e| *e.value())
            .ok_or_else(|| CollaboratorError::Business(BusinessError::OrderInvalid("no path for order".into())))?;

        self.by_id
            .get(&path_id)
            .map(|e| e.clone())
            .ok_or_else(|| CollaboratorError::Business(BusinessError::OrderInvalid("path missing".into())))
    }

    async fn assign_station(&self, path_id: PathId, station_id: StationId) -> Result<(), CollaboratorError> {
        let mut path = self
            .by_id
            .get_mut(&path_id)
            .ok_or_else(|| CollaboratorError::Business(BusinessError::OrderInvalid("path missing".into())))?;
        path.target_station_id = Some(station_id);
        Ok(())
    }

    async fn escalate(
        &self,
        path_id: PathId,
        trigger: EscalationTrigger,
        reason: &str,
    ) -> Result<Tier, CollaboratorError> {
        let mut path = self
            .by_id
            .get_mut(&path_id)
            .ok_or_else(|| CollaboratorError::Business(BusinessError::OrderInvalid("path missing".into())))?;

        let from_tier = path.tier;
        let to_tier = from_tier.worsen();
        path.tier = to_tier;
        path.escalation_history.push(EscalationEvent {
            from_tier,
            to_tier,
            trigger,
            reason: reason.to_string(),
            at: Utc::now(),
        });
        Ok(to_tier)
    }

    async fn downgrade(&self, path_id: PathId, to_tier: Tier) -> Result<(), CollaboratorError> {
        let mut path = self
            .by_id
            .get_mut(&path_id)
            .ok_or_else(|| CollaboratorError::Business(BusinessError::OrderInvalid("path missing".into())))?;
        path.tier = to_tier;
        Ok(())
    }
}
