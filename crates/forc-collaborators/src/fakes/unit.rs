use crate::idempotency::IdempotencyStore;
use crate::traits::{ReserveUnitsRequest, ReserveUnitsResult, UnitClient};
use async_trait::async_trait;
use dashmap::DashMap;
use forc_core::error::{BusinessError, CollaboratorError};
use forc_core::ids::{OrderId, ReservationId};

pub struct InMemoryUnit {
    inventory: DashMap<String, i64>,
    reservations: DashMap<ReservationId, Vec<String>>,
    idempotency: IdempotencyStore,
}

impl InMemoryUnit {
    pub fn new() -> Self {
        Self {
            inventory: DashMap::new(),
            reservations: DashMap::new(),
            idempotency: IdempotencyStore::new(),
        }
    }

    pub fn seed(&self, sku: &str, qty: i64) {
        self.inventory.insert(sku.to_string(), qty);
    }
}

impl Default for InMemoryUnit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UnitClient for InMemoryUnit {
    async fn reserve_units(&self, req: ReserveUnitsRequest) -> Result<ReserveUnitsResult, CollaboratorError> {
        let key = crate::idempotency::IdempotencyKey(format!("reserve-units:{}", req.idempotency_key));
        let inventory = &self.inventory;
        let reservations = &self.reservations;

        self.idempotency
            .once(&key, move || {
                let skus = req.skus.clone();
                async move {
                    for sku in &skus {
                        let available = inventory.get(sku).map(|v| *v).unwrap_or(0);
                        if available <= 0 {
                            return Err(CollaboratorError::Business(BusinessError::InsufficientInventory));
                        }
                    }
                    for sku in &skus {
                        if let Some(mut qty) = inventory.get_mut(sku) {
                            *qty -= 1;
                        }
                    }
                    let reservation_id = ReservationId::new();
                    reservations.insert(reservation_id, skus);
                    Ok(ReserveUnitsResult { reservation_id })
                }
            })
            .await
    }

    async fn release_units(&self, reservation_id: ReservationId) -> Result<(), CollaboratorError> {
        if let Some((_, skus)) = self.reservations.remove(&reservation_id) {
            for sku in skus {
                *self.inventory.entry(sku).or_insert(0) += 1;
            }
        }
        Ok(())
    }

    async fn confirm_pick(&self, _order_id: OrderId) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn confirm_consolidation(&self, _order_id: OrderId) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn confirm_packed(&self, _order_id: OrderId) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn confirm_shipped(&self, _order_id: OrderId) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
