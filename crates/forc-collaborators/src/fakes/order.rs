use crate::traits::{OrderClient, OrderValidation};
use async_trait::async_trait;
use dashmap::DashMap;
use forc_core::error::{BusinessError, CollaboratorError};
use forc_core::ids::{OrderId, WaveId};
use forc_core::model::order::Order;

/// Deterministic in-memory stand-in for the upstream order-entry service.
pub struct InMemoryOrder {
    orders: DashMap<OrderId, Order>,
    state: DashMap<OrderId, &'static str>,
}

impl InMemoryOrder {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            state: DashMap::new(),
        }
    }

    pub fn seed(&self, order: Order) {
        self.state.insert(order.order_id, "validated");
        self.orders.insert(order.order_id, order);
    }

    pub fn get(&self, order_id: OrderId) -> Option<Order> {
        self.orders.get(&order_id).map(|e| e.clone())
    }
}

impl Default for InMemoryOrder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderClient for InMemoryOrder {
    async fn validate(&self, order_id: OrderId) -> Result<OrderValidation, CollaboratorError> {
        let order = self
            .orders
            .get(&order_id)
            .ok_or_else(|| CollaboratorError::Business(BusinessError::OrderInvalid("unknown order".into())))?;

        let mut errors = Vec::new();
        if order.items.is_empty() {
            errors.push("order has no items".to_string());
        }
        for item in &order.items {
            if item.qty <= 0 {
                errors.push(format!("item {} has non-positive quantity", item.sku));
            }
        }

        if errors.is_empty() {
            self.state.insert(order_id, "validated");
            Ok(OrderValidation {
                valid: true,
                errors,
                validated_at: chrono::Utc::now(),
            })
        } else {
            Err(CollaboratorError::Business(BusinessError::OrderInvalid(errors.join("; "))))
        }
    }

    async fn mark_picking(&self, order_id: OrderId) -> Result<(), CollaboratorError> {
        self.state.insert(order_id, "picking");
        Ok(())
    }

    async fn mark_consolidated(&self, order_id: OrderId) -> Result<(), CollaboratorError> {
        self.state.insert(order_id, "consolidated");
        Ok(())
    }

    async fn mark_packed(&self, order_id: OrderId) -> Result<(), CollaboratorError> {
        self.state.insert(order_id, "packed");
        Ok(())
    }

    async fn assign_to_wave(&self, order_id: OrderId, _wave_id: WaveId) -> Result<(), CollaboratorError> {
        self.state.insert(order_id, "wave_assigned");
        Ok(())
    }

    async fn cancel(&self, order_id: OrderId, _reason: &str) -> Result<(), CollaboratorError> {
        self.state.insert(order_id, "cancelled");
        Ok(())
    }

    async fn reset_for_retry(&self, order_id: OrderId) -> Result<(), CollaboratorError> {
        self.state.insert(order_id, "validated");
        Ok(())
    }
}
