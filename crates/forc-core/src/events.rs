//! In-process event fan-out for escalations and rebalances, grounded on the
//! reference platform's `EventBus` (broadcast channel + registered
//! handlers).

use crate::ids::{OrderId, PathId};
use crate::model::escalation::EscalationEvent;
use crate::model::metrics::RebalanceEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CoreEvent {
    PathEscalated {
        path_id: PathId,
        order_id: OrderId,
        event: EscalationEvent,
    },
    OrdersRebalanced {
        at: DateTime<Utc>,
        events: Vec<RebalanceEvent>,
    },
    WorkflowFailed {
        order_id: OrderId,
        reason: String,
        at: DateTime<Utc>,
    },
    WorkflowCompleted {
        order_id: OrderId,
        at: DateTime<Utc>,
    },
}

impl CoreEvent {
    fn type_name(&self) -> &'static str {
        match self {
            CoreEvent::PathEscalated { .. } => "PathEscalated",
            CoreEvent::OrdersRebalanced { .. } => "OrdersRebalanced",
            CoreEvent::WorkflowFailed { .. } => "WorkflowFailed",
            CoreEvent::WorkflowCompleted { .. } => "WorkflowCompleted",
        }
    }
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: &CoreEvent);
    fn event_types(&self) -> Vec<&'static str>;
    fn handler_name(&self) -> &'static str;
}

pub struct EventBus {
    handlers: Arc<RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>>,
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(1024);
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            sender,
        }
    }

    pub async fn register_handler(&self, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write().await;
        for event_type in handler.event_types() {
            handlers
                .entry(event_type.to_string())
                .or_insert_with(Vec::new)
                .push(handler.clone());
        }
        tracing::info!(handler = handler.handler_name(), "registered event handler");
    }

    pub async fn emit(&self, event: CoreEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::debug!("no subscribers for event broadcast");
        }

        let handlers = self.handlers.read().await;
        if let Some(event_handlers) = handlers.get(event.type_name()) {
            for handler in event_handlers {
                handler.handle_event(&event).await;
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
