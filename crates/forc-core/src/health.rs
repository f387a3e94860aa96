//! Health reporting for the two long-running subsystems (the workflow
//! executor pool and the per-facility optimization controller), grounded on
//! the reference platform's `HealthChecker` (registered services polled on
//! an interval, cached for query).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service_name: String,
    pub status: HealthStatus,
    pub detail: String,
    pub last_check: DateTime<Utc>,
}

#[async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> ServiceHealth;
}

pub struct HealthChecker {
    services: Arc<RwLock<HashMap<String, Arc<dyn HealthCheckable>>>>,
    cache: Arc<RwLock<HashMap<String, ServiceHealth>>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, name: impl Into<String>, service: Arc<dyn HealthCheckable>) {
        self.services.write().await.insert(name.into(), service);
    }

    pub async fn check_all(&self) -> Vec<ServiceHealth> {
        let services = self.services.read().await;
        let mut results = Vec::with_capacity(services.len());
        for service in services.values() {
            results.push(service.health_check().await);
        }

        let mut cache = self.cache.write().await;
        cache.clear();
        for health in &results {
            cache.insert(health.service_name.clone(), health.clone());
        }
        results
    }

    pub async fn get(&self, service_name: &str) -> Option<ServiceHealth> {
        self.cache.read().await.get(service_name).cloned()
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
