//! Layered configuration (spec §6), loaded `config/default.toml` →
//! `config/{env}.toml` → environment variables prefixed `FORC_`, mirroring
//! the reference platform's own config-crate-based layering.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub step_deadline_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub retry_backoff_max_secs: u64,
    pub wave_timeout_same_day_secs: u64,
    pub wave_timeout_next_day_secs: u64,
    pub wave_timeout_standard_secs: u64,
    pub compensation_max_attempts: u32,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            step_deadline_secs: 30,
            max_retries: 5,
            retry_backoff_base_secs: 1,
            retry_backoff_max_secs: 60,
            wave_timeout_same_day_secs: 15 * 60,
            wave_timeout_next_day_secs: 30 * 60,
            wave_timeout_standard_secs: 2 * 60 * 60,
            compensation_max_attempts: 3,
        }
    }
}

impl PlanningConfig {
    pub fn step_deadline(&self) -> Duration {
        Duration::from_secs(self.step_deadline_secs)
    }

    pub fn retry_backoff_base(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_base_secs)
    }

    pub fn retry_backoff_max(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_max_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub monitoring_interval_secs: u64,
    pub capacity_threshold: f64,
    pub underutilization_threshold: f64,
    pub max_orders_per_rebalance: usize,
    pub prediction_window_secs: u64,
    pub historical_window_secs: u64,
    pub growth_factor: f64,
    pub staffing_per_utilization_bucket: f64,
    pub reroute_confidence_min: f64,
    pub enable_auto_rebalance: bool,
    pub enable_auto_reroute: bool,
    pub enable_capacity_prediction: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            monitoring_interval_secs: 5 * 60,
            capacity_threshold: 0.85,
            underutilization_threshold: 0.30,
            max_orders_per_rebalance: 50,
            prediction_window_secs: 4 * 60 * 60,
            historical_window_secs: 7 * 24 * 60 * 60,
            growth_factor: 0.20,
            staffing_per_utilization_bucket: 0.20,
            reroute_confidence_min: 0.70,
            enable_auto_rebalance: true,
            enable_auto_reroute: true,
            enable_capacity_prediction: true,
        }
    }
}

impl ControllerConfig {
    pub fn monitoring_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub oversized_kg: f64,
    pub high_value_threshold: f64,
    pub slot_cap: u32,
    pub fallback_station_limit: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            oversized_kg: 23.0,
            high_value_threshold: 1000.0,
            slot_cap: crate::model::reservation::SLOT_CAP,
            fallback_station_limit: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub planning: PlanningConfig,
    pub controller: ControllerConfig,
    pub thresholds: Thresholds,
}

impl AppConfig {
    /// Layers `config/default.toml` with an optional `config/{env}.toml`
    /// override and `FORC_`-prefixed environment variables, falling back
    /// cleanly to built-in defaults when no config files are present.
    pub fn load() -> Result<Self, crate::error::ForcError> {
        let env = std::env::var("FORC_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(config::Environment::with_prefix("FORC").separator("__"));

        let settings = builder
            .build()
            .map_err(|e| crate::error::ForcError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .or_else(|_| Ok(AppConfig::default()))
    }
}
