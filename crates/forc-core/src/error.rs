//! Failure taxonomy (spec §7): two primary classes, business (permanent) and
//! system (transient), each tagged by kind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BusinessError {
    #[error("order invalid: {0}")]
    OrderInvalid(String),
    #[error("insufficient inventory")]
    InsufficientInventory,
    #[error("capacity exceeded at station")]
    CapacityExceeded,
    #[error("station offline")]
    StationOffline,
    #[error("no certified worker available")]
    WorkerUnavailable,
    #[error("equipment unavailable")]
    EquipmentUnavailable,
    #[error("wave assignment timed out")]
    WaveTimeout,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SystemError {
    #[error("timeout")]
    Timeout,
    #[error("connection failure")]
    ConnectionFailure,
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("rate limited")]
    RateLimited,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Every mutating RPC through the collaborators façade returns this error
/// type; the workflow executor decides whether to retry (system) or
/// escalate/terminate (business) purely by matching on the tag (spec §7).
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum CollaboratorError {
    #[error("business error: {0}")]
    Business(#[from] BusinessError),
    #[error("system error: {0}")]
    System(#[from] SystemError),
}

impl CollaboratorError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CollaboratorError::System(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    OrderInvalid,
    NoCapacity,
    WorkerUnavailable,
    EquipmentUnavailable,
    WaveTimeout,
    NoInventory,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureStatus {
    Failed,
    EligibleForReprocessing,
    DeadLettered,
}

/// Created on terminal failure with a capped retry counter (spec §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReprocessingRecord {
    pub reason: FailureReason,
    pub retry_count: u32,
    pub max_retries: u32,
    pub dead_letter: bool,
}

impl ReprocessingRecord {
    pub fn new(reason: FailureReason, max_retries: u32) -> Self {
        Self {
            reason,
            retry_count: 0,
            max_retries,
            dead_letter: false,
        }
    }

    pub fn record_attempt(&mut self) {
        self.retry_count += 1;
        if self.retry_count >= self.max_retries {
            self.dead_letter = true;
        }
    }
}

/// Top-level error for anything that isn't captured by the business/system
/// split above (configuration, internal invariant violations).
#[derive(Debug, Error)]
pub enum ForcError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
