//! Append-only event log driving the workflow's replay-safety guarantee
//! (spec §4.4.1, §9 "event-sourced state machine"). Every nondeterministic
//! fact the workflow ever observes — the current time, an RPC result, a
//! signal, a timer firing — is recorded here before the workflow acts on
//! it, so replaying the log reproduces the same decisions.

use chrono::{DateTime, Utc};
use forc_core::error::FailureReason;
use forc_core::ids::OrderId;
use forc_core::model::escalation::EscalationTrigger;
use forc_core::model::process_path::Tier;
use serde::{Deserialize, Serialize};

/// Bumped whenever a step is added, reordered, or removed; never for
/// timeout/logging/body-only changes (spec §4.4.5). Stored as the first
/// recorded event of every instance so replay can select the historical
/// structural branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowVersion(pub u32);

impl WorkflowVersion {
    pub const CURRENT: WorkflowVersion = WorkflowVersion(1);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowEvent {
    Started {
        order_id: OrderId,
        version: WorkflowVersion,
        at: DateTime<Utc>,
    },
    RpcCompleted {
        step: String,
        succeeded: bool,
        at: DateTime<Utc>,
    },
    SignalReceived {
        signal: String,
        at: DateTime<Utc>,
    },
    TimerFired {
        step: String,
        at: DateTime<Utc>,
    },
    Escalated {
        trigger: EscalationTrigger,
        from_tier: Tier,
        to_tier: Tier,
        at: DateTime<Utc>,
    },
    Compensated {
        action: String,
        succeeded: bool,
        at: DateTime<Utc>,
    },
    Completed {
        at: DateTime<Utc>,
    },
    Failed {
        reason: FailureReason,
        at: DateTime<Utc>,
    },
}
