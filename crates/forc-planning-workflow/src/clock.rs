//! Source of "now" for a workflow instance. All time reads go through this
//! trait so tests can advance time deterministically instead of sleeping
//! (spec §9 "nondeterminism is injected via a context object").

use chrono::{DateTime, Utc};
use std::sync::Mutex;

pub trait WorkflowClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default)]
pub struct ChronoClock;

impl WorkflowClock for ChronoClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test double that only advances when told to, letting scenario tests
/// simulate a wave-assignment timeout without a real 15-minute sleep (spec
/// §8 scenario S4).
pub struct FixedClock {
    at: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at: Mutex::new(at) }
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.at.lock().unwrap();
        *guard += delta;
    }
}

impl WorkflowClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.at.lock().unwrap()
    }
}
