//! All mutating RPCs carry an idempotency key derived deterministically from
//! `(workflowId, attemptNumber, stepName)` (spec §5). A duplicate key
//! returns the original result unchanged (spec §8 property 2).

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct IdempotencyKey(pub String);

impl IdempotencyKey {
    pub fn derive(workflow_id: &str, step_name: &str, attempt: u32) -> Self {
        Self(format!("{workflow_id}:{step_name}:{attempt}"))
    }
}

#[derive(Default)]
pub struct IdempotencyStore {
    entries: DashMap<String, serde_json::Value>,
}

impl IdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `op` only on the first observation of `key`; replays the cached
    /// result verbatim on any subsequent call with the same key.
    pub async fn once<T, E, F, Fut>(&self, key: &IdempotencyKey, op: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.entries.get(&key.0) {
            if let Ok(value) = serde_json::from_value::<T>(cached.clone()) {
                tracing::debug!(key = %key.0, "idempotency hit, replaying cached result");
                return Ok(value);
            }
        }

        let result = op().await?;
        if let Ok(encoded) = serde_json::to_value(&result) {
            self.entries.insert(key.0.clone(), encoded);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn duplicate_key_does_not_re_run_the_operation() {
        let store = IdempotencyStore::new();
        let key = IdempotencyKey::derive("wf-1", "reserve_capacity", 0);
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let result: Result<u32, ()> = store
                .once(&key, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(result.unwrap(), 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
