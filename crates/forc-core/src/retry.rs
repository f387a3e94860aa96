//! Exponential backoff with jitter, applied only to `SystemError`s (spec §7).
//! Grounded on the reference platform's own use of `rand` in its auto-tuner
//! for perturbation/jitter-style randomness.

use crate::config::PlanningConfig;
use crate::error::CollaboratorError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exp = base.as_millis().saturating_mul(1u128 << attempt.min(16));
    let capped = exp.min(max.as_millis());
    let jitter_fraction: f64 = rand::thread_rng().gen_range(0.5..1.0);
    let jittered = (capped as f64 * jitter_fraction) as u64;
    Duration::from_millis(jittered.max(1))
}

/// Retries `op` while it keeps returning a retryable (system) error, up to
/// `config.max_retries` attempts, honoring `config.step_deadline` as an
/// overall ceiling on wall-clock time spent retrying.
pub async fn retry_system_errors<T, F, Fut>(
    config: &PlanningConfig,
    mut op: F,
) -> Result<T, CollaboratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollaboratorError>>,
{
    let started = tokio::time::Instant::now();
    let mut attempt = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.max_retries => {
                if started.elapsed() >= config.step_deadline() {
                    return Err(err);
                }
                let delay = backoff_delay(
                    attempt,
                    config.retry_backoff_base(),
                    config.retry_backoff_max(),
                );
                tracing::warn!(attempt, ?delay, error = %err, "retrying after system error");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
