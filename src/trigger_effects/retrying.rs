
use crate::config::RetryPolicy;
use crate::entities::DispatchOutcome;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{event, Level};

/// Repeats `attempt_fn` while it reports an unavailable engine, sleeping with
/// capped exponential backoff between attempts. Each attempt is handed the
/// time left before `deadline`, and no retry is started that could not finish
/// before it. Returns the last outcome together with the number of attempts.
pub async fn dispatch_until_settled<F, FutF>(
    attempt_fn: F,
    policy: &RetryPolicy,
    deadline: Instant,
) -> (DispatchOutcome, u32)
where
    F: Fn(Duration) -> FutF,
    FutF: Future<Output = DispatchOutcome>,
{
    let mut attempts: u32 = 0;
    let mut backoff = policy.initial_backoff.min(policy.max_backoff);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return (
                DispatchOutcome::EngineUnavailable(String::from(
                    "No invocation time left for a start execution call.",
                )),
                attempts,
            );
        }
        attempts += 1;
        let outcome = attempt_fn(remaining).await;
        match outcome {
            DispatchOutcome::EngineUnavailable(ref reason) if attempts < policy.max_attempts => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if backoff >= remaining {
                    event!(
                        Level::WARN,
                        "Attempt {} found the workflow engine unavailable: {}. Only {} ms of the invocation left; not retrying.",
                        attempts,
                        reason,
                        remaining.as_millis()
                    );
                    return (outcome, attempts);
                }
                event!(
                    Level::WARN,
                    "Attempt {} of {} found the workflow engine unavailable: {}. Retrying in {} ms.",
                    attempts,
                    policy.max_attempts,
                    reason,
                    backoff.as_millis()
                );
                sleep(backoff).await;
                backoff = backoff.saturating_mul(2).min(policy.max_backoff);
            }
            _ => return (outcome, attempts),
        }
    }
}
