//! Exponential-backoff retry for transient upstream failures.
//!
//! The delay schedule is a pure function of the 0-based attempt index so it
//! can be tested independently of any clock or transport. The driver loop
//! keeps no state across invocations: each call owns its attempt counter, so
//! concurrent invocations never interfere with each other's schedules.

use std::future::Future;
use std::time::Duration;

use voicelab_core::Result;

/// Maximum number of retries after the initial attempt.
pub const MAX_RETRIES: usize = 5;

const RETRY_DELAYS_MS: [u64; MAX_RETRIES] = [1000, 2000, 4000, 8000, 16000];

/// Delay to wait after the failure of attempt `attempt` (0-based).
///
/// Returns `None` once the retry budget is exhausted.
pub fn retry_delay(attempt: usize) -> Option<Duration> {
    RETRY_DELAYS_MS
        .get(attempt)
        .map(|ms| Duration::from_millis(*ms))
}

/// Runs `operation`, retrying on retryable failures with escalating delays.
///
/// A failure is retried only when [`VoiceLabError::is_retryable`] holds
/// (HTTP 429 or a transport-level failure); anything else propagates
/// immediately without consuming retry budget. After [`MAX_RETRIES`] retries
/// the last error is propagated as terminal.
///
/// There is no cancellation support; callers abandon a pending chain by
/// dropping the returned future.
///
/// [`VoiceLabError::is_retryable`]: voicelab_core::VoiceLabError::is_retryable
pub async fn invoke<T, F, Fut>(mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => match retry_delay(attempt) {
                Some(delay) => {
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient upstream failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    tracing::warn!(attempts = attempt + 1, error = %err, "retry budget exhausted");
                    return Err(err);
                }
            },
            Err(err) => return Err(err),
        }
    }
}
