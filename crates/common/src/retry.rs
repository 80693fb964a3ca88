use crate::config::RetrySettings;
use std::time::Duration;
use tracing::{error, warn};

/// Calculate the delay for the next retry attempt with exponential backoff.
pub fn next_retry_delay(attempt: usize, base_ms: u64, max_ms: u64) -> Duration {
    let multiplier = 2_u64.saturating_pow(attempt as u32);
    let delay = base_ms.saturating_mul(multiplier);
    // Jitter up to one base interval
    let jitter = if base_ms == 0 {
        0
    } else {
        rand::random::<u64>() % base_ms
    };
    let total = delay.saturating_add(jitter);
    Duration::from_millis(total.min(max_ms))
}

/// Failure of a retried operation.
#[derive(Debug)]
pub struct RetryError<E> {
    /// The last error the operation returned.
    pub error: E,
    /// Number of times the operation ran.
    pub attempts: u32,
    /// True when every attempt failed with a retryable error.
    pub exhausted: bool,
}

/// Run a blocking operation, retrying only errors accepted by `is_retryable`.
///
/// Returns the value together with the number of retries that were needed.
/// Errors rejected by `is_retryable` are returned immediately.
pub fn retry_blocking<T, E, F, P>(
    operation_name: &str,
    settings: RetrySettings,
    is_retryable: P,
    mut operation: F,
) -> Result<(T, u32), RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match operation() {
            Ok(result) => return Ok((result, attempt - 1)),
            Err(e) if !is_retryable(&e) => {
                return Err(RetryError {
                    error: e,
                    attempts: attempt,
                    exhausted: false,
                });
            }
            Err(e) => {
                if attempt >= max_attempts {
                    error!(
                        "Failed to execute '{}' after {} attempts: {}",
                        operation_name, max_attempts, e
                    );
                    return Err(RetryError {
                        error: e,
                        attempts: attempt,
                        exhausted: true,
                    });
                }
                let delay = next_retry_delay(
                    attempt as usize,
                    settings.base_delay_ms,
                    settings.max_delay_ms,
                );
                warn!(
                    "Operation '{}' hit contention. Retrying in {:?} (Attempt {}/{}): {}",
                    operation_name, delay, attempt, max_attempts, e
                );
                std::thread::sleep(delay);
            }
        }
    }
}
