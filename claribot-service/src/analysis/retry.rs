//! Retry with exponential backoff for analysis backend calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::RetryConfig;

/// Delay after the given failed attempt (1-based): `base * 2^attempt`.
pub fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    config
        .base_delay()
        .saturating_mul(2u32.saturating_pow(attempt))
}

/// Run `op` until it succeeds or `max_attempts` is reached.
///
/// `op` receives the 1-based attempt number. The error of the last attempt
/// is returned.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        info!(attempt, max_attempts, "Calling analysis backend");
        metrics::counter!("claribot_backend_attempts_total").increment(1);

        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                warn!(attempt, error = %e, "Analysis backend failed, giving up");
                return Err(e);
            }
            Err(e) => {
                let delay = backoff_delay(config, attempt);
                warn!(
                    attempt,
                    error = %e,
                    wait_ms = delay.as_millis() as u64,
                    "Analysis backend failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    fn config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay_ms: 1000,
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let config = config(3);
        assert_eq!(backoff_delay(&config, 1), Duration::from_secs(2));
        assert_eq!(backoff_delay(&config, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(&config, 3), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result: Result<&str, String> = with_retry(&config(3), |attempt| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if attempt < 3 {
                    Err(format!("attempt {attempt} overloaded"))
                } else {
                    Ok("analysis")
                }
            }
        })
        .await;

        assert_eq!(assert_ok!(result), "analysis");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(6) && waited < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error() {
        let started = Instant::now();

        let result: Result<(), String> =
            with_retry(&config(3), |attempt| async move { Err(format!("failure {attempt}")) })
                .await;

        assert_eq!(assert_err!(result), "failure 3");
        // No wait after the final attempt
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(6) && waited < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_does_not_wait() {
        let started = Instant::now();
        let result: Result<u8, String> = with_retry(&config(3), |_| async { Ok(7) }).await;
        assert_eq!(assert_ok!(result), 7);
        assert!(started.elapsed() < Duration::from_millis(1));
    }
}
