use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{AppError, AppResult};

/// Exponential backoff for idempotent lookups
///
/// Attempt `n` (1-based) that fails waits `base_delay * 2^(n-1)` plus a random
/// jitter in `0..=max_jitter` before the next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_jitter: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retrying after failed attempt `attempt`, without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error,
    /// or runs out of attempts. The last error is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < max_attempts && is_retryable(&e) => {
                    let delay = self.backoff(attempt) + self.jitter();
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(operation, attempt, error = %e, "Giving up");
                    return Err(e);
                }
            }
        }
    }
}

fn is_retryable(error: &AppError) -> bool {
    !matches!(error, AppError::InvalidInput(_) | AppError::NotFound(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_jitter: Duration::ZERO,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy {
            max_attempts: 100,
            base_delay: Duration::from_secs(1),
            max_jitter: Duration::ZERO,
        };
        // Must not panic on overflow
        let _ = policy.backoff(64);
    }

    #[test]
    fn test_jitter_bounded() {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_jitter: Duration::from_millis(10),
        };
        for _ in 0..50 {
            assert!(policy.jitter() <= Duration::from_millis(10));
        }
    }

    #[test]
    fn test_jitter_spreads_over_range() {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_jitter: Duration::from_millis(1_000),
        };
        let distinct: std::collections::HashSet<Duration> =
            (0..50).map(|_| policy.jitter()).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_zero_jitter() {
        assert_eq!(fast_policy(3).jitter(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run("test", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(AppError::Internal("flaky".to_string()))
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = fast_policy(2)
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Internal("down".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = fast_policy(5)
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::InvalidInput("bad".to_string()))
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_runs_once() {
        let calls = AtomicU32::new(0);
        let _: AppResult<()> = fast_policy(1)
            .run("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Internal("down".to_string()))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
