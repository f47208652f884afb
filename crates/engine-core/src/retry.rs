use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Whether a failed upload attempt is worth another in-run try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Bounded in-run retry with capped exponential backoff.
///
/// Disabled by default: the supported recovery path for transient failures
/// is re-running the tool, which the progress store makes idempotent. A
/// positive attempt budget re-tries only errors the classifier marks
/// [`RetryDisposition::Retry`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no re-tries.
    pub fn disabled() -> Self {
        RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// `extra` additional attempts on top of the first one.
    pub fn with_extra_attempts(extra: usize) -> Self {
        Self::new(
            extra + 1,
            Duration::from_millis(250),
            Duration::from_secs(5),
        )
    }

    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: if max_delay.is_zero() {
                base_delay
            } else {
                max_delay
            },
        }
    }

    /// Runs the operation, re-trying while the classifier allows it and the
    /// attempt budget lasts. Returns the last error otherwise.
    pub async fn run<F, Fut, T, E, C>(&self, mut op: F, classify: C) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> RetryDisposition,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let exhausted = attempt + 1 >= self.max_attempts;
                    if exhausted || classify(&err) == RetryDisposition::Stop {
                        return Err(err);
                    }
                    sleep(self.backoff_delay(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let factor = 1u128 << attempt.min(6);
        let delay_ms = self.base_delay.as_millis().saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis()) as u64)
    }
}
