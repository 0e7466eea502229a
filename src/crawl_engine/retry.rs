//! Bounded retry of a whole run

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::crawl_types::{HarvestError, HarvestResult};
use crate::config::RetryPolicy;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

impl RetryPolicy {
    /// `attempt` is 1-based. The delay is fixed.
    #[must_use]
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            RetryDecision::NoRetry
        } else {
            RetryDecision::RetryAfter(self.delay)
        }
    }
}

/// Run `attempt_fn` until it succeeds or the policy says stop.
///
/// The closure receives the 1-based attempt number. Exhaustion wraps the
/// last error in [`HarvestError::RetriesExhausted`].
pub async fn run_with_retry<F, Fut, T>(policy: RetryPolicy, mut attempt_fn: F) -> HarvestResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = HarvestResult<T>>,
{
    let mut attempt = 1u32;
    loop {
        match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.decide(attempt) {
                RetryDecision::NoRetry => {
                    return Err(HarvestError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                RetryDecision::RetryAfter(delay) => {
                    warn!(attempt, ?delay, "Run attempt failed, retrying: {}", e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserError;

    #[test]
    fn fixed_delay_until_last_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(30),
        };
        assert_eq!(policy.decide(1), RetryDecision::RetryAfter(Duration::from_secs(30)));
        assert_eq!(policy.decide(2), RetryDecision::RetryAfter(Duration::from_secs(30)));
        assert_eq!(policy.decide(3), RetryDecision::NoRetry);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_secs(5),
        };
        let mut calls = 0;
        let result: HarvestResult<()> = run_with_retry(policy, |_| {
            calls += 1;
            async { Err(HarvestError::from(BrowserError::Launch("no chrome".to_string()))) }
        })
        .await;

        assert_eq!(calls, 2);
        assert!(matches!(
            result,
            Err(HarvestError::RetriesExhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_failure() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        };
        let result = run_with_retry(policy, |attempt| async move {
            if attempt < 2 {
                Err(HarvestError::from(BrowserError::Closed("browser".to_string())))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.ok(), Some(2));
    }
}
