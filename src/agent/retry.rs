//! Retry Orchestration
//!
//! Drives bounded {invoke → extract → validate} attempts with linear backoff.
//! Every stage reports a tagged `Result`; the orchestrator only looks at the
//! tag, so a failed attempt of any kind is handled the same way.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::schema::Violation;
use crate::model::InvocationError;

/// Why one attempt produced no usable value
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("model invocation failed: {0}")]
    Invocation(#[from] InvocationError),

    #[error("no parseable JSON in model output")]
    Extraction,

    #[error("output did not match schema: {0}")]
    Validation(String),
}

impl From<Violation> for AttemptFailure {
    fn from(v: Violation) -> Self {
        Self::Validation(v.to_string())
    }
}

/// All attempts failed
#[derive(Debug, Error)]
#[error("'{agent}' exhausted {attempts} attempts (last failure: {last_failure})")]
pub struct Exhausted {
    pub agent: &'static str,
    pub attempts: usize,
    pub last_failure: AttemptFailure,
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (never below 1)
    pub max_attempts: usize,
    /// Delay unit; attempt `n` waits `base_delay * (n + 1)` after failing
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Calculate delay after a failed attempt (0-based)
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        self.base_delay.saturating_mul(attempt as u32 + 1)
    }
}

/// Runs the attempt loop for one `generate` call
#[derive(Debug, Clone, Default)]
pub struct RetryOrchestrator {
    policy: RetryPolicy,
}

impl RetryOrchestrator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute attempts until `process` accepts the raw output.
    ///
    /// `invoke` produces raw model text; `process` extracts and validates it.
    /// Attempts run strictly one after another. Dropping the returned future
    /// stops the loop before the next attempt starts.
    pub async fn run<T, I, Fut, P>(
        &self,
        agent: &'static str,
        mut invoke: I,
        mut process: P,
    ) -> Result<T, Exhausted>
    where
        I: FnMut() -> Fut,
        Fut: Future<Output = Result<String, InvocationError>>,
        P: FnMut(&str) -> Result<T, AttemptFailure>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            debug!("'{}' attempt {}/{}", agent, attempt + 1, max_attempts);

            let outcome = match invoke().await {
                Ok(raw) => process(&raw),
                Err(e) => Err(AttemptFailure::Invocation(e)),
            };

            let failure = match outcome {
                Ok(value) => {
                    info!("'{}' succeeded on attempt {}", agent, attempt + 1);
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            warn!(
                "'{}' attempt {}/{} failed: {}",
                agent,
                attempt + 1,
                max_attempts,
                failure
            );

            if attempt + 1 >= max_attempts {
                return Err(Exhausted {
                    agent,
                    attempts: attempt + 1,
                    last_failure: failure,
                });
            }

            let delay = self.policy.delay_for_attempt(attempt);
            debug!("'{}' backing off for {:?}", agent, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_delay_is_linear_and_increasing() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(6));
        assert!(policy.delay_for_attempt(0) < policy.delay_for_attempt(1));
        assert!(policy.delay_for_attempt(1) < policy.delay_for_attempt(2));
    }

    #[test]
    fn test_max_attempts_never_zero() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let orchestrator = RetryOrchestrator::new(fast_policy(3));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = orchestrator
            .run(
                "test",
                || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, InvocationError>("42".to_string()) }
                },
                |raw| raw.parse::<i32>().map_err(|_| AttemptFailure::Extraction),
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_after_max_attempts() {
        let orchestrator = RetryOrchestrator::new(fast_policy(3));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<i32, Exhausted> = orchestrator
            .run(
                "test",
                || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Err::<String, _>(InvocationError::EmptyResponse) }
                },
                |_| Err(AttemptFailure::Extraction),
            )
            .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert!(matches!(exhausted.last_failure, AttemptFailure::Invocation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_recovers_after_failures() {
        let orchestrator = RetryOrchestrator::new(fast_policy(3));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = orchestrator
            .run(
                "test",
                || {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n == 0 {
                            Err(InvocationError::Http("connection reset".to_string()))
                        } else if n == 1 {
                            Ok("not a number".to_string())
                        } else {
                            Ok("7".to_string())
                        }
                    }
                },
                |raw| {
                    raw.parse::<i32>()
                        .map_err(|e| AttemptFailure::Validation(e.to_string()))
                },
            )
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_does_not_sleep() {
        let orchestrator = RetryOrchestrator::new(RetryPolicy::new(1, Duration::from_secs(60)));
        let started = std::time::Instant::now();

        let result: Result<(), Exhausted> = orchestrator
            .run(
                "test",
                || async { Ok::<_, InvocationError>(String::new()) },
                |_| Err(AttemptFailure::Extraction),
            )
            .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_dropped_run_stops_during_backoff() {
        let orchestrator = RetryOrchestrator::new(RetryPolicy::new(3, Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let run = orchestrator.run(
            "test",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<String, _>(InvocationError::Http("connection refused".to_string())) }
            },
            |_| Err::<(), _>(AttemptFailure::Extraction),
        );

        let abandoned = tokio::time::timeout(Duration::from_millis(50), run).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exhausted_display() {
        let exhausted = Exhausted {
            agent: "roadmap",
            attempts: 3,
            last_failure: AttemptFailure::Extraction,
        };
        let text = exhausted.to_string();
        assert!(text.contains("roadmap"));
        assert!(text.contains("3 attempts"));
    }
}
