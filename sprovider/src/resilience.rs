//! Bounded retry policy and request lifecycle hook contracts.

use std::future::Future;
use std::time::Duration;

use crate::ProviderError;

/// Attempt budget and backoff for one logical request.
///
/// Remote status failures are retried immediately. Transport faults
/// (timeouts, connection errors) sleep a fixed `transport_backoff` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub transport_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transport_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn with_transport_backoff(mut self, backoff: Duration) -> Self {
        self.transport_backoff = backoff;
        self
    }

    /// Local errors never reach the network, so they are never retried even
    /// when flagged retryable.
    pub fn should_retry(&self, attempt: u32, error: &ProviderError) -> bool {
        error.retryable && !error.is_local() && attempt < self.max_attempts
    }

    pub fn delay_for(&self, error: &ProviderError) -> Duration {
        if error.is_transport_fault() {
            self.transport_backoff
        } else {
            Duration::ZERO
        }
    }
}

pub trait RequestHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _url: &str, _attempt: u32) {}

    fn on_attempt_failure(
        &self,
        _operation: &str,
        _url: &str,
        _attempt: u32,
        _error: &ProviderError,
    ) {
    }

    fn on_retry_scheduled(&self, _operation: &str, _attempt: u32, _delay: Duration) {}

    fn on_success(&self, _operation: &str, _attempts: u32) {}

    fn on_exhausted(&self, _operation: &str, _attempts: u32, _error: &ProviderError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRequestHooks;

impl RequestHooks for NoopRequestHooks {}

pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    url: &str,
    policy: &RetryPolicy,
    hooks: &dyn RequestHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, ProviderError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, ProviderError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(operation, url, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(operation, attempt);
                return Ok(value);
            }
            Err(error) => {
                tracing::warn!(
                    operation,
                    url,
                    attempt,
                    max_attempts = policy.max_attempts,
                    status = error.status,
                    body = error.body.as_deref(),
                    error_kind = ?error.kind,
                    error = %error,
                    "request attempt failed"
                );
                hooks.on_attempt_failure(operation, url, attempt, &error);

                if policy.should_retry(attempt, &error) {
                    let delay = policy.delay_for(&error);
                    hooks.on_retry_scheduled(operation, attempt, delay);
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    attempt += 1;
                    continue;
                }

                hooks.on_exhausted(operation, attempt, &error);
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::{ProviderError, ProviderErrorKind};

    #[test]
    fn retry_policy_uses_retryable_flag_and_attempt_limit() {
        let policy = RetryPolicy::new(3);
        let retryable = ProviderError::timeout("timed out");
        let local = ProviderError::validation("bad request");

        assert!(policy.should_retry(1, &retryable));
        assert!(policy.should_retry(2, &retryable));
        assert!(!policy.should_retry(3, &retryable));
        assert!(!policy.should_retry(1, &local));
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
    }

    #[test]
    fn only_transport_faults_sleep_before_the_next_attempt() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.delay_for(&ProviderError::transport("reset")),
            Duration::from_secs(1)
        );
        assert_eq!(
            policy.delay_for(&ProviderError::timeout("slow")),
            Duration::from_secs(1)
        );
        assert_eq!(
            policy.delay_for(&ProviderError::from_status(500, "")),
            Duration::ZERO
        );
    }

    #[test]
    fn transport_backoff_stays_fixed_across_attempts() {
        let policy = RetryPolicy::new(5).with_transport_backoff(Duration::from_millis(100));
        let fault = ProviderError::transport("reset");

        assert_eq!(policy.delay_for(&fault), Duration::from_millis(100));
        assert!(policy.should_retry(4, &fault));
        assert!(!policy.should_retry(5, &fault));
    }

    #[test]
    fn local_errors_are_not_retried_even_when_flagged_retryable() {
        let policy = RetryPolicy::new(3);
        let local = ProviderError::new(ProviderErrorKind::Validation, "empty messages", true);

        assert!(local.is_local());
        assert!(!policy.should_retry(1, &local));
        assert!(policy.should_retry(1, &ProviderError::from_status(500, "")));
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RequestHooks for RecordingHooks {
        fn on_attempt_start(&self, operation: &str, _url: &str, attempt: u32) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{operation}:{attempt}"));
        }

        fn on_attempt_failure(
            &self,
            operation: &str,
            _url: &str,
            attempt: u32,
            error: &ProviderError,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{operation}:{attempt}:{:?}", error.kind));
        }

        fn on_success(&self, operation: &str, attempts: u32) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{operation}:{attempts}"));
        }

        fn on_exhausted(&self, operation: &str, attempts: u32, _error: &ProviderError) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("exhausted:{operation}:{attempts}"));
        }
    }

    #[tokio::test]
    async fn execute_with_retry_sleeps_only_after_transport_faults() {
        let policy = RetryPolicy::new(3);
        let hooks = RecordingHooks::default();
        let sleeps = Arc::new(Mutex::new(Vec::new()));

        let result = execute_with_retry(
            "create_thread",
            "http://test/threads",
            &policy,
            &hooks,
            |attempt| async move {
                match attempt {
                    1 => Err(ProviderError::transport("connection reset")),
                    2 => Err(ProviderError::from_status(502, "")),
                    _ => Ok("ok"),
                }
            },
            {
                let sleeps = Arc::clone(&sleeps);
                move |delay| {
                    let sleeps = Arc::clone(&sleeps);
                    async move {
                        sleeps.lock().expect("sleep lock").push(delay);
                    }
                }
            },
        )
        .await;

        assert_eq!(result.expect("result should succeed"), "ok");
        assert_eq!(
            *sleeps.lock().expect("sleep lock"),
            vec![Duration::from_secs(1)]
        );

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec![
                "start:create_thread:1",
                "failure:create_thread:1:Transport",
                "start:create_thread:2",
                "failure:create_thread:2:Unavailable",
                "start:create_thread:3",
                "success:create_thread:3",
            ]
        );
    }

    #[tokio::test]
    async fn execute_with_retry_returns_last_error_when_exhausted() {
        let policy = RetryPolicy::new(2);
        let hooks = RecordingHooks::default();

        let result = execute_with_retry::<(), _, _, _, _>(
            "completion",
            "http://test/chat",
            &policy,
            &hooks,
            |attempt| async move { Err(ProviderError::from_status(500 + attempt as u16, "")) },
            |_| async move {},
        )
        .await;

        let error = result.expect_err("result should fail");
        assert_eq!(error.status, Some(502));
        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(events.last().map(String::as_str), Some("exhausted:completion:2"));
    }

    #[tokio::test]
    async fn execute_with_retry_stops_on_local_error() {
        let policy = RetryPolicy::new(5);
        let hooks = RecordingHooks::default();

        let result = execute_with_retry::<(), _, _, _, _>(
            "completion",
            "http://test/chat",
            &policy,
            &hooks,
            |_| async move { Err(ProviderError::decode("bad json")) },
            |_| async move {},
        )
        .await;

        let error = result.expect_err("result should fail");
        assert_eq!(error.kind, ProviderErrorKind::Decode);
        let events = hooks.events.lock().expect("events lock").clone();
        assert!(events.contains(&"exhausted:completion:1".to_string()));
    }
}
