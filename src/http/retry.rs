//! Retry policy
//!
//! Decides, once per failed attempt, whether the transport sleeps and tries
//! again or surfaces the failure to the caller.

use crate::error::ErrorKind;
use crate::types::BackoffType;
use std::time::Duration;

/// Retry and backoff configuration, immutable once the client is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; a request is sent at most `max_retries + 1` times
    pub max_retries: u32,
    /// Base delay for timeouts, connection failures, 5xx and 202 responses
    pub retry_delay: Duration,
    /// Base delay for 429 responses without a `Retry-After` header
    pub rate_limit_delay: Duration,
    /// Cap applied to every computed delay
    pub max_backoff_delay: Duration,
    /// Cap applied to server-advised `Retry-After` delays
    pub max_retry_after: Duration,
    /// How computed delays grow with the attempt number
    pub backoff: BackoffType,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            rate_limit_delay: Duration::from_secs(1),
            max_backoff_delay: Duration::from_secs(60),
            max_retry_after: Duration::from_secs(300),
            backoff: BackoffType::Constant,
        }
    }
}

/// Outcome of consulting the policy after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given duration, then send the request again
    Retry(Duration),
    /// Surface the failure
    Fail,
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Decide what to do after `attempt` (zero-based) failed with `kind`.
    ///
    /// `max_retries` overrides the configured limit for a single request.
    /// A `Retry-After` value is used as sent, clamped to `max_retry_after`.
    pub fn decide(&self, kind: &ErrorKind, attempt: u32, max_retries: u32) -> RetryDecision {
        if !kind.is_retryable() || attempt >= max_retries {
            return RetryDecision::Fail;
        }

        let delay = match kind {
            ErrorKind::RateLimit { retry_after } => retry_after
                .map(|secs| self.server_delay(secs))
                .unwrap_or_else(|| self.backoff_from(self.rate_limit_delay, attempt)),
            ErrorKind::Accepted { retry_after } => retry_after
                .map(|secs| self.server_delay(secs))
                .unwrap_or_else(|| self.backoff_from(self.retry_delay, attempt)),
            _ => self.backoff_from(self.retry_delay, attempt),
        };

        RetryDecision::Retry(delay)
    }

    /// Calculate the backoff delay for a given attempt from the retry delay
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        self.backoff_from(self.retry_delay, attempt)
    }

    fn server_delay(&self, secs: u64) -> Duration {
        std::cmp::min(Duration::from_secs(secs), self.max_retry_after)
    }

    fn backoff_from(&self, base: Duration, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => base,
            BackoffType::Linear => base.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                base.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff_delay)
    }
}

#[cfg(test)]
mod retry_tests {
    use super::*;

    fn policy(backoff: BackoffType) -> RetryPolicy {
        RetryPolicy {
            max_retries: 5,
            retry_delay: Duration::from_millis(100),
            rate_limit_delay: Duration::from_millis(250),
            max_backoff_delay: Duration::from_millis(500),
            max_retry_after: Duration::from_secs(30),
            backoff,
        }
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.retry_delay, Duration::from_secs(1));
        assert_eq!(policy.rate_limit_delay, Duration::from_secs(1));
        assert_eq!(policy.max_backoff_delay, Duration::from_secs(60));
        assert_eq!(policy.max_retry_after, Duration::from_secs(300));
        assert_eq!(policy.backoff, BackoffType::Constant);
    }

    #[test]
    fn test_calculate_backoff_constant() {
        let policy = policy(BackoffType::Constant);
        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(100));
        assert_eq!(policy.calculate_backoff(5), Duration::from_millis(100));
    }

    #[test]
    fn test_calculate_backoff_linear() {
        let policy = policy(BackoffType::Linear);
        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(200));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(300));
    }

    #[test]
    fn test_calculate_backoff_exponential_respects_max() {
        let policy = policy(BackoffType::Exponential);
        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(200));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(400));
        assert_eq!(policy.calculate_backoff(3), Duration::from_millis(500));
        assert_eq!(policy.calculate_backoff(40), Duration::from_millis(500));
    }

    #[test]
    fn test_rate_limit_prefers_retry_after() {
        let policy = policy(BackoffType::Constant);
        assert_eq!(
            policy.decide(&ErrorKind::RateLimit { retry_after: Some(5) }, 0, 3),
            RetryDecision::Retry(Duration::from_secs(5))
        );
        assert_eq!(
            policy.decide(&ErrorKind::RateLimit { retry_after: None }, 0, 3),
            RetryDecision::Retry(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_retry_after_is_clamped() {
        let policy = policy(BackoffType::Constant);
        assert_eq!(
            policy.decide(
                &ErrorKind::RateLimit {
                    retry_after: Some(999_999_999)
                },
                0,
                3
            ),
            RetryDecision::Retry(Duration::from_secs(30))
        );
        assert_eq!(
            policy.decide(
                &ErrorKind::Accepted {
                    retry_after: Some(u64::MAX)
                },
                0,
                3
            ),
            RetryDecision::Retry(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_accepted_falls_back_to_retry_delay() {
        let policy = policy(BackoffType::Constant);
        assert_eq!(
            policy.decide(&ErrorKind::Accepted { retry_after: None }, 1, 3),
            RetryDecision::Retry(Duration::from_millis(100))
        );
        assert_eq!(
            policy.decide(&ErrorKind::Accepted { retry_after: Some(2) }, 1, 3),
            RetryDecision::Retry(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_permanent_kinds_fail_immediately() {
        let policy = policy(BackoffType::Constant);
        for kind in [
            ErrorKind::Authentication,
            ErrorKind::NotFound,
            ErrorKind::ClientError { status: 400 },
        ] {
            assert_eq!(policy.decide(&kind, 0, 3), RetryDecision::Fail);
        }
    }

    #[test]
    fn test_exhaustion() {
        let policy = policy(BackoffType::Constant);
        assert!(matches!(
            policy.decide(&ErrorKind::Timeout, 2, 3),
            RetryDecision::Retry(_)
        ));
        assert_eq!(policy.decide(&ErrorKind::Timeout, 3, 3), RetryDecision::Fail);
        assert_eq!(
            policy.decide(&ErrorKind::ServerError { status: 500 }, 0, 0),
            RetryDecision::Fail
        );
    }
}
