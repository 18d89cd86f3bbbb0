//! Retry policy for the resilient wrappers.
//!
//! 重试策略：有限次数、指数退避。

use std::time::Duration;

/// Delay before the attempt that follows attempt `attempt` (0-based):
/// `base * 2^attempt`, saturating instead of overflowing.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    match 2u32.checked_pow(attempt) {
        Some(factor) => base.saturating_mul(factor),
        None => Duration::MAX,
    }
}

/// Options for a generic timed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before the first retry; doubled after each retry.
    pub retry_delay: Duration,
    /// Deadline for a single attempt.
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_millis(10_000),
        }
    }
}

impl RequestOptions {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Options for a result-returning backend query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl QueryOptions {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Sleep before retrying after attempt `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        backoff_delay(self.retry_delay, attempt)
    }
}
