use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use crate::models::RawEarningsRecord;
use crate::service::finance::{EarningsSource, FinanceServiceError};

/// Statuses treated as transient: rate limiting and server-side failures.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// How often and how patiently a failed fetch is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each following one.
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(120),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_max = max;
        self
    }

    /// Transport failures and the configured statuses are worth another try.
    pub fn is_retryable(&self, err: &FinanceServiceError) -> bool {
        match err {
            FinanceServiceError::Http(_) => true,
            FinanceServiceError::Status { status, .. } => self.retry_statuses.contains(status),
            _ => false,
        }
    }

    /// Delay before retry number `retry` (1-based). A server-provided
    /// Retry-After wins over the exponential schedule; both are capped.
    pub fn delay_for(&self, retry: u32, err: &FinanceServiceError) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let computed = self.backoff_base.saturating_mul(1u32 << exponent);

        let delay = match err {
            FinanceServiceError::Status {
                retry_after: Some(hint),
                ..
            } => *hint,
            _ => computed,
        };
        delay.min(self.backoff_max)
    }
}

/// Wraps an [`EarningsSource`] and retries transient failures with
/// exponential backoff.
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: EarningsSource> EarningsSource for Retrying<S> {
    async fn fetch_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawEarningsRecord>, FinanceServiceError> {
        let mut retries = 0;
        loop {
            match self.inner.fetch_range(from, to).await {
                Ok(records) => return Ok(records),
                Err(err) if retries < self.policy.max_retries && self.policy.is_retryable(&err) => {
                    retries += 1;
                    let delay = self.policy.delay_for(retries, &err);
                    warn!(
                        "Earnings fetch failed ({}); retry {}/{} in {:?}",
                        err, retries, self.policy.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
