use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::Config;
use crate::models::RawEarningsRecord;

pub mod earnings;
pub mod retry;

pub use retry::{RetryPolicy, Retrying};

#[derive(Debug, thiserror::Error)]
pub enum FinanceServiceError {
    #[error("FINNHUB_TOKEN env-var is missing")]
    MissingCredential,
    #[error("Earnings API request failed: {0}")]
    Http(String),
    #[error("Earnings API request is invalid: {0}")]
    InvalidRequest(String),
    #[error("Earnings API status {status}: {body}")]
    Status {
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    },
    #[error("Earnings API returned an error: {0}")]
    Api(String),
    #[error("Earnings API parse failed: {0}")]
    Parse(String),
}

/// Anything that can list earnings announcements for an inclusive date range.
#[async_trait]
pub trait EarningsSource: Send + Sync {
    async fn fetch_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawEarningsRecord>, FinanceServiceError>;
}

/// Finnhub earnings-calendar client.
pub struct FinnhubClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl FinnhubClient {
    /// Build a client from the process configuration.
    pub fn new(config: &Config) -> Result<Self, FinanceServiceError> {
        let token = config.token.trim();
        if token.is_empty() {
            return Err(FinanceServiceError::MissingCredential);
        }
        validate_api_url(&config.api_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| FinanceServiceError::Http(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: token.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl EarningsSource for FinnhubClient {
    async fn fetch_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawEarningsRecord>, FinanceServiceError> {
        earnings::fetch_earnings_range(&self.client, &self.api_url, &self.token, from, to).await
    }
}

// Only absolute http(s) endpoints can be requested.
fn validate_api_url(raw: &str) -> Result<(), FinanceServiceError> {
    let url = reqwest::Url::parse(raw)
        .map_err(|e| FinanceServiceError::InvalidRequest(format!("FINNHUB_API_URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FinanceServiceError::InvalidRequest(format!(
            "FINNHUB_API_URL scheme {other:?} is not http or https"
        ))),
    }
}

pub use FinanceServiceError as Error;
