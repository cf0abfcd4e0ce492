//! Process configuration, read once at startup.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::service::finance::RetryPolicy;

pub const DEFAULT_API_URL: &str = "https://finnhub.io/api/v1/calendar/earnings";
pub const DEFAULT_OUTPUT_PATH: &str = "earnings_calendar.ics";
pub const DEFAULT_LOOKBEHIND_DAYS: u32 = 15;
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 15;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Upper bound for either side of the fetch window.
pub const MAX_WINDOW_DAYS: u32 = 3650;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("FINNHUB_TOKEN env-var is missing")]
    MissingToken,
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("earnings window of {lookbehind_days} days back and {lookahead_days} days ahead is out of range")]
    WindowOutOfRange {
        lookbehind_days: u32,
        lookahead_days: u32,
    },
}

#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub token: String,
    pub lookbehind_days: u32,
    pub lookahead_days: u32,
    pub output_path: PathBuf,
    pub http_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Config {
    /// Load from the process environment. `FINNHUB_TOKEN` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = read("FINNHUB_TOKEN").ok_or(ConfigError::MissingToken)?;

        let mut config = Self::with_token(token);
        if let Some(url) = read("FINNHUB_API_URL") {
            config.api_url = url;
        }
        if let Some(path) = read("EARNINGS_OUTPUT_PATH") {
            config.output_path = PathBuf::from(path);
        }
        if let Some(raw) = read("EARNINGS_LOOKBEHIND_DAYS") {
            config.lookbehind_days = parse_days("EARNINGS_LOOKBEHIND_DAYS", raw)?;
        }
        if let Some(raw) = read("EARNINGS_LOOKAHEAD_DAYS") {
            config.lookahead_days = parse_days("EARNINGS_LOOKAHEAD_DAYS", raw)?;
        }
        if let Some(raw) = read("EARNINGS_HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse_number("EARNINGS_HTTP_TIMEOUT_SECS", raw)?;
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = read("EARNINGS_MAX_RETRIES") {
            config.retry.max_retries = parse_number("EARNINGS_MAX_RETRIES", raw)?;
        }

        Ok(config)
    }

    /// Defaults for everything except the credential.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            lookbehind_days: DEFAULT_LOOKBEHIND_DAYS,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("lookbehind_days", &self.lookbehind_days)
            .field("lookahead_days", &self.lookahead_days)
            .field("output_path", &self.output_path)
            .field("http_timeout", &self.http_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        expected: "a non-negative integer",
        value: raw,
    })
}

fn parse_days(key: &'static str, raw: String) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(days) if days <= MAX_WINDOW_DAYS => Ok(days),
        _ => Err(ConfigError::Invalid {
            key,
            expected: "a whole number of days between 0 and 3650",
            value: raw,
        }),
    }
}
