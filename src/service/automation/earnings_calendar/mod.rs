//! One-shot refresh of the earnings `.ics` file: fetch, build, write.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::service::calendar::CalendarDocument;
use crate::service::finance::{EarningsSource, FinanceServiceError, FinnhubClient, Retrying};

pub mod window;

pub use window::{earnings_window, today_et};

#[derive(Debug, Error)]
pub enum CalendarJobError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FinanceServiceError),
    #[error("failed to write calendar to {}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a successful refresh produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub path: PathBuf,
    pub events: usize,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Fetch from Finnhub with retries and rewrite the configured output file.
pub async fn run(config: &Config) -> Result<RefreshSummary, CalendarJobError> {
    let client = FinnhubClient::new(config)?;
    let source = Retrying::new(client, config.retry.clone());
    refresh_once(&source, config, today_et()).await
}

/// Fetch the window around `today` from `source` and write the calendar.
///
/// Nothing is written unless the fetch succeeds.
pub async fn refresh_once<S>(
    source: &S,
    config: &Config,
    today: NaiveDate,
) -> Result<RefreshSummary, CalendarJobError>
where
    S: EarningsSource + ?Sized,
{
    let (from, to) = earnings_window(today, config.lookbehind_days, config.lookahead_days)
        .ok_or(ConfigError::WindowOutOfRange {
            lookbehind_days: config.lookbehind_days,
            lookahead_days: config.lookahead_days,
        })?;

    let records = source.fetch_range(from, to).await?;
    let document = CalendarDocument::from_records(&records, Utc::now());
    info!(
        "Built calendar with {} events from {} records ({} to {})",
        document.len(),
        records.len(),
        from,
        to
    );

    write_calendar(&config.output_path, &document.render()).await?;

    Ok(RefreshSummary {
        path: config.output_path.clone(),
        events: document.len(),
        from,
        to,
    })
}

/// Overwrite `path` with the rendered calendar.
pub async fn write_calendar(path: &Path, contents: &str) -> Result<(), CalendarJobError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| CalendarJobError::Output {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
