use anyhow::Result;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use earnings_calendar::config::Config;
use earnings_calendar::service::automation::earnings_calendar::{self as refresh, RefreshSummary};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(summary) => {
            println!(
                "Calendar refreshed -> {} ({} events)",
                summary.path.display(),
                summary.events
            );
        }
        Err(err) => {
            eprintln!("Calendar refresh failed: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<RefreshSummary> {
    // Fail on a missing token before any network call.
    let config = Config::from_env()?;
    info!(
        "Refreshing earnings calendar ({} days back, {} days ahead) into {}",
        config.lookbehind_days,
        config.lookahead_days,
        config.output_path.display()
    );

    let summary = refresh::run(&config).await?;
    Ok(summary)
}
