// src/main.rs
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use psi_reader::utils::{self, AppError, RefreshError};
use psi_reader::{Reading, ReadingConfig, Region};

/// Singapore PSI reader
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Region: N/North, S/South, E/East, W/West, C/Central or O/Overall.
    /// Anything else (or nothing) prints the 3-hour reading.
    region: Option<String>,

    /// Page to read instead of the NEA haze page (overrides PSI_SOURCE_URL)
    #[arg(long)]
    url: Option<String>,

    /// Request timeout in seconds (overrides PSI_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print every reading as one JSON line
    #[arg(long)]
    all: bool,

    /// Save the fetched page with every matched reading highlighted
    #[arg(long)]
    debug_html: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting with args: {:?}", args);

    match run(args).await {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("PSI lookup failed: {:?}", e);
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<String, AppError> {
    // 3. Build configuration: defaults, then environment, then flags
    let mut config = ReadingConfig::from_env()?;
    if let Some(url) = args.url {
        config = config.with_source_url(url);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let region = Region::from_argument(args.region.as_deref().unwrap_or_default());
    tracing::debug!("Selected region: {}", region);

    // 4. Fetch and parse
    let mut reading = Reading::from_config(config).map_err(RefreshError::from)?;
    let refreshed = reading.refresh().await;

    // The annotated page is most useful when parsing just failed
    if let Some(path) = &args.debug_html {
        if reading.page_text().is_empty() {
            tracing::warn!("No page fetched, skipping debug HTML");
        } else if let Err(e) = utils::html_debug::save_debug_html(reading.page_text(), path) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        }
    }
    refreshed?;

    // 5. Report
    if args.all {
        let snapshot = reading
            .snapshot()
            .ok_or_else(|| AppError::Config("No reading available after refresh".to_string()))?;
        return snapshot.to_json().map_err(|e| AppError::Serialization(e.to_string()));
    }

    Ok(describe(region, &reading.get(region)))
}

fn describe(region: Region, value: &str) -> String {
    match region {
        Region::Invalid => format!("3-hour PSI reading: {}", value),
        Region::Overall => format!("24-hour PSI range: {}", value),
        named => format!("24-hour PSI reading for {}: {}", named, value),
    }
}
