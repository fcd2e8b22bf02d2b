//! ZipWeather - current temperature for a US ZIP code.
//!
//! Prompts for a ZIP code (or takes `--zip`), runs one lookup, prints the
//! temperature in Fahrenheit and leaves a JSON snapshot in `WEATHER_INFO_DIR`.

mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use zipweather_core::{Config, ConfigError};
use zipweather_service::{
    RetryConfig, SnapshotWriter, WeatherCache, WeatherError, WeatherFlow, WeatherProvider,
};

use cli::{classify_input, format_temperature, Cli, PromptAction, PROMPT};

/// Wire the flow from resolved configuration
fn build_flow(config: &Config) -> Result<WeatherFlow> {
    let retry = RetryConfig::new(
        config.retry.max_retries,
        config.retry.initial_delay_ms,
        config.retry.max_delay_ms,
    );
    let cache = WeatherCache::with_ttl_minutes(config.weather.cache_ttl_minutes);

    let provider = WeatherProvider::new(
        config.api_key.clone(),
        Duration::from_secs(config.weather.request_timeout_secs),
    )
    .context("Failed to build HTTP client")?
    .with_base_url(config.weather.api_base_url.clone())
    .with_cache(cache)
    .with_retry(retry);

    Ok(WeatherFlow::new(
        provider,
        SnapshotWriter::new(config.output_dir.clone()),
    ))
}

async fn lookup(flow: &WeatherFlow, zip: &str) -> Result<()> {
    let report = flow.run_with_report(zip).await?;
    tracing::debug!("Snapshot written to {}", report.snapshot_path.display());
    println!("{}", format_temperature(report.zip.as_str(), report.temperature));
    Ok(())
}

/// Prompt until a lookup runs, the user quits, or stdin closes
async fn interactive(flow: &WeatherFlow) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        match classify_input(&line) {
            PromptAction::Lookup(zip) => return lookup(flow, &zip).await,
            PromptAction::Quit => return Ok(()),
            PromptAction::Reprompt => continue,
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let (config, validation) = Config::load_validated(cli.config.as_deref())
        .context("Failed to load configuration")?;
    tracing::debug!(
        "Loaded config with {} warning(s): {:?}",
        validation.warnings.len(),
        config
    );

    let flow = build_flow(&config)?;

    match cli.zip {
        Some(zip) => lookup(&flow, &zip).await,
        None => interactive(&flow).await,
    }
}

/// Message shown to the user for a failed run
fn user_message(error: &anyhow::Error) -> String {
    if let Some(e) = error.downcast_ref::<WeatherError>() {
        e.user_message().to_string()
    } else if let Some(e) = error.downcast_ref::<ConfigError>() {
        e.user_message().to_string()
    } else {
        format!("Error: {:#}", error)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = zipweather_core::init() {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}
