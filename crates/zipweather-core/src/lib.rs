pub mod config;
pub mod error;

pub use config::{
    Config, ConfigValidationError, RetrySettings, ValidationResult, WeatherConfig,
    API_KEY_ENV, API_URL_ENV, OUTPUT_DIR_ENV,
};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize logging for the process.
///
/// Reads the filter from `RUST_LOG`, falling back to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("ZipWeather core initialized");
    Ok(())
}
