//! Validate → fetch → snapshot → extract.

use std::path::PathBuf;
use tracing::instrument;

use crate::error::WeatherError;
use crate::provider::WeatherProvider;
use crate::snapshot::SnapshotWriter;
use crate::temperature::extract_temperature;
use crate::types::ZipCode;

const LOG_TARGET: &str = "zipweather::flow";

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReport {
    pub zip: ZipCode,
    /// Fahrenheit; `None` when the provider sent no `"main"` section
    pub temperature: Option<f64>,
    pub snapshot_path: PathBuf,
}

#[derive(Debug)]
pub struct WeatherFlow {
    provider: WeatherProvider,
    writer: SnapshotWriter,
}

impl WeatherFlow {
    pub fn new(provider: WeatherProvider, writer: SnapshotWriter) -> Self {
        Self { provider, writer }
    }

    pub fn provider(&self) -> &WeatherProvider {
        &self.provider
    }

    /// Current temperature in Fahrenheit for `zip`.
    ///
    /// # Errors
    /// See [`WeatherFlow::run_with_report`].
    pub async fn run(&self, zip: &str) -> Result<Option<f64>, WeatherError> {
        Ok(self.run_with_report(zip).await?.temperature)
    }

    /// Run the whole flow and report where the snapshot went.
    ///
    /// The snapshot is written before the temperature is read, whether or not
    /// the response carries one.
    ///
    /// # Errors
    /// - `Validation` if `zip` is not five digits; nothing is fetched or written.
    /// - `Transport` from the fetch; nothing is written.
    /// - `Storage` from the snapshot; no temperature is returned.
    #[instrument(skip(self), level = "info")]
    pub async fn run_with_report(&self, zip: &str) -> Result<FlowReport, WeatherError> {
        let zip = ZipCode::parse(zip).inspect_err(|e| {
            tracing::warn!(target: LOG_TARGET, "{}", e);
        })?;

        let response = self.provider.fetch(&zip).await?;
        let snapshot_path = self.writer.save(&zip, &response)?;
        let temperature = extract_temperature(&response);

        match temperature {
            Some(t) => tracing::info!(target: LOG_TARGET, "Temperature for {}: {}°F", zip, t),
            None => tracing::info!(target: LOG_TARGET, "No temperature reported for {}", zip),
        }

        Ok(FlowReport {
            zip,
            temperature,
            snapshot_path,
        })
    }
}
