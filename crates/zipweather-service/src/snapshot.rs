//! Writes each fetched response to `weather_info_<zip>_<YYYYMMDDHHMMSS>.json`.
//!
//! Timestamps have second resolution, so two snapshots for the same ZIP code
//! within one second share a name and the later one replaces the earlier.

use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{WeatherResponse, ZipCode};

const LOG_TARGET: &str = "zipweather::snapshot";

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    base_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_name(zip: &ZipCode, timestamp: &DateTime<Local>) -> String {
        format!("weather_info_{}_{}.json", zip, timestamp.format("%Y%m%d%H%M%S"))
    }

    /// Write `response` under the base directory, stamped with the local time.
    ///
    /// # Errors
    /// `WeatherError::Storage` if the file cannot be written. Nothing is retried
    /// and a partially written file is not cleaned up.
    #[instrument(skip(self, zip, response), fields(zip = %zip), level = "info")]
    pub fn save(&self, zip: &ZipCode, response: &WeatherResponse) -> Result<PathBuf, WeatherError> {
        self.save_at(zip, response, Local::now())
    }

    /// Same as [`SnapshotWriter::save`] with an explicit timestamp.
    ///
    /// # Errors
    /// See [`SnapshotWriter::save`].
    pub fn save_at(
        &self,
        zip: &ZipCode,
        response: &WeatherResponse,
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf, WeatherError> {
        let path = self.base_dir.join(Self::file_name(zip, &timestamp));

        let json = serde_json::to_string(response)
            .map_err(|e| storage_error(&path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

        fs::write(&path, json).map_err(|e| storage_error(&path, e))?;

        tracing::info!(target: LOG_TARGET, "Saved weather snapshot to {}", path.display());
        Ok(path)
    }
}

fn storage_error(path: &Path, source: io::Error) -> WeatherError {
    if source.kind() == io::ErrorKind::PermissionDenied {
        tracing::error!(
            target: LOG_TARGET,
            "File permission error while saving weather data to {}: {}",
            path.display(),
            source
        );
    } else {
        tracing::error!(
            target: LOG_TARGET,
            "OS error while saving weather data to {}: {}",
            path.display(),
            source
        );
    }

    WeatherError::Storage {
        path: path.to_path_buf(),
        source,
    }
}
