//! Error kinds for the weather flow.
//!
//! Each stage fails with its own variant so the caller can tell a bad ZIP
//! code, an unreachable API and a failed snapshot write apart.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single request attempt failed.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl TransportFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid zipcode: {0:?}")]
    Validation(String),

    #[error("Weather API request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportFailure,
    },

    #[error("Failed to save weather snapshot {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid zipcode. Enter exactly 5 digits.",
            Self::Transport { source, .. } if source.is_timeout() => {
                "The weather service timed out. Please try again."
            }
            Self::Transport { .. } => {
                "Unable to reach the weather service. Check your connection and API key."
            }
            Self::Storage { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                "Permission denied while saving weather data. Check WEATHER_INFO_DIR."
            }
            Self::Storage { .. } => "Failed to save weather data. Check WEATHER_INFO_DIR.",
        }
    }

    /// Whether running the flow again might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
