//! Current temperature for a US ZIP code.
//!
//! Fetches from OpenWeatherMap with a 30-minute in-process cache and bounded
//! retry, converts Kelvin to Fahrenheit, writes a JSON snapshot of every
//! response and hands back `main.temp`.

pub mod cache;
pub mod error;
pub mod flow;
pub mod provider;
pub mod retry;
pub mod snapshot;
pub mod temperature;
pub mod types;

pub use cache::{Clock, ManualClock, SystemClock, WeatherCache};
pub use error::{TransportFailure, WeatherError};
pub use flow::{FlowReport, WeatherFlow};
pub use provider::WeatherProvider;
pub use retry::RetryConfig;
pub use snapshot::SnapshotWriter;
pub use temperature::{extract_temperature, kelvin_to_fahrenheit};
pub use types::{WeatherResponse, ZipCode};
