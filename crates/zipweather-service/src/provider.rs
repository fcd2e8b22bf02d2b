//! OpenWeatherMap current-weather client.
//!
//! Owns the response cache and the retry policy. A cache hit returns
//! immediately; a miss makes up to `retry.total_attempts()` requests, converts
//! `main.temp` to Fahrenheit once, and stores the result.

use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::instrument;

use crate::cache::WeatherCache;
use crate::error::{TransportFailure, WeatherError};
use crate::retry::{with_retry, RetryConfig, RetryExhausted};
use crate::temperature::convert_temperature;
use crate::types::{WeatherResponse, ZipCode};

const LOG_TARGET: &str = "zipweather::fetch";

pub const OPEN_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
    cache: WeatherCache,
    retry: RetryConfig,
}

impl fmt::Debug for WeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("cache", &self.cache)
            .field("retry", &self.retry)
            .finish()
    }
}

impl WeatherProvider {
    /// # Errors
    /// Fails only if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: OPEN_WEATHER_URL.to_string(),
            api_key: api_key.into(),
            cache: WeatherCache::new(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache(mut self, cache: WeatherCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Current weather for `zip`, temperature in Fahrenheit.
    ///
    /// # Errors
    /// `WeatherError::Transport` when every attempt failed to produce a JSON
    /// object. The last cause is kept as the error source.
    #[instrument(skip(self, zip), fields(zip = %zip), level = "info")]
    pub async fn fetch(&self, zip: &ZipCode) -> Result<WeatherResponse, WeatherError> {
        if let Some(cached) = self.cache.get(zip) {
            tracing::debug!(target: LOG_TARGET, "Cache hit for {}", zip);
            return Ok(cached);
        }
        tracing::debug!(target: LOG_TARGET, "Cache miss for {}", zip);

        let total = self.retry.total_attempts();
        let mut response = match with_retry(&self.retry, move |attempt| async move {
            let result = self.request_once(zip, attempt).await;
            match &result {
                Ok(_) if attempt > 1 => {
                    tracing::info!(
                        target: LOG_TARGET,
                        "Request succeeded after {} retries",
                        attempt - 1
                    );
                }
                Err(e) if attempt < total => {
                    tracing::warn!(
                        target: LOG_TARGET,
                        "Attempt {} of {} failed: {}; retrying in {:?}",
                        attempt,
                        total,
                        e,
                        self.retry.delay_for_attempt(attempt - 1)
                    );
                }
                _ => {}
            }
            result
        })
        .await
        {
            Ok(response) => response,
            Err(RetryExhausted {
                attempts,
                last_error,
            }) => {
                tracing::error!(
                    target: LOG_TARGET,
                    "API error while retrieving weather info for {} after {} attempt(s): {}",
                    zip,
                    attempts,
                    last_error
                );
                return Err(WeatherError::Transport {
                    attempts,
                    source: last_error,
                });
            }
        };

        convert_temperature(&mut response);
        self.cache.insert(zip, response.clone());
        Ok(response)
    }

    async fn request_once(
        &self,
        zip: &ZipCode,
        attempt: u32,
    ) -> Result<WeatherResponse, TransportFailure> {
        // Strip the URL from errors: it carries the API key.
        let response = self
            .client
            .get(self.request_url(zip))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                target: LOG_TARGET,
                "Weather API returned status {} on attempt {}",
                status,
                attempt
            );
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        Ok(WeatherResponse::from_json(&body)?)
    }

    fn request_url(&self, zip: &ZipCode) -> String {
        format!("{}?zip={},us&appid={}", self.base_url, zip, self.api_key)
    }
}
