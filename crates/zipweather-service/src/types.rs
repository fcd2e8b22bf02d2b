use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::WeatherError;

/// A US ZIP code: exactly five ASCII digits.
///
/// Only constructed through [`ZipCode::parse`], so holding one means the
/// value has already been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    pub const LEN: usize = 5;

    /// Validate `input` as a ZIP code.
    ///
    /// # Errors
    /// `WeatherError::Validation` unless `input` is exactly five ASCII digits.
    pub fn parse(input: &str) -> Result<Self, WeatherError> {
        if input.len() == Self::LEN && input.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(WeatherError::Validation(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ZipCode {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ZipCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Provider payload, kept as an opaque JSON object.
///
/// Only `main.temp` is interpreted; every other field is carried through
/// to the snapshot untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherResponse(Map<String, Value>);

impl WeatherResponse {
    /// Parse a response body. Anything other than a JSON object is rejected.
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed or non-object bodies.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The nested `"main"` section, if the provider sent one.
    pub fn main(&self) -> Option<&Value> {
        self.0.get("main")
    }

    pub(crate) fn main_mut(&mut self) -> Option<&mut Value> {
        self.0.get_mut("main")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for WeatherResponse {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
