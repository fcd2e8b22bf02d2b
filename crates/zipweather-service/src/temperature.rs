//! Kelvin to Fahrenheit conversion and `main.temp` extraction.

use serde_json::Value;

use crate::types::WeatherResponse;

const KELVIN_OFFSET: f64 = 273.15;

/// `(K - 273.15) * 9/5 + 32`, rounded to two decimal places.
pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    let fahrenheit = (kelvin - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0;
    (fahrenheit * 100.0).round() / 100.0
}

/// Rewrite `main.temp` from Kelvin to Fahrenheit in place.
///
/// Returns the converted value. A response without `"main"` is left alone;
/// so is one whose `"main"` has no numeric `"temp"`.
pub(crate) fn convert_temperature(response: &mut WeatherResponse) -> Option<f64> {
    let main = response.main_mut()?;
    let Some(temp) = main.get_mut("temp") else {
        tracing::warn!("Weather response has \"main\" but no \"temp\"; leaving it unconverted");
        return None;
    };
    let Some(kelvin) = temp.as_f64() else {
        tracing::warn!("Weather response \"main.temp\" is not a number: {}", temp);
        return None;
    };

    let fahrenheit = kelvin_to_fahrenheit(kelvin);
    *temp = Value::from(fahrenheit);
    Some(fahrenheit)
}

/// `main.temp` of a response, or `None` when the provider sent no `"main"`.
pub fn extract_temperature(response: &WeatherResponse) -> Option<f64> {
    response.main()?.get("temp")?.as_f64()
}
