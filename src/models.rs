use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::WeatherError;

/// Fixed location the server reports on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

// ============================================================================
// Open-Meteo API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CurrentTemperatureResponse {
    pub current: CurrentTemperature,
    pub current_units: CurrentTemperatureUnits,
}

#[derive(Debug, Deserialize)]
pub struct CurrentTemperature {
    /// Kept as the provider's number so it renders exactly as sent
    pub temperature_2m: Number,
}

#[derive(Debug, Deserialize)]
pub struct CurrentTemperatureUnits {
    pub temperature_2m: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentConditionsResponse {
    pub current: WeatherSnapshot,
    pub current_units: SnapshotUnits,
}

#[derive(Debug, Deserialize)]
pub struct DailyForecastResponse {
    pub daily: DailyData,
    pub daily_units: DailyUnits,
}

#[derive(Debug, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    pub weather_code: Vec<i32>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<f64>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<f64>,
    pub precipitation_sum: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyUnits {
    #[serde(rename = "temperature_2m_max")]
    pub temperature: String,
    pub precipitation_sum: String,
}

// ============================================================================
// Weather Records
// ============================================================================

#[derive(Debug, Clone)]
pub struct Temperature {
    pub value: Number,
    pub unit: String,
}

impl From<CurrentTemperatureResponse> for Temperature {
    fn from(response: CurrentTemperatureResponse) -> Self {
        Self {
            value: response.current.temperature_2m,
            unit: response.current_units.temperature_2m,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    pub apparent_temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: f64,
    pub precipitation: f64,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: f64,
    #[serde(rename = "weather_code")]
    pub condition_code: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotUnits {
    #[serde(rename = "temperature_2m")]
    pub temperature: String,
    pub apparent_temperature: String,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: String,
    pub precipitation: String,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: String,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub precipitation_sum: f64,
    pub condition_code: i32,
}

#[derive(Debug, Clone)]
pub struct Forecast {
    pub days: Vec<ForecastDay>,
    pub units: DailyUnits,
}

impl TryFrom<DailyForecastResponse> for Forecast {
    type Error = WeatherError;

    fn try_from(response: DailyForecastResponse) -> Result<Self, Self::Error> {
        let daily = response.daily;
        let expected = daily.time.len();
        let lengths = [
            daily.weather_code.len(),
            daily.temperature_max.len(),
            daily.temperature_min.len(),
            daily.precipitation_sum.len(),
        ];
        if lengths.iter().any(|&len| len != expected) {
            return Err(WeatherError::MalformedResponse(format!(
                "daily series have mismatched lengths: time={}, others={:?}",
                expected, lengths
            )));
        }

        let days = daily
            .time
            .into_iter()
            .zip(daily.weather_code)
            .zip(daily.temperature_max)
            .zip(daily.temperature_min)
            .zip(daily.precipitation_sum)
            .map(
                |((((date, condition_code), temperature_max), temperature_min), precipitation_sum)| {
                    ForecastDay {
                        date,
                        temperature_max,
                        temperature_min,
                        precipitation_sum,
                        condition_code,
                    }
                },
            )
            .collect();

        Ok(Self {
            days,
            units: response.daily_units,
        })
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct GetForecastRequest {
    /// Number of days to forecast (1-16). Defaults to the server's configured length.
    pub days: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn daily(times: usize, codes: usize) -> DailyForecastResponse {
        let dates: Vec<String> = (0..times).map(|i| format!("2026-10-{:02}", 16 + i)).collect();
        let weather_codes = vec![3; codes];
        let maxima = vec![14.0; times];
        let minima = vec![6.5; times];
        let precipitation = vec![0.2; times];
        serde_json::from_value(json!({
            "daily": {
                "time": dates,
                "weather_code": weather_codes,
                "temperature_2m_max": maxima,
                "temperature_2m_min": minima,
                "precipitation_sum": precipitation,
            },
            "daily_units": {
                "temperature_2m_max": "°C",
                "precipitation_sum": "mm",
            }
        }))
        .expect("daily fixture")
    }

    #[test]
    fn forecast_keeps_provider_order() {
        let forecast = Forecast::try_from(daily(3, 3)).expect("forecast");
        let dates: Vec<_> = forecast.days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["2026-10-16", "2026-10-17", "2026-10-18"]);
        assert_eq!(forecast.units.temperature, "°C");
    }

    #[test]
    fn forecast_rejects_ragged_series() {
        let err = Forecast::try_from(daily(3, 2)).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[test]
    fn snapshot_does_not_default_missing_fields() {
        let parsed = serde_json::from_value::<CurrentConditionsResponse>(json!({
            "current": {
                "temperature_2m": 12.1,
                "apparent_temperature": 10.4,
                "relative_humidity_2m": 81,
                "precipitation": 0.0,
                "wind_speed_10m": 14.8
            },
            "current_units": {
                "temperature_2m": "°C",
                "apparent_temperature": "°C",
                "relative_humidity_2m": "%",
                "precipitation": "mm",
                "wind_speed_10m": "km/h"
            }
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn snapshot_rejects_null_fields() {
        let parsed = serde_json::from_value::<WeatherSnapshot>(json!({
            "temperature_2m": null,
            "apparent_temperature": 10.4,
            "relative_humidity_2m": 81,
            "precipitation": 0.0,
            "wind_speed_10m": 14.8,
            "wind_direction_10m": 200,
            "weather_code": 3
        }));
        assert!(parsed.is_err());
    }
}
