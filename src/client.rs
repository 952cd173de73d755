use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::constants::USER_AGENT;
use crate::error::WeatherError;
use crate::models::{
    Coordinate, CurrentConditionsResponse, CurrentTemperatureResponse, DailyForecastResponse,
    Forecast, SnapshotUnits, Temperature, WeatherSnapshot,
};

const INSTANT_FIELDS: &str = "temperature_2m";
const DETAILED_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,precipitation,wind_speed_10m,wind_direction_10m,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum";

/// Query shapes understood by the forecast endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Instant,
    Detailed,
    Forecast(u8),
}

impl Mode {
    fn query(self) -> Vec<(&'static str, String)> {
        match self {
            Mode::Instant => vec![("current", INSTANT_FIELDS.to_string())],
            Mode::Detailed => vec![("current", DETAILED_FIELDS.to_string())],
            Mode::Forecast(days) => vec![
                ("daily", DAILY_FIELDS.to_string()),
                ("forecast_days", days.to_string()),
            ],
        }
    }
}

/// Open-Meteo client bound to one location
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Arc<Client>,
    base_url: String,
    location: Coordinate,
    timezone: String,
}

impl WeatherClient {
    /// Creates a client bound to one location; `timeout` caps each request
    pub fn new(
        base_url: impl Into<String>,
        location: Coordinate,
        timezone: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http: Arc::new(http),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            location,
            timezone: timezone.into(),
        })
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    /// Fetches the instant temperature
    pub async fn current_temperature(&self) -> Result<Temperature, WeatherError> {
        let response: CurrentTemperatureResponse = self.fetch(Mode::Instant).await?;
        Ok(response.into())
    }

    /// Fetches the detailed current conditions with their units
    pub async fn current_conditions(
        &self,
    ) -> Result<(WeatherSnapshot, SnapshotUnits), WeatherError> {
        let response: CurrentConditionsResponse = self.fetch(Mode::Detailed).await?;
        Ok((response.current, response.current_units))
    }

    /// Fetches `days` days of daily forecast
    pub async fn daily_forecast(&self, days: u8) -> Result<Forecast, WeatherError> {
        let response: DailyForecastResponse = self.fetch(Mode::Forecast(days)).await?;
        Forecast::try_from(response)
    }

    /// Makes a single GET against the forecast endpoint and decodes the body
    async fn fetch<T: DeserializeOwned>(&self, mode: Mode) -> Result<T, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let mut query = vec![
            ("latitude", self.location.latitude.to_string()),
            ("longitude", self.location.longitude.to_string()),
        ];
        query.extend(mode.query());
        query.push(("timezone", self.timezone.clone()));

        tracing::debug!(?mode, "Requesting Open-Meteo forecast");
        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "Open-Meteo request failed");
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::MalformedResponse(e.to_string()))
    }
}
