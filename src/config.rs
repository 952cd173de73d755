use std::time::Duration;

use clap::Parser;

use crate::constants::{
    DEFAULT_FORECAST_DAYS, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_STREAM_TIMEOUT_SECS,
    DEFAULT_TIMEZONE, DEFAULT_UPSTREAM_TIMEOUT_SECS, MAX_FORECAST_DAYS, OPEN_METEO_API_BASE,
};
use crate::models::Coordinate;

/// Process configuration, read from flags with environment fallbacks
#[derive(Parser, Debug, Clone)]
#[command(version, about = "MCP weather server over HTTP and SSE", long_about = None)]
pub struct Config {
    #[arg(long, env = "WEATHER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "WEATHER_PORT", default_value_t = 8000u16)]
    pub port: u16,

    #[arg(long, env = "WEATHER_LATITUDE", default_value_t = DEFAULT_LATITUDE, allow_hyphen_values = true)]
    pub latitude: f64,

    #[arg(long, env = "WEATHER_LONGITUDE", default_value_t = DEFAULT_LONGITUDE, allow_hyphen_values = true)]
    pub longitude: f64,

    /// IANA zone passed to the provider
    #[arg(long, env = "WEATHER_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    #[arg(long, env = "OPEN_METEO_API_BASE", default_value = OPEN_METEO_API_BASE)]
    pub api_base: String,

    /// Days returned by get_forecast when the caller does not ask for a count
    #[arg(
        long,
        env = "WEATHER_FORECAST_DAYS",
        default_value_t = DEFAULT_FORECAST_DAYS,
        value_parser = clap::value_parser!(u8).range(1..=MAX_FORECAST_DAYS as i64)
    )]
    pub forecast_days: u8,

    #[arg(long, env = "WEATHER_STREAM_TIMEOUT_SECS", default_value_t = DEFAULT_STREAM_TIMEOUT_SECS)]
    pub stream_timeout_secs: u64,

    #[arg(long, env = "WEATHER_UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn location(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}
