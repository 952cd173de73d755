use std::sync::Arc;

use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::{JsonObject, Tool};
use serde_json::{json, Value};

use crate::models::{Coordinate, GetForecastRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherTool {
    Temperature,
    CurrentWeather,
    Forecast,
}

impl WeatherTool {
    pub const ALL: [WeatherTool; 3] = [
        WeatherTool::Temperature,
        WeatherTool::CurrentWeather,
        WeatherTool::Forecast,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WeatherTool::Temperature => "get_temperature",
            WeatherTool::CurrentWeather => "get_current_weather",
            WeatherTool::Forecast => "get_forecast",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self, location: Coordinate) -> String {
        let at = format!("({}, {})", location.latitude, location.longitude);
        match self {
            WeatherTool::Temperature => {
                format!("Get current temperature for location {at} via OpenMeteo API")
            }
            WeatherTool::CurrentWeather => format!(
                "Get current weather for location {at}: temperature, feels-like, humidity, precipitation, wind and conditions"
            ),
            WeatherTool::Forecast => format!(
                "Get the daily forecast for location {at}: conditions, temperature range and precipitation per day"
            ),
        }
    }

    fn input_schema(self) -> Arc<JsonObject> {
        match self {
            WeatherTool::Forecast => cached_schema_for_type::<GetForecastRequest>(),
            _ => Arc::new(no_arguments()),
        }
    }

    /// Listing entry for `tools/list`
    pub fn descriptor(self, location: Coordinate) -> Tool {
        Tool::new(self.name(), self.description(location), self.input_schema())
    }
}

fn no_arguments() -> JsonObject {
    let mut schema = JsonObject::new();
    schema.insert("type".into(), Value::from("object"));
    schema.insert("properties".into(), json!({}));
    schema.insert("required".into(), json!([]));
    schema
}

/// Builds the fixed, ordered tool list for a location
pub fn registry(location: Coordinate) -> Vec<Tool> {
    WeatherTool::ALL
        .into_iter()
        .map(|tool| tool.descriptor(location))
        .collect()
}
