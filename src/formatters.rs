use crate::models::{Forecast, SnapshotUnits, Temperature, WeatherSnapshot};

/// Compass labels, clockwise from north, as used on Dutch weather reports
const COMPASS: [&str; 8] = ["N", "NO", "O", "ZO", "Z", "ZW", "W", "NW"];

pub const UNKNOWN_CONDITION: &str = "Unknown";

/// Formats the instant temperature reading
pub fn format_temperature(temperature: &Temperature) -> String {
    format!(
        "Current temperature: {}{}",
        temperature.value, temperature.unit
    )
}

/// Formats current conditions into a human-readable string
pub fn format_current_weather(snapshot: &WeatherSnapshot, units: &SnapshotUnits) -> String {
    format!(
        "Current weather:\n  Temperature: {:.1}{}\n  Feels like: {:.1}{}\n  Humidity: {:.0}{}\n  Precipitation: {:.1} {}\n  Wind: {:.1} {} {}\n  Conditions: {}",
        snapshot.temperature,
        units.temperature,
        snapshot.apparent_temperature,
        units.apparent_temperature,
        snapshot.humidity,
        units.humidity,
        snapshot.precipitation,
        units.precipitation,
        snapshot.wind_speed,
        units.wind_speed,
        wind_direction(snapshot.wind_direction),
        weather_code_to_description(snapshot.condition_code),
    )
}

/// Formats a daily forecast, one line per day in provider order
pub fn format_forecast(forecast: &Forecast) -> String {
    forecast
        .days
        .iter()
        .map(|day| {
            format!(
                "{}: {}, {:.1}{} - {:.1}{}, precipitation {:.1} {}",
                day.date,
                weather_code_to_description(day.condition_code),
                day.temperature_min,
                forecast.units.temperature,
                day.temperature_max,
                forecast.units.temperature,
                day.precipitation_sum,
                forecast.units.precipitation_sum,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps a bearing in degrees onto one of eight 45° sectors, north centred on 0°
pub fn wind_direction(degrees: f64) -> &'static str {
    let sector = ((degrees + 22.5) / 45.0).floor() as i64;
    COMPASS[sector.rem_euclid(8) as usize]
}

/// Converts WMO weather code to human-readable description
pub fn weather_code_to_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_CONDITION,
    }
}
