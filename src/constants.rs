/// User agent string for HTTP requests
pub const USER_AGENT: &str = concat!("mcp-weather-sse/", env!("CARGO_PKG_VERSION"));

/// Open-Meteo API base URL
pub const OPEN_METEO_API_BASE: &str = "https://api.open-meteo.com/v1";

/// Default location (Nijmegen)
pub const DEFAULT_LATITUDE: f64 = 51.836316614873176;
pub const DEFAULT_LONGITUDE: f64 = 5.79300494667676;
pub const DEFAULT_TIMEZONE: &str = "Europe/Amsterdam";

/// Open-Meteo accepts at most 16 forecast days
pub const MAX_FORECAST_DAYS: u8 = 16;
pub const DEFAULT_FORECAST_DAYS: u8 = 7;

/// Idle time after which a push stream emits its keepalive and closes
pub const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

pub const JSONRPC_VERSION: &str = "2.0";

/// Path advertised to stream clients for posting messages
pub const MESSAGES_PATH: &str = "/messages";
