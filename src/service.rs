use std::sync::Arc;

use rmcp::model::{
    CallToolResult, Content, Implementation, ListToolsResult, ProtocolVersion,
    ServerCapabilities, ServerInfo, Tool,
};
use serde_json::{json, Map, Value};

use crate::client::WeatherClient;
use crate::config::Config;
use crate::constants::MAX_FORECAST_DAYS;
use crate::error::WeatherError;
use crate::formatters::{format_current_weather, format_forecast, format_temperature};
use crate::models::GetForecastRequest;
use crate::protocol::{ClientCall, RpcRequest, RpcResponse};
use crate::tools::{registry, WeatherTool};

/// Main weather service: owns the tool registry and dispatches JSON-RPC calls
#[derive(Debug, Clone)]
pub struct Weather {
    client: WeatherClient,
    tools: Arc<[Tool]>,
    forecast_days: u8,
}

impl Weather {
    /// Creates a new Weather service instance from process configuration
    pub fn new(config: &Config) -> Result<Self, WeatherError> {
        let client = WeatherClient::new(
            config.api_base.clone(),
            config.location(),
            config.timezone.clone(),
            config.upstream_timeout(),
        )?;
        Ok(Self::with_client(client, config.forecast_days))
    }

    /// Creates a service around an existing client
    pub fn with_client(client: WeatherClient, forecast_days: u8) -> Self {
        let tools = registry(client.location()).into();
        Self {
            client,
            tools,
            forecast_days,
        }
    }

    pub fn get_info(&self) -> ServerInfo {
        let location = self.client.location();
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "weather-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(format!(
                "A weather information service powered by the Open-Meteo API. \
                Provides the current temperature, current conditions and a daily forecast \
                for ({}, {}).",
                location.latitude, location.longitude
            )),
        }
    }

    /// Tools in registry order
    pub fn list_tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Parses a raw body and dispatches it; never fails
    pub async fn handle_body(&self, body: &[u8]) -> RpcResponse {
        match RpcRequest::parse(body) {
            Ok(request) => self.handle(request).await,
            Err((id, err)) => {
                tracing::warn!("Rejecting request: {}", err);
                RpcResponse::failure(id, err)
            }
        }
    }

    /// Dispatches one request and packages the outcome under the request's id
    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        let RpcRequest {
            id, method, params, ..
        } = request;
        tracing::info!(method = %method, "Handling request");

        let result = match ClientCall::decode(&method, params) {
            Ok(call) => self.execute(call).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            tracing::warn!(method = %method, "Request failed: {}", err);
        }

        RpcResponse::new(id, result)
    }

    async fn execute(&self, call: ClientCall) -> Result<Value, WeatherError> {
        match call {
            ClientCall::Initialize => Ok(serde_json::to_value(self.get_info())?),
            ClientCall::Initialized | ClientCall::Ping => Ok(json!({})),
            ClientCall::ListTools => {
                let result = ListToolsResult::with_all_items(self.list_tools().to_vec());
                Ok(serde_json::to_value(result)?)
            }
            ClientCall::CallTool(params) => {
                let result = self.call_tool(&params.name, params.arguments).await?;
                Ok(serde_json::to_value(result)?)
            }
        }
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, WeatherError> {
        let tool =
            WeatherTool::from_name(name).ok_or_else(|| WeatherError::UnknownTool(name.to_string()))?;
        tracing::info!("Calling tool: {}", name);

        let text = match tool {
            WeatherTool::Temperature => self.get_temperature().await?,
            WeatherTool::CurrentWeather => self.get_current_weather().await?,
            WeatherTool::Forecast => {
                let request = match arguments {
                    Some(arguments) => serde_json::from_value(Value::Object(arguments))
                        .map_err(|e| WeatherError::InvalidArguments(e.to_string()))?,
                    None => GetForecastRequest::default(),
                };
                self.get_forecast(request).await?
            }
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Gets the current temperature
    async fn get_temperature(&self) -> Result<String, WeatherError> {
        let temperature = self.client.current_temperature().await?;
        Ok(format_temperature(&temperature))
    }

    /// Gets detailed current conditions
    async fn get_current_weather(&self) -> Result<String, WeatherError> {
        let (snapshot, units) = self.client.current_conditions().await?;
        Ok(format_current_weather(&snapshot, &units))
    }

    /// Gets the daily forecast
    async fn get_forecast(&self, request: GetForecastRequest) -> Result<String, WeatherError> {
        let days = request.days.unwrap_or(self.forecast_days);
        if !(1..=MAX_FORECAST_DAYS).contains(&days) {
            return Err(WeatherError::InvalidArguments(format!(
                "days must be between 1 and {}, got {}",
                MAX_FORECAST_DAYS, days
            )));
        }

        tracing::info!("Getting {} day forecast", days);
        let forecast = self.client.daily_forecast(days).await?;
        Ok(format_forecast(&forecast))
    }
}
