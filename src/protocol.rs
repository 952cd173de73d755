use rmcp::ErrorData as McpError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::JSONRPC_VERSION;
use crate::error::WeatherError;

/// Opaque correlation token; `null` when the caller sent none
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Value);

impl RequestId {
    pub fn null() -> Self {
        Self(Value::Null)
    }
}

/// JSON-RPC request as decoded at the HTTP edge; `method` and `params` are
/// decoded further into a [`ClientCall`]
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: RequestId,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Parses a raw body. On failure the error is paired with whatever id
    /// could still be recovered, or `null`.
    pub fn parse(body: &[u8]) -> Result<Self, (RequestId, WeatherError)> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| (RequestId::null(), WeatherError::MalformedRequest(e.to_string())))?;

        let id = value
            .get("id")
            .cloned()
            .map(RequestId)
            .unwrap_or_default();

        serde_json::from_value(value).map_err(|e| (id, WeatherError::MalformedRequest(e.to_string())))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(McpError),
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl RpcResponse {
    pub fn new(id: RequestId, result: Result<Value, WeatherError>) -> Self {
        let outcome = match result {
            Ok(value) => Outcome::Result(value),
            Err(err) => Outcome::Error(err.into()),
        };
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome,
        }
    }

    pub fn success(id: RequestId, result: Value) -> Self {
        Self::new(id, Ok(result))
    }

    pub fn failure(id: RequestId, err: WeatherError) -> Self {
        Self::new(id, Err(err))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// Every method this server answers, with its decoded params
#[derive(Debug, Clone)]
pub enum ClientCall {
    Initialize,
    Initialized,
    Ping,
    ListTools,
    CallTool(CallToolParams),
}

impl ClientCall {
    pub const METHODS: &'static [&'static str] = &[
        "initialize",
        "notifications/initialized",
        "ping",
        "tools/list",
        "tools/call",
    ];

    pub fn decode(method: &str, params: Option<Value>) -> Result<Self, WeatherError> {
        match method {
            "initialize" => Ok(ClientCall::Initialize),
            "notifications/initialized" => Ok(ClientCall::Initialized),
            "ping" => Ok(ClientCall::Ping),
            "tools/list" => Ok(ClientCall::ListTools),
            "tools/call" => {
                let params = params.ok_or_else(|| {
                    WeatherError::MalformedRequest("tools/call requires params".into())
                })?;
                let params = serde_json::from_value(params)
                    .map_err(|e| WeatherError::MalformedRequest(e.to_string()))?;
                Ok(ClientCall::CallTool(params))
            }
            other => Err(WeatherError::UnknownMethod(other.to_string())),
        }
    }
}
