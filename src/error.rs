use rmcp::model::ErrorCode;
use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Every failure a dispatched call can end in
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("Method not found: {0}")]
    UnknownMethod(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// `body` is kept for logs only and never reaches the caller
    #[error("upstream returned {status}")]
    Upstream { status: u16, body: String },
    #[error("upstream request failed: {0}")]
    Transport(reqwest::Error),
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl WeatherError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WeatherError::UnknownMethod(_) | WeatherError::UnknownTool(_) => {
                ErrorCode::METHOD_NOT_FOUND
            }
            WeatherError::InvalidArguments(_) => ErrorCode::INVALID_PARAMS,
            _ => ErrorCode::INTERNAL_ERROR,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err.without_url())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Internal(err.to_string())
    }
}

impl From<WeatherError> for McpError {
    fn from(err: WeatherError) -> Self {
        McpError::new(err.code(), err.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_failures_map_to_method_not_found() {
        assert_eq!(WeatherError::UnknownMethod("x".into()).code().0, -32601);
        assert_eq!(WeatherError::UnknownTool("x".into()).code().0, -32601);
    }

    #[test]
    fn everything_else_is_internal() {
        let upstream = WeatherError::Upstream {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(upstream.code().0, -32603);
        assert_eq!(WeatherError::MalformedRequest("x".into()).code().0, -32603);
        assert_eq!(WeatherError::MalformedResponse("x".into()).code().0, -32603);
    }

    #[test]
    fn error_data_carries_display_message() {
        let data = McpError::from(WeatherError::UnknownTool("get_alerts".into()));
        assert_eq!(data.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(data.message, "Unknown tool: get_alerts");
        assert!(data.data.is_none());
    }

    #[test]
    fn upstream_message_omits_provider_body() {
        let data = McpError::from(WeatherError::Upstream {
            status: 502,
            body: "<html>Bad Gateway</html>".into(),
        });
        assert_eq!(data.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(data.message, "upstream returned 502");
        assert!(data.data.is_none());
    }
}
