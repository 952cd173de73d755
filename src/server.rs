use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::constants::MESSAGES_PATH;
use crate::protocol::{ClientCall, RpcRequest, RpcResponse};
use crate::service::Weather;
use crate::stream::{frames, Frame, PushMessage, SubscriberRegistry};

/// Shared state handed to every handler
pub struct AppState {
    pub weather: Weather,
    pub subscribers: SubscriberRegistry,
    pub stream_timeout: Duration,
}

impl AppState {
    pub fn new(weather: Weather, stream_timeout: Duration) -> Self {
        Self {
            weather,
            subscribers: SubscriberRegistry::new(),
            stream_timeout,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/sse", get(sse_stream).post(sse_ack))
        .route(MESSAGES_PATH, post(messages))
        .route("/mcp", post(mcp))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn logging_middleware(req: Request, next: Next) -> Response {
    let path = req
        .uri()
        .path_and_query()
        .map_or(String::new(), |p| p.to_string());
    let method = req.method().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        method = method,
        path = path,
        status = response.status().as_str(),
        elapsed = ?started.elapsed(),
    );

    response
}

async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let server = state.weather.get_info();
    let tools: Vec<&str> = state.weather.list_tools().iter().map(|t| t.name.as_ref()).collect();
    let info = format!(
        "MCP Weather Server\n\n\
        Available endpoints:\n\
        - GET /health - Health check\n\
        - GET /sse - MCP push stream (SSE transport)\n\
        - POST /sse - JSON-RPC acknowledgement\n\
        - POST {} - JSON-RPC over the push stream\n\
        - POST /mcp - JSON-RPC request/response\n\n\
        Server: {} {}\n\
        Methods: {}\n\
        Tools: {}\n",
        MESSAGES_PATH,
        server.server_info.name,
        server.server_info.version,
        ClientCall::METHODS.join(", "),
        tools.join(", "),
    );
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], info)
}

async fn health() -> &'static str {
    "OK"
}

/// Synchronous request/response endpoint
async fn mcp(State(state): State<Arc<AppState>>, body: Bytes) -> Json<RpcResponse> {
    Json(state.weather.handle_body(&body).await)
}

/// Acknowledges a JSON-RPC message without dispatching it
async fn sse_ack(body: Bytes) -> Json<RpcResponse> {
    let response = match RpcRequest::parse(&body) {
        Ok(request) => {
            tracing::debug!(method = %request.method, "Acknowledging message");
            RpcResponse::success(
                request.id,
                json!({"acknowledged": true, "method": request.method}),
            )
        }
        Err((id, err)) => RpcResponse::failure(id, err),
    };
    Json(response)
}

async fn sse_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.subscribers.subscribe();
    let endpoint = format!("{}?session_id={}", MESSAGES_PATH, subscription.id());

    let events = frames(subscription, endpoint, state.stream_timeout)
        .map(|frame| match frame {
            Frame::Endpoint(path) => Some(Event::default().event("endpoint").data(path)),
            Frame::Message(PushMessage(payload)) => {
                match Event::default().event("message").json_data(&payload) {
                    Ok(event) => Some(event),
                    Err(err) => {
                        tracing::warn!("Dropping stream after framing error: {}", err);
                        None
                    }
                }
            }
            Frame::KeepAlive => Some(Event::default().comment("keepalive")),
        })
        .take_while(|event| futures::future::ready(event.is_some()))
        .filter_map(|event| futures::future::ready(event.map(Ok)));

    Sse::new(events)
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Option<Uuid>,
}

/// Dispatches a message and delivers the response on the push stream
async fn messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> Response {
    if let Some(id) = &query.session_id {
        if !state.subscribers.contains(id) {
            return (StatusCode::NOT_FOUND, "Could not find session").into_response();
        }
    }

    let request = match RpcRequest::parse(&body) {
        Ok(request) => request,
        Err((id, err)) => {
            return (StatusCode::BAD_REQUEST, Json(RpcResponse::failure(id, err))).into_response();
        }
    };

    let response = state.weather.handle(request).await;
    let message = match PushMessage::new(&response) {
        Ok(message) => message,
        Err(err) => {
            tracing::error!("Failed to encode response: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match query.session_id {
        Some(id) => {
            if !state.subscribers.send_to(&id, message) {
                return (StatusCode::NOT_FOUND, "Could not find session").into_response();
            }
        }
        None => {
            let delivered = state.subscribers.broadcast(message);
            tracing::debug!("Broadcast response to {} subscribers", delivered);
        }
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
