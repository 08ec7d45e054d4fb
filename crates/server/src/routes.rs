use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};

use geomcp_common::config::TransportConfig;
use geomcp_common::GeoMcpError;

use crate::protocol::{error_codes, JsonRpcMessage, JsonRpcResponse, MessageError};
use crate::provider::MapsProvider;
use crate::session::{AttachError, SessionRegistry};
use crate::stream::ListenStream;
use crate::tools::{ToolHandlerContext, ToolRegistry};

/// Header carrying the session id on requests and on the initialize reply.
pub const SESSION_HEADER: &str = "mcp-session-id";
/// Older clients send the bare name.
pub const LEGACY_SESSION_HEADER: &str = "session-id";

const NO_VALID_SESSION: &str = "Bad Request: No valid session ID provided";
const INVALID_SESSION_TEXT: &str = "Invalid or missing session ID";

/// Shared application state.
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub metrics_handle: PrometheusHandle,
    pub transport: TransportConfig,
}

impl AppState {
    pub fn new(
        transport: TransportConfig,
        provider: Arc<dyn MapsProvider>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        let tools = Arc::new(ToolRegistry::new(ToolHandlerContext { provider }));
        let sessions = Arc::new(SessionRegistry::new(tools, transport.listen_buffer));
        Self {
            sessions,
            metrics_handle,
            transport,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let endpoint = state.transport.endpoint_path.clone();
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            &endpoint,
            post(post_handler).get(get_handler).delete(delete_handler),
        )
        .with_state(state)
}

/// Every way a transport request is turned away.
#[derive(Debug)]
pub enum Rejection {
    /// POST without a usable session: 400 JSON-RPC body.
    NoValidSession,
    /// GET/DELETE without a usable session: 400 plain text.
    InvalidSessionId,
    /// Body is not JSON or not a JSON-RPC message.
    Malformed(MessageError),
    /// A listen stream is already attached.
    ListenerConflict,
    /// GET whose Accept header rules out `text/event-stream`.
    NotAcceptable,
    /// The session broke while handling the message and has been destroyed.
    Internal { id: Value, message: String },
}

impl Rejection {
    fn reason(&self) -> &'static str {
        match self {
            Rejection::NoValidSession => "no_valid_session",
            Rejection::InvalidSessionId => "invalid_session_id",
            Rejection::Malformed(_) => "malformed",
            Rejection::ListenerConflict => "listener_conflict",
            Rejection::NotAcceptable => "not_acceptable",
            Rejection::Internal { .. } => "internal",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        metrics::counter!("transport.rejections", "reason" => self.reason()).increment(1);

        match self {
            Rejection::NoValidSession => (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::SERVER_ERROR,
                    NO_VALID_SESSION,
                )),
            )
                .into_response(),
            Rejection::InvalidSessionId => {
                (StatusCode::BAD_REQUEST, INVALID_SESSION_TEXT).into_response()
            }
            Rejection::Malformed(e) => {
                (StatusCode::BAD_REQUEST, Json(e.to_response())).into_response()
            }
            Rejection::ListenerConflict => (
                StatusCode::CONFLICT,
                "Conflict: session already has an active listen stream",
            )
                .into_response(),
            Rejection::NotAcceptable => (
                StatusCode::NOT_ACCEPTABLE,
                "Not Acceptable: client must accept text/event-stream",
            )
                .into_response(),
            Rejection::Internal { id, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, message)),
            )
                .into_response(),
        }
    }
}

/// POST <endpoint>: deliver one JSON-RPC message to a session, creating the
/// session for an `initialize` request that carries no id.
async fn post_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Rejection> {
    let message = JsonRpcMessage::parse(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed message");
        Rejection::Malformed(e)
    })?;

    let (session, created) = match session_header(&headers) {
        None if message.is_initialize() => (state.sessions.create_session(), true),
        raw => {
            let session = state.sessions.resolve(raw).map_err(|e| {
                tracing::debug!(error = %e, method = ?message.method(), "POST without a valid session");
                Rejection::NoValidSession
            })?;
            (session, false)
        }
    };
    let session_id = session.id();

    let request_id = match &message {
        JsonRpcMessage::Request(r) => r.id.clone(),
        _ => Value::Null,
    };

    match session.handle(message).await {
        Ok(Some(reply)) => {
            if created && reply.is_error() {
                tracing::warn!(session_id = %session_id, "Initialize failed, discarding session");
                state.sessions.destroy_session(&session_id);
                return Ok(Json(reply).into_response());
            }

            let mut response = Json(reply).into_response();
            if created {
                let value = HeaderValue::from_str(&session_id.to_string()).map_err(|e| {
                    internal(
                        &state,
                        session_id,
                        request_id,
                        GeoMcpError::Transport(e.to_string()),
                        created,
                    )
                })?;
                response.headers_mut().insert(SESSION_HEADER, value);
            }
            Ok(response)
        }
        Ok(None) => Ok(StatusCode::ACCEPTED.into_response()),
        Err(e) if e.is_routing_error() => Err(Rejection::NoValidSession),
        Err(e) => Err(internal(&state, session_id, request_id, e, created)),
    }
}

/// GET <endpoint>: open the session's SSE listen stream.
async fn get_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, Rejection> {
    let session = state
        .sessions
        .resolve(session_header(&headers))
        .map_err(|_| Rejection::InvalidSessionId)?;

    if !accepts_event_stream(&headers) {
        return Err(Rejection::NotAcceptable);
    }

    let receiver = session.attach_listener().map_err(|e| match e {
        AttachError::AlreadyAttached => {
            tracing::warn!(session_id = %session.id(), "Second listen stream rejected");
            Rejection::ListenerConflict
        }
        AttachError::Closed => Rejection::InvalidSessionId,
    })?;

    tracing::info!(session_id = %session.id(), "Listen stream opened");

    let stream = ListenStream::new(receiver, Arc::clone(&state.sessions), session.id());
    let keep_alive = KeepAlive::new().interval(Duration::from_secs(state.transport.keep_alive_seconds));

    Ok(Sse::new(stream).keep_alive(keep_alive).into_response())
}

/// DELETE <endpoint>: terminate a session.
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, Rejection> {
    let session = state
        .sessions
        .resolve(session_header(&headers))
        .map_err(|_| Rejection::InvalidSessionId)?;

    state.sessions.destroy_session(&session.id());
    Ok(StatusCode::OK)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "sessions": state.sessions.len() })),
    )
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}

/// Report a JSON-RPC internal error. The session is destroyed when the
/// failure leaves it unusable, or when the client never learned its id.
fn internal(
    state: &AppState,
    session_id: geomcp_common::SessionId,
    id: Value,
    err: GeoMcpError,
    created: bool,
) -> Rejection {
    if created || err.is_fatal_to_session() {
        tracing::error!(session_id = %session_id, error = %err, "Session failure, destroying session");
        state.sessions.destroy_session(&session_id);
    } else {
        tracing::error!(session_id = %session_id, error = %err, "Request failed");
    }
    Rejection::Internal {
        id,
        message: err.to_string(),
    }
}

/// Session id from `mcp-session-id`, falling back to `session-id`.
/// A non-UTF-8 value yields `""`, which never resolves.
fn session_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .or_else(|| headers.get(LEGACY_SESSION_HEADER))
        .map(|v| v.to_str().unwrap_or(""))
}

/// A missing Accept header accepts anything.
fn accepts_event_stream(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT) else {
        return true;
    };
    let Ok(accept) = accept.to_str() else {
        return false;
    };
    accept.split(',').any(|part| {
        let media = part.split(';').next().unwrap_or("").trim();
        media.eq_ignore_ascii_case("text/event-stream")
            || media == "text/*"
            || media == "*/*"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_session_header_prefers_canonical_name() {
        let both = headers(&[(SESSION_HEADER, "a"), (LEGACY_SESSION_HEADER, "b")]);
        assert_eq!(session_header(&both), Some("a"));

        let legacy = headers(&[(LEGACY_SESSION_HEADER, "b")]);
        assert_eq!(session_header(&legacy), Some("b"));

        assert_eq!(session_header(&HeaderMap::new()), None);
    }

    #[test]
    fn test_accepts_event_stream() {
        assert!(accepts_event_stream(&HeaderMap::new()));
        assert!(accepts_event_stream(&headers(&[(
            "accept",
            "application/json, text/event-stream"
        )])));
        assert!(accepts_event_stream(&headers(&[("accept", "*/*")])));
        assert!(accepts_event_stream(&headers(&[(
            "accept",
            "text/event-stream;q=0.9"
        )])));
        assert!(!accepts_event_stream(&headers(&[("accept", "application/json")])));
    }

    fn state() -> AppState {
        AppState::new(
            TransportConfig::default(),
            Arc::new(crate::provider::mock::MockProvider::default()),
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle(),
        )
    }

    #[test]
    fn test_internal_destroys_only_broken_sessions() {
        let state = state();
        let session = state.sessions.create_session();
        let id = session.id();

        let rejection = internal(
            &state,
            id,
            json!(7),
            GeoMcpError::Internal("unexpected".into()),
            false,
        );
        assert!(matches!(rejection, Rejection::Internal { ref id, .. } if *id == json!(7)));
        assert!(state.sessions.get_session(&id).is_some());

        internal(
            &state,
            id,
            json!(8),
            GeoMcpError::Transport("listen stream closed".into()),
            false,
        );
        assert!(state.sessions.get_session(&id).is_none());
        assert!(session.is_closed());
    }

    #[test]
    fn test_internal_discards_fresh_session() {
        let state = state();
        let id = state.sessions.create_session().id();

        internal(&state, id, Value::Null, GeoMcpError::Internal("x".into()), true);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_no_valid_session_body_is_exact() {
        let body = serde_json::to_value(JsonRpcResponse::error(
            Value::Null,
            error_codes::SERVER_ERROR,
            NO_VALID_SESSION,
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "error": {"code": -32000, "message": "Bad Request: No valid session ID provided"},
                "id": null
            })
        );
    }
}
