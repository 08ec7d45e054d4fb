use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use geomcp_common::{GeoMcpError, SessionId};

use super::{
    error_codes, negotiate_version, InitializeParams, InitializeResult, JsonRpcMessage,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ProgressParams, ToolCallParams,
    ToolCallResult, ToolsListResult,
};
use crate::session::SessionChannel;
use crate::tools::ToolRegistry;

/// Per-session JSON-RPC interpreter.
///
/// `Ok(None)` means the message needs no reply (notifications and client
/// responses). `Err` is reserved for channel failures that must tear the
/// session down; every protocol-level problem is a JSON-RPC error reply.
pub struct ProtocolEngine {
    session_id: SessionId,
    tools: Arc<ToolRegistry>,
    protocol_version: OnceLock<&'static str>,
}

impl ProtocolEngine {
    pub fn new(session_id: SessionId, tools: Arc<ToolRegistry>) -> Self {
        Self {
            session_id,
            tools,
            protocol_version: OnceLock::new(),
        }
    }

    /// Negotiated revision, once `initialize` has succeeded.
    pub fn protocol_version(&self) -> Option<&'static str> {
        self.protocol_version.get().copied()
    }

    pub async fn handle(
        &self,
        message: JsonRpcMessage,
        channel: &SessionChannel,
    ) -> Result<Option<JsonRpcResponse>, GeoMcpError> {
        match message {
            JsonRpcMessage::Request(request) => self.handle_request(request, channel).await.map(Some),
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(&notification);
                Ok(None)
            }
            JsonRpcMessage::Response(_) => {
                tracing::debug!(session_id = %self.session_id, "Ignoring client response");
                Ok(None)
            }
        }
    }

    async fn handle_request(
        &self,
        request: JsonRpcRequest,
        channel: &SessionChannel,
    ) -> Result<JsonRpcResponse, GeoMcpError> {
        tracing::debug!(session_id = %self.session_id, method = %request.method, "Request");

        let JsonRpcRequest { id, method, params } = request;
        match method.as_str() {
            "initialize" => self.initialize(id, params),
            "ping" => Ok(JsonRpcResponse::success(id, json!({}))),
            "tools/list" => success(
                id,
                ToolsListResult {
                    tools: self.tools.definitions(),
                },
            ),
            "tools/call" => self.call_tool(id, params, channel).await,
            other => Ok(JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }

    fn initialize(&self, id: Value, params: Option<Value>) -> Result<JsonRpcResponse, GeoMcpError> {
        let params: InitializeParams = match parse_params(params) {
            Ok(p) => p,
            Err(msg) => return Ok(JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, msg)),
        };

        let version = negotiate_version(params.protocol_version.as_deref());
        if self.protocol_version.set(version).is_err() {
            return Ok(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                "Session is already initialized",
            ));
        }

        tracing::info!(
            session_id = %self.session_id,
            protocol_version = version,
            requested = ?params.protocol_version,
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            "Session initialized"
        );

        success(id, InitializeResult::new(version))
    }

    async fn call_tool(
        &self,
        id: Value,
        params: Option<Value>,
        channel: &SessionChannel,
    ) -> Result<JsonRpcResponse, GeoMcpError> {
        let params: ToolCallParams = match parse_params(params) {
            Ok(p) => p,
            Err(msg) => return Ok(JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, msg)),
        };

        let Some(kind) = self.tools.resolve(&params.name) else {
            tracing::warn!(session_id = %self.session_id, tool = %params.name, "Unknown tool called");
            return Ok(JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Unknown tool: {}", params.name),
            ));
        };

        let progress_token = params.meta.and_then(|m| m.progress_token);

        if let Some(token) = &progress_token {
            self.notify_progress(channel, token, 0.0).await?;
        }

        let result = self
            .tools
            .execute(kind, params.arguments.unwrap_or(Value::Null))
            .await;

        if let Some(token) = &progress_token {
            self.notify_progress(channel, token, 1.0).await?;
        }

        success(id, ToolCallResult::from(result))
    }

    fn handle_notification(&self, notification: &JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => {
                tracing::debug!(session_id = %self.session_id, "Client finished initialization");
            }
            "notifications/cancelled" => {
                tracing::debug!(
                    session_id = %self.session_id,
                    params = ?notification.params,
                    "Client cancelled a request"
                );
            }
            other => {
                tracing::debug!(session_id = %self.session_id, method = other, "Ignoring notification");
            }
        }
    }

    /// Push a progress event if a listener is attached.
    async fn notify_progress(
        &self,
        channel: &SessionChannel,
        token: &Value,
        progress: f64,
    ) -> Result<(), GeoMcpError> {
        let params = serde_json::to_value(ProgressParams {
            progress_token: token.clone(),
            progress,
            total: 1.0,
        })?;
        let notification = JsonRpcNotification::new("notifications/progress", params);

        if !channel.push(notification.to_value()).await? {
            tracing::debug!(session_id = %self.session_id, "No listener for progress notification");
        }
        Ok(())
    }
}

/// Absent params parse as `{}` so required fields are reported by name.
fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    let params = params.unwrap_or_else(|| json!({}));
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

fn success<T: Serialize>(id: Value, result: T) -> Result<JsonRpcResponse, GeoMcpError> {
    Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
}
