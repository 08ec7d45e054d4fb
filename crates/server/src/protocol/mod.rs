//! MCP message structures over JSON-RPC 2.0.

mod engine;

pub use engine::ProtocolEngine;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::tools::{ToolDefinition, ToolExecutionResult};

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revisions this server speaks, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

pub const SERVER_NAME: &str = "geomcp";

const SERVER_INSTRUCTIONS: &str = "Geolocation tools backed by Google Maps Platform. \
Use geocode to turn an address into coordinates, the places_* tools to search for and \
inspect places, and directions to compute routes between two addresses.";

pub mod error_codes {
    /// Invalid JSON was received by the server.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Transport-level rejection (missing or unknown session).
    pub const SERVER_ERROR: i32 = -32000;
}

// ---------------------------------------------------------------------------
// JSON-RPC envelope
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct JsonRpcRequest {
    pub id: Value,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JsonRpcNotification {
    pub method: String,
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
        }
    }

    /// Wire form, as pushed on a listen stream.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("jsonrpc".into(), json!(JSONRPC_VERSION));
        obj.insert("method".into(), json!(self.method));
        if let Some(params) = &self.params {
            obj.insert("params".into(), params.clone());
        }
        Value::Object(obj)
    }
}

/// One inbound message, classified.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// A reply from the client to a server-initiated request.
    Response(Value),
}

/// Why an inbound body could not be classified.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid Request: {0}")]
    Invalid(String),
}

impl MessageError {
    pub fn code(&self) -> i32 {
        match self {
            MessageError::Parse(_) => error_codes::PARSE_ERROR,
            MessageError::Invalid(_) => error_codes::INVALID_REQUEST,
        }
    }

    pub fn to_response(&self) -> JsonRpcResponse {
        JsonRpcResponse::error(Value::Null, self.code(), self.to_string())
    }
}

impl JsonRpcMessage {
    pub fn parse(body: &[u8]) -> Result<Self, MessageError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| MessageError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        let obj = match value {
            Value::Object(obj) => obj,
            Value::Array(_) => {
                return Err(MessageError::Invalid("batch requests are not supported".into()))
            }
            _ => return Err(MessageError::Invalid("expected a JSON object".into())),
        };

        if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err(MessageError::Invalid("jsonrpc must be \"2.0\"".into()));
        }

        let method = match obj.get("method") {
            Some(Value::String(method)) => method.clone(),
            Some(_) => return Err(MessageError::Invalid("method must be a string".into())),
            None if obj.contains_key("result") || obj.contains_key("error") => {
                return Ok(JsonRpcMessage::Response(Value::Object(obj)));
            }
            None => return Err(MessageError::Invalid("missing method".into())),
        };

        let params = match obj.get("params") {
            None | Some(Value::Null) => None,
            Some(p @ (Value::Object(_) | Value::Array(_))) => Some(p.clone()),
            Some(_) => {
                return Err(MessageError::Invalid(
                    "params must be an object or array".into(),
                ))
            }
        };

        match obj.get("id") {
            None => Ok(JsonRpcMessage::Notification(JsonRpcNotification { method, params })),
            Some(id @ (Value::String(_) | Value::Number(_))) => {
                Ok(JsonRpcMessage::Request(JsonRpcRequest {
                    id: id.clone(),
                    method,
                    params,
                }))
            }
            Some(_) => Err(MessageError::Invalid(
                "id must be a string or number".into(),
            )),
        }
    }

    /// Whether this is an `initialize` request (the only message that may
    /// arrive without a session id).
    pub fn is_initialize(&self) -> bool {
        matches!(self, JsonRpcMessage::Request(r) if r.method == "initialize")
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(r) => Some(&r.method),
            JsonRpcMessage::Notification(n) => Some(&n.method),
            JsonRpcMessage::Response(_) => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Clone, Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ---------------------------------------------------------------------------
// MCP payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: &'static str,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
    pub instructions: &'static str,
}

impl InitializeResult {
    pub fn new(protocol_version: &'static str) -> Self {
        Self {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: env!("CARGO_PKG_VERSION"),
            },
            instructions: SERVER_INSTRUCTIONS,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Echo the client's revision when supported, otherwise offer the latest.
pub fn negotiate_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

#[derive(Debug, Serialize)]
pub struct ToolsListResult<'a> {
    pub tools: &'a [ToolDefinition],
}

#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(rename = "_meta", default)]
    pub meta: Option<RequestMeta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMeta {
    #[serde(default)]
    pub progress_token: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    pub is_error: bool,
}

#[derive(Debug, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub text: String,
}

impl From<ToolExecutionResult> for ToolCallResult {
    fn from(r: ToolExecutionResult) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text",
                text: r.content,
            }],
            structured_content: r.structured,
            is_error: r.is_error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressParams {
    pub progress_token: Value,
    pub progress: f64,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(body: &str) -> Result<JsonRpcMessage, MessageError> {
        JsonRpcMessage::parse(body.as_bytes())
    }

    #[test]
    fn test_classify_request_notification_response() {
        match classify(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap() {
            JsonRpcMessage::Request(r) => {
                assert_eq!(r.id, json!(1));
                assert_eq!(r.method, "ping");
                assert!(r.params.is_none());
            }
            other => panic!("Expected Request, got {other:?}"),
        }

        assert!(matches!(
            classify(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap(),
            JsonRpcMessage::Notification(_)
        ));

        assert!(matches!(
            classify(r#"{"jsonrpc":"2.0","id":"s-1","result":{}}"#).unwrap(),
            JsonRpcMessage::Response(_)
        ));
    }

    #[test]
    fn test_parse_error_vs_invalid_request() {
        let err = classify("{not json").unwrap_err();
        assert_eq!(err.code(), error_codes::PARSE_ERROR);

        for body in [
            r#"{"id":1,"method":"ping"}"#,
            r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#,
            r#"{"jsonrpc":"2.0","id":1}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":7}"#,
            r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":"ping","params":"x"}"#,
            r#"[{"jsonrpc":"2.0","id":1,"method":"ping"}]"#,
            r#""hello""#,
        ] {
            let err = classify(body).unwrap_err();
            assert_eq!(err.code(), error_codes::INVALID_REQUEST, "{body}");
        }
    }

    #[test]
    fn test_is_initialize() {
        let init = classify(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#).unwrap();
        assert!(init.is_initialize());

        let note = classify(r#"{"jsonrpc":"2.0","method":"initialize"}"#).unwrap();
        assert!(!note.is_initialize());
    }

    #[test]
    fn test_negotiate_version() {
        assert_eq!(negotiate_version(Some("2024-11-05")), "2024-11-05");
        assert_eq!(negotiate_version(Some("2099-01-01")), "2025-06-18");
        assert_eq!(negotiate_version(None), "2025-06-18");
    }

    #[test]
    fn test_error_response_shape() {
        let resp = JsonRpcResponse::error(Value::Null, error_codes::SERVER_ERROR, "nope");
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"jsonrpc":"2.0","id":null,"error":{"code":-32000,"message":"nope"}})
        );
    }

    #[test]
    fn test_tool_call_result_camel_case() {
        let result = ToolCallResult::from(ToolExecutionResult {
            content: "{}".into(),
            structured: Some(json!({})),
            is_error: false,
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["structuredContent"], json!({}));
        assert_eq!(value["isError"], false);
    }

    #[test]
    fn test_tool_call_params_meta() {
        let params: ToolCallParams = serde_json::from_value(json!({
            "name": "geocode",
            "arguments": {"address": "x"},
            "_meta": {"progressToken": "tok-1"}
        }))
        .unwrap();
        assert_eq!(params.meta.unwrap().progress_token, Some(json!("tok-1")));
    }
}
