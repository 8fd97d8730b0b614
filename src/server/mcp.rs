use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ToolError;
use crate::gateway::ApiClient;
use crate::tools::{tool_definitions, ToolDefinition, ToolResponse, ToolSet};

pub const PROTOCOL_VERSION: &str = "2025-06-18";
pub const SERVER_NAME: &str = "snapshotter-mcp-server";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 Request format. A request without `id` is a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 Response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        JsonRpcError {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Parse one JSON-RPC message. On failure, returns the error response to send back.
pub fn parse_request(text: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        JsonRpcResponse::failure(
            Value::Null,
            JsonRpcError::new(PARSE_ERROR, "Parse error").with_data(json!(e.to_string())),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::failure(
            id.clone(),
            JsonRpcError::new(INVALID_REQUEST, "Invalid Request").with_data(json!(e.to_string())),
        )
    })?;

    if request.jsonrpc != "2.0" {
        return Err(JsonRpcResponse::failure(
            id,
            JsonRpcError::new(INVALID_REQUEST, "Invalid Request: jsonrpc must be \"2.0\""),
        ));
    }

    Ok(request)
}

/// MCP server for the Snapshotter Core API tools
pub struct McpServer {
    tools: ToolSet,
    definitions: Vec<ToolDefinition>,
}

impl McpServer {
    /// Build the shared API client once; every tool call reuses it.
    pub fn new(config: &Config) -> crate::error::Result<Self> {
        info!(
            "Initializing MCP server with Snapshotter API: {}",
            config.api_base_url
        );
        Ok(Self::from_client(ApiClient::new(config)?))
    }

    pub fn from_client(client: ApiClient) -> Self {
        McpServer {
            tools: ToolSet::new(client),
            definitions: tool_definitions(),
        }
    }

    pub fn tool_definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Parse and handle one raw message. `None` means nothing should be sent back.
    pub async fn handle_message(&self, text: &str) -> Option<JsonRpcResponse> {
        match parse_request(text) {
            Ok(request) => self.handle_request(request).await,
            Err(response) => {
                warn!("Rejected JSON-RPC message: {:?}", response.error);
                Some(response)
            }
        }
    }

    /// Handle a JSON-RPC request. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(
            "Handling MCP request: {} with params: {}",
            request.method, request.params
        );

        let Some(id) = request.id else {
            debug!("Notification: {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize(&request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tool_call(&request.params).await,
            _ => Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        Some(match response {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::failure(id, err),
        })
    }

    fn handle_initialize(&self, params: &Value) -> Value {
        let requested = params
            .get("protocolVersion")
            .and_then(|v| v.as_str())
            .unwrap_or(PROTOCOL_VERSION);
        info!("Client initialized with protocol version {}", requested);

        json!({
            "protocolVersion": requested,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        let tools = serde_json::to_value(&self.definitions)
            .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, format!("Internal error: {}", e)))?;
        Ok(json!({ "tools": tools }))
    }

    async fn handle_tool_call(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Missing or invalid 'name' parameter"))?;

        let arguments = params.get("arguments").unwrap_or(&Value::Null);

        let response = match self.tools.call(tool_name, arguments).await {
            Ok(data) => ToolResponse::success(data),
            Err(ToolError::UnknownTool(name)) => {
                return Err(JsonRpcError::new(
                    INVALID_PARAMS,
                    format!("Unknown tool: {}", name),
                ));
            }
            Err(e) => {
                if e.is_validation() {
                    debug!("Tool {} rejected arguments: {}", tool_name, e);
                } else {
                    warn!("Tool {} failed: {}", tool_name, e);
                }
                ToolResponse::error(&e)
            }
        };

        serde_json::to_value(&response)
            .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, format!("Internal error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        McpServer::new(&Config::from_url("http://127.0.0.1:1".to_string())).unwrap()
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(json!(1)),
        }
    }

    #[test]
    fn test_jsonrpc_request_serialization() {
        let json_str = serde_json::to_string(&request("tools/call", json!({}))).unwrap();
        assert!(json_str.contains("tools/call"));
        assert!(json_str.contains("2.0"));
    }

    #[test]
    fn test_parse_request_errors() {
        let err = parse_request("{not json").unwrap_err();
        assert_eq!(err.error.unwrap().code, PARSE_ERROR);
        assert_eq!(err.id, Value::Null);

        let err = parse_request(r#"{"jsonrpc": "2.0", "id": 7}"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);
        assert_eq!(err.id, json!(7));

        let err = parse_request(r#"{"jsonrpc": "1.0", "method": "ping", "id": 7}"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);

        let ok = parse_request(r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#)
            .unwrap();
        assert!(ok.is_notification());
        assert_eq!(ok.params, Value::Null);
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = server()
            .handle_request(request(
                "initialize",
                json!({"protocolVersion": "2025-03-26", "capabilities": {}}),
            ))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let mut notification = request("notifications/initialized", Value::Null);
        notification.id = None;
        assert!(server().handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = server()
            .handle_request(request("tools/list", Value::Null))
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].clone();
        assert_eq!(tools.as_array().unwrap().len(), 21);
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_method_and_tool() {
        let response = server()
            .handle_request(request("resources/list", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);

        let response = server()
            .handle_request(request("tools/call", json!({"name": "swap_tokens"})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);

        let response = server()
            .handle_request(request("tools/call", json!({})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_validation_failure_is_tool_error() {
        let response = server()
            .handle_request(request(
                "tools/call",
                json!({"name": "get_pool_metadata", "arguments": {}}),
            ))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        assert_eq!(
            result["structuredContent"]["error"]["kind"],
            "MissingParameter"
        );
        assert_eq!(
            result["content"][0]["text"],
            "MissingParameter: Missing required parameter: pool_address"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_retryable_tool_error() {
        let response = server()
            .handle_request(request("tools/call", json!({"name": "health_check"})))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["structuredContent"]["error"]["kind"], "TransportError");
        assert_eq!(result["structuredContent"]["error"]["retryable"], json!(true));
    }
}
