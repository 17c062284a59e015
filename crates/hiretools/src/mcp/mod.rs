mod cli;
mod sse;
mod stdio;
mod tools;

pub use cli::App;

use crate::harvest::HarvestClient;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// State shared by every request the server handles
///
/// The client (and the token cache inside it) is built once at startup.
#[derive(Debug)]
pub struct ServerContext {
    pub global: crate::Global,
    pub client: HarvestClient,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    // Missing credentials stop the server before it accepts any request
    let client = crate::harvest::create_client(&global)?;
    let context = Arc::new(ServerContext { global, client });

    match app.command {
        cli::Commands::Stdio => stdio::run_stdio(context).await,
        cli::Commands::Sse(options) => sse::run_sse(options, context).await,
    }
}

/// Handle one JSON-RPC message; notifications produce no response
pub async fn handle_request(request_str: &str, context: &ServerContext) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return Some(JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError {
                    code: -32700,
                    message: format!("Parse error: {e}"),
                    data: None,
                }),
            });
        }
    };

    if request.id.is_none() && request.method.starts_with("notifications/") {
        log::debug!("Received notification {}", request.method);
        return None;
    }

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, context).await,
        method => Err(JsonRpcError {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }),
    };

    let response = match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    };

    Some(response)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::harvest::HarvestConfig;
    use hiretools_core::auth::Credentials;
    use hiretools_core::catalog::TOOLS;
    use serde_json::json;

    pub(crate) fn test_global() -> crate::Global {
        crate::Global {
            client_id: None,
            client_secret: None,
            base_url: None,
            token_url: None,
            verbose: false,
        }
    }

    pub(crate) fn test_context(server_uri: &str) -> ServerContext {
        let config = HarvestConfig {
            credentials: Credentials::new("id", "secret"),
            api_base_url: format!("{server_uri}/v3"),
            token_url: format!("{server_uri}/token"),
        };
        ServerContext {
            global: test_global(),
            client: HarvestClient::new(&config).unwrap(),
        }
    }

    async fn call(request: serde_json::Value) -> serde_json::Value {
        let context = test_context("http://127.0.0.1:1");
        let response = handle_request(&request.to_string(), &context).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = call(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).await;
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "hiretools");
        assert!(response["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_covers_catalog() {
        let response = call(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), TOOLS.len());
        assert!(tools.iter().all(|tool| tool["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = call(json!({"jsonrpc": "2.0", "id": 3, "method": "prompts/list"})).await;
        assert_eq!(response["error"]["code"], -32601);
        assert!(response.get("result").is_none());
    }

    #[tokio::test]
    async fn test_parse_error() {
        let context = test_context("http://127.0.0.1:1");
        let response = handle_request("{not json", &context).await.unwrap();
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let context = test_context("http://127.0.0.1:1");
        let request = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(handle_request(&request.to_string(), &context).await.is_none());
    }
}
