mod harvest;

use super::ServerContext;
use hiretools_core::catalog::{find_tool, TOOLS};
use serde::{Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "hiretools".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result)
        .map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = TOOLS
        .iter()
        .map(|spec| Tool {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            input_schema: spec.input_schema(),
        })
        .collect();

    serde_json::to_value(ToolsList { tools })
        .map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    context: &ServerContext,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = params
        .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))
        .and_then(|p| {
            serde_json::from_value(p)
                .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))
        })?;

    let spec = find_tool(&params.name)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

    harvest::handle_tool(spec, params.arguments, context).await
}
