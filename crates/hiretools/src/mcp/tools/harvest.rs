use super::{CallToolResult, Content, JsonRpcError, ServerContext};
use crate::error::Error;
use hiretools_core::catalog::{arguments_object, ToolArgError, ToolSpec};
use hiretools_core::envelope::{Envelope, HttpMethod};

impl From<ToolArgError> for JsonRpcError {
    fn from(e: ToolArgError) -> Self {
        JsonRpcError::invalid_params(format!("Invalid arguments: {e}"))
    }
}

/// Run one catalog tool against the recruiting API
pub async fn handle_tool(
    spec: &ToolSpec,
    arguments: Option<serde_json::Value>,
    context: &ServerContext,
) -> Result<serde_json::Value, JsonRpcError> {
    let args = arguments_object(arguments)?;
    let path = spec.render_path(&args)?;

    if context.global.verbose {
        crate::prelude::eprintln!("Calling {} {} for tool {}", spec.method.as_str(), path, spec.name);
    }

    let result = match spec.method {
        HttpMethod::Get => {
            let request = spec.page_request(&args)?;
            context.client.fetch(&path, &request).await
        }
        HttpMethod::Post => {
            let body = spec.body(&args)?;
            context.client.post(&path, Some(&body)).await
        }
    };

    let envelope = result.map_err(tool_error)?;

    envelope_result(&envelope)
}

fn tool_error(e: Error) -> JsonRpcError {
    log::warn!("Tool call failed: {e}");
    match e {
        Error::InvalidRequest(e) => JsonRpcError::invalid_params(format!("Invalid arguments: {e}")),
        e => JsonRpcError::internal(format!("Tool execution error: {e}")),
    }
}

fn envelope_result(envelope: &Envelope) -> Result<serde_json::Value, JsonRpcError> {
    let text = serde_json::to_string_pretty(envelope)
        .map_err(|e| JsonRpcError::internal(format!("Failed to serialize result: {e}")))?;

    let result = CallToolResult {
        content: vec![Content::Text { text }],
        is_error: None,
    };

    serde_json::to_value(result)
        .map_err(|e| JsonRpcError::internal(format!("Failed to serialize result: {e}")))
}
