use std::borrow::Cow;

use infranodus_core::{NodusResult, ToolName, ToolOutput};
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use serde_json::json;
use tracing::{debug, warn};

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// `isError` result with a `{"error": ...}` body.
pub fn error_result(message: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(json!({ "error": message }).to_string())])
}

/// Converts a tool outcome into MCP content; failures never escape as protocol errors.
pub fn tool_result(tool: ToolName, outcome: NodusResult<ToolOutput>) -> CallToolResult {
    let rendered = outcome.and_then(|output| output.to_pretty_json());
    match rendered {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(err) if err.is_validation() => {
            debug!(%tool, error = %err, "tool input rejected");
            error_result(&err.to_string())
        }
        Err(err) => {
            warn!(%tool, error = %err, "tool call failed");
            error_result(&err.to_string())
        }
    }
}
