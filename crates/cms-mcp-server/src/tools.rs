//! MCP tools backed by the content service

use crate::errors::McpError;
use cms_schema_discovery::error::DiscoveryError;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use rmcp::serde_json;
use serde::Serialize;

pub mod content_type_schema;
pub mod get_content;
pub mod list_content_types;
pub mod search;

/// A successful result holding a JSON value
fn json_result(value: &impl Serialize) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_value(value).map_err(|e| {
        McpError::new(
            ErrorCode::INTERNAL_ERROR,
            format!("Failed to serialize result: {e}"),
            None,
        )
    })?;
    Ok(CallToolResult {
        content: vec![Content::json(&json).unwrap_or(Content::text(json.to_string()))],
        is_error: None,
    })
}

/// Report a lookup that matched nothing as a tool error and anything else as a failed request
fn discovery_error(error: DiscoveryError) -> Result<CallToolResult, McpError> {
    if error.is_not_found() {
        Ok(CallToolResult {
            content: vec![Content::text(error.to_string())],
            is_error: Some(true),
        })
    } else {
        Err(McpError::new(
            ErrorCode::INTERNAL_ERROR,
            error.to_string(),
            None,
        ))
    }
}
