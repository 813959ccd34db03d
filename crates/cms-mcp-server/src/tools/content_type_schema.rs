//! MCP tool to describe the fields of a content type.

use super::{discovery_error, json_result};
use crate::errors::McpError;
use crate::schema_from_type;
use cms_schema_discovery::service::ContentService;
use rmcp::model::{CallToolResult, Tool};
use rmcp::schemars::JsonSchema;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

/// The name of the tool to get a content type's schema.
pub const CONTENT_TYPE_SCHEMA_TOOL_NAME: &str = "get_content_type_schema";

#[derive(Clone)]
pub struct GetContentTypeSchema {
    service: Arc<ContentService>,
    pub tool: Tool,
}

/// Input for the content type schema tool.
#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// The name of the content type, as returned by `list_content_types`
    type_name: String,
}

impl GetContentTypeSchema {
    pub fn new(service: Arc<ContentService>) -> Self {
        Self {
            service,
            tool: Tool::new(
                CONTENT_TYPE_SCHEMA_TOOL_NAME,
                "Get the fields, their types and the interfaces of a CMS content type",
                schema_from_type!(Input),
            ),
        }
    }

    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        match self.service.get_content_type_schema(&input.type_name).await {
            Ok(schema) => json_result(&schema),
            Err(error) => discovery_error(error),
        }
    }
}
