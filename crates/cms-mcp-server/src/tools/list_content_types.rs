//! MCP tool to list the content types in the schema.

use super::{discovery_error, json_result};
use crate::errors::McpError;
use crate::schema_from_type;
use cms_schema_discovery::service::ContentService;
use rmcp::model::{CallToolResult, Tool};
use rmcp::schemars::JsonSchema;
use rmcp::{schemars, serde_json};
use serde::Deserialize;
use std::sync::Arc;

/// The name of the tool to list content types.
pub const LIST_CONTENT_TYPES_TOOL_NAME: &str = "list_content_types";

#[derive(Clone)]
pub struct ListContentTypes {
    service: Arc<ContentService>,
    pub tool: Tool,
}

/// Input for the list content types tool.
#[derive(JsonSchema, Deserialize)]
pub struct Input {
    /// The interface the types implement. Defaults to `_IContent`.
    #[serde(default)]
    interface: Option<String>,
}

impl ListContentTypes {
    pub fn new(service: Arc<ContentService>) -> Self {
        Self {
            service,
            tool: Tool::new(
                LIST_CONTENT_TYPES_TOOL_NAME,
                "List the content types available in the CMS, optionally those implementing a given interface",
                schema_from_type!(Input),
            ),
        }
    }

    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        match self
            .service
            .list_content_types(input.interface.as_deref())
            .await
        {
            Ok(names) => json_result(&serde_json::json!({ "contentTypes": names })),
            Err(error) => discovery_error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cms_endpoint, content_service, result_text};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn lists_content_types() {
        let server = cms_endpoint().await;
        let tool = ListContentTypes::new(content_service(&server));

        let result = tool.execute(Input { interface: None }).await.unwrap();

        assert_eq!(result.is_error, None);
        let value: Value = serde_json::from_str(&result_text(&result)).unwrap();
        assert_eq!(value, json!({ "contentTypes": ["ArticlePage"] }));
    }

    #[tokio::test]
    async fn unknown_interfaces_have_no_types() {
        let server = cms_endpoint().await;
        let tool = ListContentTypes::new(content_service(&server));

        let result = tool
            .execute(Input {
                interface: Some("_IMissing".to_string()),
            })
            .await
            .unwrap();

        let value: Value = serde_json::from_str(&result_text(&result)).unwrap();
        assert_eq!(value, json!({ "contentTypes": [] }));
    }

    #[tokio::test]
    async fn unreachable_schemas_fail_the_request() {
        let server = wiremock::MockServer::start().await;
        let tool = ListContentTypes::new(content_service(&server));

        let error = tool.execute(Input { interface: None }).await.unwrap_err();

        assert_eq!(error.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
        assert!(error.message.contains("schema is unavailable"));
    }
}
