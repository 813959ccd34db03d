//! MCP tool to fetch a content item with every field its type exposes.

use super::{discovery_error, json_result};
use crate::errors::McpError;
use crate::schema_from_type;
use cms_schema_discovery::resolve::StrategyKind;
use cms_schema_discovery::service::{ContentService, EnrichOptions};
use rmcp::model::{CallToolResult, Tool};
use rmcp::schemars::JsonSchema;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

/// The name of the tool to get content.
pub const GET_CONTENT_TOOL_NAME: &str = "get_content";

#[derive(Clone)]
pub struct GetContent {
    service: Arc<ContentService>,
    pub tool: Tool,
}

/// How to look the identifier up
#[derive(Debug, Clone, Copy, JsonSchema, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Treat the identifier as search text
    Search,
    /// Treat the identifier as a URL path
    Path,
    /// Treat the identifier as a content key
    Key,
}

impl From<Strategy> for StrategyKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Search => StrategyKind::Search,
            Strategy::Path => StrategyKind::Path,
            Strategy::Key => StrategyKind::Key,
        }
    }
}

/// Input for the get content tool.
#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// A content key, a URL path such as `/news/`, or text naming the content
    identifier: String,
    /// The locale to fetch, such as `en`
    #[serde(default)]
    locale: Option<String>,
    /// Try this lookup first instead of guessing from the identifier
    #[serde(default)]
    strategy: Option<Strategy>,
    /// The content type to assume when the item does not report one
    #[serde(default)]
    content_type: Option<String>,
    /// The maximum number of fields to select
    #[serde(default)]
    max_fields: Option<usize>,
}

impl GetContent {
    pub fn new(service: Arc<ContentService>) -> Self {
        Self {
            service,
            tool: Tool::new(
                GET_CONTENT_TOOL_NAME,
                "Get a CMS content item by key, URL path or name. The item is returned with the fields its content type exposes, including rich text and visual builder compositions",
                schema_from_type!(Input),
            ),
        }
    }

    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        let options = EnrichOptions {
            strategy: input.strategy.map(StrategyKind::from),
            content_type: input.content_type,
            max_fields: input.max_fields,
        };
        match self
            .service
            .resolve_and_enrich(&input.identifier, input.locale.as_deref(), &options)
            .await
        {
            Ok(content) => json_result(&content),
            Err(error) => discovery_error(error),
        }
    }
}
