//! MCP tool to run a full-text search over content.

use super::{discovery_error, json_result};
use crate::errors::McpError;
use crate::schema_from_type;
use cms_schema_discovery::service::ContentService;
use cms_schema_discovery::synthesize::SearchParams;
use rmcp::model::{CallToolResult, Tool};
use rmcp::schemars::JsonSchema;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;

/// The name of the tool to search content.
pub const SEARCH_TOOL_NAME: &str = "search_content";

#[derive(Clone)]
pub struct SearchContent {
    service: Arc<ContentService>,
    pub tool: Tool,
}

/// Input for the search tool.
#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// The text to search for
    query: String,
    /// Only return content of these types
    #[serde(default)]
    content_types: Vec<String>,
    /// The maximum number of results. Defaults to 10.
    #[serde(default)]
    limit: Option<usize>,
    /// The number of results to skip
    #[serde(default)]
    skip: Option<usize>,
    /// The locale to search, such as `en`
    #[serde(default)]
    locale: Option<String>,
    /// Order by relevance and include each result's score
    #[serde(default)]
    include_score: bool,
}

impl From<Input> for SearchParams {
    fn from(input: Input) -> Self {
        let defaults = SearchParams::new(input.query);
        SearchParams {
            content_types: input.content_types,
            limit: input.limit.unwrap_or(defaults.limit),
            skip: input.skip.unwrap_or(defaults.skip),
            locale: input.locale,
            include_score: input.include_score,
            ..defaults
        }
    }
}

impl SearchContent {
    pub fn new(service: Arc<ContentService>) -> Self {
        Self {
            service,
            tool: Tool::new(
                SEARCH_TOOL_NAME,
                "Search CMS content by text. Returns the total, matching items with their metadata, and facets by content type and locale",
                schema_from_type!(Input),
            ),
        }
    }

    pub async fn execute(&self, input: Input) -> Result<CallToolResult, McpError> {
        match self.service.search(&input.into()).await {
            Ok(result) => json_result(&result),
            Err(error) => discovery_error(error),
        }
    }
}
