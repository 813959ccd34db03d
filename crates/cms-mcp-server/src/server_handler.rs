use crate::errors::McpError;
use crate::tools::content_type_schema::{CONTENT_TYPE_SCHEMA_TOOL_NAME, GetContentTypeSchema};
use crate::tools::get_content::{GET_CONTENT_TOOL_NAME, GetContent};
use crate::tools::list_content_types::{LIST_CONTENT_TYPES_TOOL_NAME, ListContentTypes};
use crate::tools::search::{SEARCH_TOOL_NAME, SearchContent};
use cms_schema_discovery::service::ContentService;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ErrorCode, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::serde_json::{self, Value};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use std::sync::Arc;
use tracing::debug;

const INSTRUCTIONS: &str = "Tools for reading content from a headless CMS. Use list_content_types and \
get_content_type_schema to explore the content model, search_content to find items, and get_content \
to fetch an item with all of its fields.";

#[derive(Clone)]
pub struct CmsMcpServerHandler {
    get_content: GetContent,
    content_type_schema: GetContentTypeSchema,
    search: SearchContent,
    list_content_types: ListContentTypes,
}

impl CmsMcpServerHandler {
    pub fn new(service: Arc<ContentService>) -> Self {
        Self {
            get_content: GetContent::new(service.clone()),
            content_type_schema: GetContentTypeSchema::new(service.clone()),
            search: SearchContent::new(service.clone()),
            list_content_types: ListContentTypes::new(service),
        }
    }

    fn tools(&self) -> Vec<Tool> {
        vec![
            self.get_content.tool.clone(),
            self.search.tool.clone(),
            self.list_content_types.tool.clone(),
            self.content_type_schema.tool.clone(),
        ]
    }

    async fn call(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        let name = request.name.clone();
        debug!(tool = %name, "Calling tool");
        match &*name {
            GET_CONTENT_TOOL_NAME => {
                self.get_content
                    .execute(convert_arguments(request)?)
                    .await
            }
            SEARCH_TOOL_NAME => self.search.execute(convert_arguments(request)?).await,
            LIST_CONTENT_TYPES_TOOL_NAME => {
                self.list_content_types
                    .execute(convert_arguments(request)?)
                    .await
            }
            CONTENT_TYPE_SCHEMA_TOOL_NAME => {
                self.content_type_schema
                    .execute(convert_arguments(request)?)
                    .await
            }
            name => Err(tool_not_found(name)),
        }
    }
}

impl ServerHandler for CmsMcpServerHandler {
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(request).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: self.tools(),
        })
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "CMS MCP Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}

fn tool_not_found(name: &str) -> McpError {
    McpError::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("Tool {name} not found"),
        None,
    )
}

fn convert_arguments<T: serde::de::DeserializeOwned>(
    arguments: CallToolRequestParam,
) -> Result<T, McpError> {
    serde_json::from_value(Value::from(arguments.arguments))
        .map_err(|_| McpError::new(ErrorCode::INVALID_PARAMS, "Invalid input".to_string(), None))
}
