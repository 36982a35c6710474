//! MCP server exposing the extraction tool over stdio.

use rmcp::RoleServer;
use rmcp::service::RequestContext;
use rmcp::{
    ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Content, ErrorData, JsonObject, ListToolsResult,
        PaginatedRequestParams, Tool as McpTool,
    },
};
use scrapezy_core::domain::{Credential, ExtractionRequest};
use serde::Deserialize;
use serde_json::{Value, json};
use std::borrow::Cow;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::extraction::{JobPoller, presenter};

pub const SERVER_NAME: &str = "scrapezy-mcp-server";
pub const EXTRACT_TOOL_NAME: &str = "extract-structured-data";

/// Arguments of the extraction tool
#[derive(Debug, Deserialize)]
struct ExtractArgs {
    url: String,
    prompt: String,
}

/// MCP handler serving the structured-data extraction tool
pub struct ScrapezyMcpHandler {
    poller: Arc<JobPoller>,
    credential: Credential,
    tool_definitions: Vec<McpTool>,
}

impl ScrapezyMcpHandler {
    /// Creates a handler; the credential has already been resolved at startup
    pub fn new(poller: Arc<JobPoller>, credential: Credential) -> Self {
        Self {
            poller,
            credential,
            tool_definitions: vec![extract_tool()],
        }
    }

    /// Serves the MCP protocol over stdio until the client disconnects.
    ///
    /// # Errors
    /// Returns an error if the server fails to initialize or if the connection is lost.
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let (stdin, stdout) = rmcp::transport::io::stdio();
        let service = rmcp::ServiceExt::serve(self, (stdin, stdout)).await?;
        let reason = service.waiting().await?;
        tracing::info!("MCP session ended: {:?}", reason);
        Ok(())
    }

    /// Routes a tool call by name
    async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        cancel: &CancellationToken,
    ) -> Result<CallToolResult, ErrorData> {
        match name {
            EXTRACT_TOOL_NAME => self.handle_extract(arguments, cancel).await,
            other => {
                tracing::warn!(tool_name = %other, "Unknown tool requested");
                Err(ErrorData::invalid_params(format!("unknown tool: {}", other), None))
            }
        }
    }

    /// Runs the extraction tool for one call
    ///
    /// Argument problems are protocol errors; extraction failures are
    /// reported as tool results with the error flag set.
    async fn handle_extract(
        &self,
        arguments: Option<JsonObject>,
        cancel: &CancellationToken,
    ) -> Result<CallToolResult, ErrorData> {
        let args: ExtractArgs = serde_json::from_value(Value::Object(arguments.unwrap_or_default()))
            .map_err(|e| ErrorData::invalid_params(format!("invalid arguments: {}", e), None))?;

        let req = ExtractionRequest::new(args.url, args.prompt)
            .map_err(|e| ErrorData::invalid_params(e.to_string(), None))?;

        let outcome = self.poller.run(&req, &self.credential, cancel).await;
        let text = presenter::render(req.url(), &outcome);

        if outcome.is_success() {
            Ok(CallToolResult::success(vec![Content::text(text)]))
        } else {
            Ok(CallToolResult::error(vec![Content::text(text)]))
        }
    }
}

/// Definition of the extraction tool as advertised to clients
fn extract_tool() -> McpTool {
    let schema = json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "format": "uri",
                "description": "URL of the website to extract data from"
            },
            "prompt": {
                "type": "string",
                "description": "Prompt to extract data from the website"
            }
        },
        "required": ["url", "prompt"]
    });

    let input_schema = if let Value::Object(map) = schema {
        Arc::new(map)
    } else {
        Arc::new(JsonObject::new())
    };

    McpTool {
        name: Cow::Borrowed(EXTRACT_TOOL_NAME),
        title: None,
        description: Some(Cow::Borrowed("Extract structured data from a website.")),
        input_schema,
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

impl ServerHandler for ScrapezyMcpHandler {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2024_11_05,
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: rmcp::model::Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                website_url: None,
                icons: None,
            },
            instructions: None,
        }
    }

    async fn initialize(
        &self,
        _request: rmcp::model::InitializeRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<rmcp::model::InitializeResult, ErrorData> {
        Ok(self.get_info())
    }

    #[tracing::instrument(skip(self, _request, _context), fields(rpc.method = "list_tools"))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tool_definitions.clone(),
            next_cursor: None,
            meta: None,
        })
    }

    #[tracing::instrument(skip(self, request, context), fields(rpc.method = "call_tool", tool.name = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.dispatch(&request.name, request.arguments, &context.ct).await
    }
}
