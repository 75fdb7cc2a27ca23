//! Core MCP server implementation.

use std::path::Path;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::*;
use rmcp::ErrorData as McpError;
use rmcp::{tool_handler, ServerHandler, ServiceExt};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;

use crate::color::{parse_color, Color};
use crate::editor::{self, SpriteEditor};
use crate::error::ValidationError;
use crate::locks::PathLocks;
use crate::script::Operation;

/// The aseprite-mcp server
///
/// Every tool runs one engine script. Calls against the same sprite file are
/// serialized; calls against different files run concurrently.
#[derive(Debug, Clone)]
pub struct AsepriteMcpServer {
    pub(crate) editor: SpriteEditor,
    locks: PathLocks,
    tool_router: ToolRouter<Self>,
}

impl AsepriteMcpServer {
    pub fn new(editor: SpriteEditor) -> Self {
        let tool_router = super::tools::canvas::router()
            + super::tools::palette::router()
            + super::tools::draw::router()
            + super::tools::read::router()
            + super::tools::export::router();
        Self { editor, locks: PathLocks::new(), tool_router }
    }

    /// Exclusive access to `sprite` for the duration of one tool call.
    pub(crate) async fn lock(&self, sprite: &Path) -> OwnedMutexGuard<()> {
        self.locks.lock(sprite).await
    }

    /// Run a mutating operation under the sprite's lock and report its marker line.
    pub(crate) async fn apply(
        &self,
        sprite: &Path,
        op: Operation,
    ) -> Result<CallToolResult, McpError> {
        let _guard = self.lock(sprite).await;
        let line = self.editor.apply(sprite, &op).await.map_err(mcp_error)?;
        Ok(text_result(line))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for AsepriteMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "aseprite-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Edit Aseprite sprite files. Create a canvas with create_canvas, then add \
                 layers and frames, set a palette, draw with the draw_* tools and read \
                 results back with get_pixels (paginated: pass next_cursor until it is \
                 empty). Layers are addressed by name, frames by 1-based number."
                    .into(),
            ),
        }
    }
}

/// Map an editor failure onto an MCP error.
///
/// Problems the caller can fix (bad parameters, refused deletions) are
/// `invalid_params`; engine and I/O failures are `internal_error`.
pub(crate) fn mcp_error(err: editor::Error) -> McpError {
    if err.is_caller_error() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        log::warn!("tool call failed: {}", err);
        McpError::internal_error(err.to_string(), None)
    }
}

pub(crate) fn invalid(err: ValidationError) -> McpError {
    McpError::invalid_params(err.to_string(), None)
}

pub(crate) fn color_param(value: &str) -> Result<Color, McpError> {
    parse_color(value).map_err(|e| invalid(e.into()))
}

pub(crate) fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to encode result: {}", e), None))?;
    Ok(text_result(text))
}

/// Run the MCP server on stdin/stdout until the client disconnects.
pub async fn run_server(editor: SpriteEditor) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();
    let server = AsepriteMcpServer::new(editor.with_cancellation(cancel.clone()));
    log::info!(
        "aseprite-mcp server starting via stdio (engine: {})",
        server.editor.client().engine().display()
    );
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    // Kill any engine still running for an abandoned call
    cancel.cancel();
    log::info!("aseprite-mcp server stopped");
    Ok(())
}
