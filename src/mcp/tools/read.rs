//! Read tools: paginated pixel reads and sprite metadata.

use std::path::Path;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_router, ErrorData as McpError};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::mcp::server::{json_result, mcp_error, AsepriteMcpServer};
use crate::mcp::tools::palette::SpriteParams;
use crate::script::Rect;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetPixelsParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Layer name
    pub layer: String,
    /// 1-based frame number
    pub frame: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// next_cursor from the previous page; omit for the first page
    pub cursor: Option<String>,
    /// Pixels per page (default 1000, max 10000)
    pub page_size: Option<u64>,
}

pub(crate) fn router() -> rmcp::handler::server::router::tool::ToolRouter<AsepriteMcpServer> {
    AsepriteMcpServer::read_tools()
}

#[tool_router(router = read_tools)]
impl AsepriteMcpServer {
    #[tool(
        description = "Read pixels of a rectangle in row-major order as {x, y, color}. Results are \
                       paginated: keep passing next_cursor back until it is empty"
    )]
    async fn get_pixels(
        &self,
        Parameters(params): Parameters<GetPixelsParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprite = Path::new(&params.sprite);
        let rect = Rect::new(params.x, params.y, params.width, params.height);
        let _guard = self.lock(sprite).await;
        let page = self
            .editor
            .get_pixels(
                sprite,
                &params.layer,
                params.frame,
                rect,
                params.cursor.as_deref(),
                params.page_size,
            )
            .await
            .map_err(mcp_error)?;
        json_result(&page)
    }

    #[tool(description = "Describe a sprite: size, color mode, layers, frame durations, palette size")]
    async fn get_sprite_info(
        &self,
        Parameters(params): Parameters<SpriteParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprite = Path::new(&params.sprite);
        let _guard = self.lock(sprite).await;
        let info = self.editor.get_sprite_info(sprite).await.map_err(mcp_error)?;
        json_result(&info)
    }
}
