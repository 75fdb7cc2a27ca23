//! Palette tools.

use std::path::Path;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_router, ErrorData as McpError};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::mcp::server::{color_param, json_result, mcp_error, AsepriteMcpServer};
use crate::script::Operation;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetPaletteParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Colors in palette order ("#RRGGBB", "#RRGGBBAA" or CSS colors). Position becomes the index.
    pub colors: Vec<String>,
}

impl SetPaletteParams {
    pub fn into_op(self) -> Result<Operation, McpError> {
        let colors = self.colors.iter().map(|c| color_param(c)).collect::<Result<Vec<_>, _>>()?;
        Ok(Operation::SetPalette { colors })
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SpriteParams {
    /// Path to the sprite file
    pub sprite: String,
}

pub(crate) fn router() -> rmcp::handler::server::router::tool::ToolRouter<AsepriteMcpServer> {
    AsepriteMcpServer::palette_tools()
}

#[tool_router(router = palette_tools)]
impl AsepriteMcpServer {
    #[tool(description = "Replace the sprite palette. List position becomes the palette index. Indexed sprites take at most 255 colors; pixels past the new palette are remapped to the nearest color")]
    async fn set_palette(
        &self,
        Parameters(params): Parameters<SetPaletteParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprite = params.sprite.clone();
        self.apply(Path::new(&sprite), params.into_op()?).await
    }

    #[tool(description = "List the palette colors as #RRGGBBAA, with the transparent index for indexed sprites")]
    async fn get_palette(
        &self,
        Parameters(params): Parameters<SpriteParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprite = Path::new(&params.sprite);
        let _guard = self.lock(sprite).await;
        let palette = self.editor.get_palette(sprite).await.map_err(mcp_error)?;
        json_result(&palette)
    }
}
