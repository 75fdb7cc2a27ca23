//! Export tools and reference image downsampling.

use std::path::{Path, PathBuf};

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_router, ErrorData as McpError};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::downsample::{downsample_file, DownsampleError};
use crate::mcp::server::{color_param, invalid, text_result, AsepriteMcpServer};
use crate::script::Operation;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportSpriteParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Output file; the extension selects the format
    pub output: String,
    /// png, gif, jpg, bmp, webp or aseprite; must match the extension if both are given
    pub format: Option<String>,
    /// 1-based frame to flatten, or 0 (default) for every frame
    #[serde(default)]
    pub frame: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportSpritesheetParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Output image file
    pub output: String,
    /// horizontal (default), vertical, rows, columns or packed
    pub layout: Option<String>,
    /// Pixels between frames
    #[serde(default)]
    pub padding: u32,
    /// Also write frame metadata next to the image as .json
    #[serde(default)]
    pub include_json: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownsampleParams {
    /// Source image (png, jpg, ...)
    pub input: String,
    /// Output PNG
    pub output: String,
    pub width: u32,
    pub height: u32,
    /// Optional palette to snap the result to
    pub palette: Option<Vec<String>>,
}

pub(crate) fn router() -> rmcp::handler::server::router::tool::ToolRouter<AsepriteMcpServer> {
    AsepriteMcpServer::export_tools()
}

#[tool_router(router = export_tools)]
impl AsepriteMcpServer {
    #[tool(description = "Export the sprite as an image. Frame 0 exports all frames; other frames are flattened from visible layers")]
    async fn export_sprite(
        &self,
        Parameters(params): Parameters<ExportSpriteParams>,
    ) -> Result<CallToolResult, McpError> {
        let op = Operation::ExportSprite {
            output: PathBuf::from(params.output),
            format: params.format,
            frame: params.frame,
        };
        self.apply(Path::new(&params.sprite), op).await
    }

    #[tool(description = "Export every frame into one spritesheet image")]
    async fn export_spritesheet(
        &self,
        Parameters(params): Parameters<ExportSpritesheetParams>,
    ) -> Result<CallToolResult, McpError> {
        let op = Operation::ExportSpritesheet {
            output: PathBuf::from(params.output),
            layout: params.layout.unwrap_or_else(|| "horizontal".to_string()),
            padding: params.padding,
            include_json: params.include_json,
        };
        self.apply(Path::new(&params.sprite), op).await
    }

    #[tool(description = "Shrink a reference image to pixel-art size, optionally snapping to a palette")]
    async fn downsample_image(
        &self,
        Parameters(params): Parameters<DownsampleParams>,
    ) -> Result<CallToolResult, McpError> {
        let palette = match &params.palette {
            Some(colors) => Some(colors.iter().map(|c| color_param(c)).collect::<Result<Vec<_>, _>>()?),
            None => None,
        };
        let input = PathBuf::from(&params.input);
        let output = PathBuf::from(&params.output);
        let (width, height) = (params.width, params.height);

        let result = tokio::task::spawn_blocking(move || {
            downsample_file(&input, &output, width, height, palette.as_deref())
        })
        .await
        .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?;

        match result {
            Ok(_) => Ok(text_result(format!(
                "Downsampled to {}x{}: {}",
                width, height, params.output
            ))),
            Err(DownsampleError::Validation(e)) => Err(invalid(e)),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }
}
