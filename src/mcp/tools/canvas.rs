//! Canvas, layer and frame tools.

use std::path::PathBuf;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_router, ErrorData as McpError};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::mcp::server::AsepriteMcpServer;
use crate::script::{ColorMode, FlipDirection, Operation};

#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorModeParam {
    #[default]
    Rgb,
    Indexed,
    Grayscale,
}

impl From<ColorModeParam> for ColorMode {
    fn from(mode: ColorModeParam) -> Self {
        match mode {
            ColorModeParam::Rgb => ColorMode::Rgb,
            ColorModeParam::Indexed => ColorMode::Indexed,
            ColorModeParam::Grayscale => ColorMode::Grayscale,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DirectionParam {
    Horizontal,
    Vertical,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCanvasParams {
    /// Where to save the new sprite (.aseprite)
    pub path: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// rgb (default), indexed or grayscale
    pub color_mode: Option<ColorModeParam>,
}

impl CreateCanvasParams {
    pub fn into_op(self) -> Operation {
        Operation::CreateCanvas {
            width: self.width,
            height: self.height,
            color_mode: self.color_mode.unwrap_or_default().into(),
            path: PathBuf::from(self.path),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LayerParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Layer name
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddFrameParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Frame duration in milliseconds (default 100)
    pub duration_ms: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FrameParams {
    /// Path to the sprite file
    pub sprite: String,
    /// 1-based frame number
    pub frame: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FrameDurationParams {
    /// Path to the sprite file
    pub sprite: String,
    /// 1-based frame number
    pub frame: u32,
    /// New duration in milliseconds
    pub duration_ms: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlipParams {
    /// Path to the sprite file
    pub sprite: String,
    pub direction: DirectionParam,
}

pub(crate) fn router() -> rmcp::handler::server::router::tool::ToolRouter<AsepriteMcpServer> {
    AsepriteMcpServer::canvas_tools()
}

#[tool_router(router = canvas_tools)]
impl AsepriteMcpServer {
    #[tool(description = "Create a new sprite file with the given size and color mode")]
    async fn create_canvas(
        &self,
        Parameters(params): Parameters<CreateCanvasParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = PathBuf::from(&params.path);
        self.apply(&path, params.into_op()).await
    }

    #[tool(description = "Add a new layer on top of the layer stack")]
    async fn add_layer(
        &self,
        Parameters(params): Parameters<LayerParams>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(params.sprite.as_ref(), Operation::AddLayer { name: params.name }).await
    }

    #[tool(description = "Delete a layer by name. The last remaining layer cannot be deleted")]
    async fn delete_layer(
        &self,
        Parameters(params): Parameters<LayerParams>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(params.sprite.as_ref(), Operation::DeleteLayer { name: params.name }).await
    }

    #[tool(description = "Append a new empty frame and report its number")]
    async fn add_frame(
        &self,
        Parameters(params): Parameters<AddFrameParams>,
    ) -> Result<CallToolResult, McpError> {
        let op = Operation::AddFrame { duration_ms: params.duration_ms.unwrap_or(100) };
        self.apply(params.sprite.as_ref(), op).await
    }

    #[tool(description = "Delete a frame by 1-based number. The last remaining frame cannot be deleted")]
    async fn delete_frame(
        &self,
        Parameters(params): Parameters<FrameParams>,
    ) -> Result<CallToolResult, McpError> {
        self.apply(params.sprite.as_ref(), Operation::DeleteFrame { frame: params.frame }).await
    }

    #[tool(description = "Set the duration of a frame in milliseconds")]
    async fn set_frame_duration(
        &self,
        Parameters(params): Parameters<FrameDurationParams>,
    ) -> Result<CallToolResult, McpError> {
        let op = Operation::SetFrameDuration { frame: params.frame, duration_ms: params.duration_ms };
        self.apply(params.sprite.as_ref(), op).await
    }

    #[tool(description = "Flip the whole sprite horizontally or vertically")]
    async fn flip_sprite(
        &self,
        Parameters(params): Parameters<FlipParams>,
    ) -> Result<CallToolResult, McpError> {
        let direction = match params.direction {
            DirectionParam::Horizontal => FlipDirection::Horizontal,
            DirectionParam::Vertical => FlipDirection::Vertical,
        };
        self.apply(params.sprite.as_ref(), Operation::FlipSprite { direction }).await
    }
}
