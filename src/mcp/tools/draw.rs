//! Drawing tools.
//!
//! Colors are given as strings and parsed up front, so a bad color never
//! reaches the engine. `use_palette` snaps every color to the nearest entry
//! of the sprite's palette before it is written.

use std::path::PathBuf;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_router, ErrorData as McpError};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::mcp::server::{color_param, AsepriteMcpServer};
use crate::script::{Operation, PixelWrite, Point, Rect};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PixelParam {
    pub x: i32,
    pub y: i32,
    /// "#RRGGBB", "#RRGGBBAA" or a CSS color
    pub color: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DrawPixelsParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Layer name
    pub layer: String,
    /// 1-based frame number
    pub frame: u32,
    pub pixels: Vec<PixelParam>,
    /// Snap colors to the sprite palette
    #[serde(default)]
    pub use_palette: bool,
}

impl DrawPixelsParams {
    pub fn into_op(self) -> Result<(PathBuf, Operation), McpError> {
        let pixels = self
            .pixels
            .iter()
            .map(|p| Ok(PixelWrite { x: p.x, y: p.y, color: color_param(&p.color)? }))
            .collect::<Result<Vec<_>, McpError>>()?;
        let op = Operation::DrawPixels {
            layer: self.layer,
            frame: self.frame,
            pixels,
            use_palette: self.use_palette,
        };
        Ok((PathBuf::from(self.sprite), op))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DrawLineParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Layer name
    pub layer: String,
    /// 1-based frame number
    pub frame: u32,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub color: String,
    /// Line thickness in pixels (default 1)
    pub thickness: Option<u32>,
    #[serde(default)]
    pub use_palette: bool,
}

impl DrawLineParams {
    pub fn into_op(self) -> Result<(PathBuf, Operation), McpError> {
        let op = Operation::DrawLine {
            layer: self.layer,
            frame: self.frame,
            from: Point::new(self.x1, self.y1),
            to: Point::new(self.x2, self.y2),
            color: color_param(&self.color)?,
            thickness: self.thickness.unwrap_or(1),
            use_palette: self.use_palette,
        };
        Ok((PathBuf::from(self.sprite), op))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DrawRectangleParams {
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
    pub color: String,
    /// Fill the rectangle instead of drawing its outline
    #[serde(default)]
    pub filled: bool,
    #[serde(default)]
    pub use_palette: bool,
}

impl DrawRectangleParams {
    pub fn into_op(self) -> Result<(PathBuf, Operation), McpError> {
        let op = Operation::DrawRectangle {
            layer: self.layer,
            frame: self.frame,
            rect: Rect::new(self.x, self.y, self.width, self.height),
            color: color_param(&self.color)?,
            filled: self.filled,
            use_palette: self.use_palette,
        };
        Ok((PathBuf::from(self.sprite), op))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DrawCircleParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Layer name
    pub layer: String,
    /// 1-based frame number
    pub frame: u32,
    pub center_x: i32,
    pub center_y: i32,
    pub radius: u32,
    pub color: String,
    #[serde(default)]
    pub filled: bool,
    #[serde(default)]
    pub use_palette: bool,
}

impl DrawCircleParams {
    pub fn into_op(self) -> Result<(PathBuf, Operation), McpError> {
        let op = Operation::DrawCircle {
            layer: self.layer,
            frame: self.frame,
            center: Point::new(self.center_x, self.center_y),
            radius: self.radius,
            color: color_param(&self.color)?,
            filled: self.filled,
            use_palette: self.use_palette,
        };
        Ok((PathBuf::from(self.sprite), op))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FillAreaParams {
    /// Path to the sprite file
    pub sprite: String,
    /// Layer name
    pub layer: String,
    /// 1-based frame number
    pub frame: u32,
    pub x: i32,
    pub y: i32,
    pub color: String,
    /// Per-channel tolerance 0-255 (ignored for indexed sprites)
    #[serde(default)]
    pub tolerance: u8,
    #[serde(default)]
    pub use_palette: bool,
}

impl FillAreaParams {
    pub fn into_op(self) -> Result<(PathBuf, Operation), McpError> {
        let op = Operation::FillArea {
            layer: self.layer,
            frame: self.frame,
            point: Point::new(self.x, self.y),
            color: color_param(&self.color)?,
            tolerance: self.tolerance,
            use_palette: self.use_palette,
        };
        Ok((PathBuf::from(self.sprite), op))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DitherParams {
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
    pub color1: String,
    pub color2: String,
    /// checkerboard, bayer_2x2, bayer_4x4 (default), bayer_8x8, diagonal, horizontal, vertical
    pub pattern: Option<String>,
    /// Share of pixels that get color1, from 0 to 1
    pub ratio: f64,
    #[serde(default)]
    pub use_palette: bool,
}

impl DitherParams {
    pub fn into_op(self) -> Result<(PathBuf, Operation), McpError> {
        let op = Operation::DrawWithDither {
            layer: self.layer,
            frame: self.frame,
            rect: Rect::new(self.x, self.y, self.width, self.height),
            color1: color_param(&self.color1)?,
            color2: color_param(&self.color2)?,
            pattern: self.pattern.unwrap_or_else(|| "bayer_4x4".to_string()),
            ratio: self.ratio,
            use_palette: self.use_palette,
        };
        Ok((PathBuf::from(self.sprite), op))
    }
}

pub(crate) fn router() -> rmcp::handler::server::router::tool::ToolRouter<AsepriteMcpServer> {
    AsepriteMcpServer::draw_tools()
}

#[tool_router(router = draw_tools)]
impl AsepriteMcpServer {
    #[tool(description = "Set individual pixels on a layer and frame")]
    async fn draw_pixels(
        &self,
        Parameters(params): Parameters<DrawPixelsParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sprite, op) = params.into_op()?;
        self.apply(&sprite, op).await
    }

    #[tool(description = "Draw a straight line between two points")]
    async fn draw_line(
        &self,
        Parameters(params): Parameters<DrawLineParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sprite, op) = params.into_op()?;
        self.apply(&sprite, op).await
    }

    #[tool(description = "Draw a rectangle outline or a filled rectangle")]
    async fn draw_rectangle(
        &self,
        Parameters(params): Parameters<DrawRectangleParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sprite, op) = params.into_op()?;
        self.apply(&sprite, op).await
    }

    #[tool(description = "Draw a circle outline or a filled circle")]
    async fn draw_circle(
        &self,
        Parameters(params): Parameters<DrawCircleParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sprite, op) = params.into_op()?;
        self.apply(&sprite, op).await
    }

    #[tool(description = "Flood fill the 4-connected area around a point")]
    async fn fill_area(
        &self,
        Parameters(params): Parameters<FillAreaParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sprite, op) = params.into_op()?;
        self.apply(&sprite, op).await
    }

    #[tool(description = "Fill a rectangle with an ordered dither of two colors")]
    async fn draw_with_dither(
        &self,
        Parameters(params): Parameters<DitherParams>,
    ) -> Result<CallToolResult, McpError> {
        let (sprite, op) = params.into_op()?;
        self.apply(&sprite, op).await
    }
}
