//! Script generation for the external sprite engine
//!
//! Every sprite operation is described by one [`Operation`] variant. A single
//! serializer, [`generate`], validates the descriptor and renders it into a
//! Lua script for Aseprite's `--batch --script` mode. Generation is pure and
//! deterministic: equal operations always produce byte-identical scripts.
//!
//! Mutating scripts report success by printing a fixed marker line (see
//! [`Operation::success_marker`]); read scripts print JSON. Domain refusals
//! are raised as Lua errors whose messages are the [`LAST_LAYER`] and
//! [`LAST_FRAME`] literals.

mod canvas;
mod draw;
mod export;
pub mod lua;
mod read;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::dither::DitherPattern;
use crate::error::ValidationError;

pub use export::{ExportFormat, SheetLayout};

/// Diagnostic raised when deleting the only layer.
pub const LAST_LAYER: &str = "Cannot delete the last layer";
/// Diagnostic raised when deleting the only frame.
pub const LAST_FRAME: &str = "Cannot delete the last frame";

/// Diagnostic raised when an indexed sprite gets more colors than fit beside
/// its transparent entry.
pub const PALETTE_TOO_LARGE: &str =
    "Indexed palettes hold at most 255 colors plus the transparent entry";

/// Every diagnostic that marks a domain-level refusal rather than a failure.
pub const REFUSALS: &[&str] = &[LAST_LAYER, LAST_FRAME, PALETTE_TOO_LARGE];

/// Largest canvas side the engine accepts.
pub const MAX_CANVAS_SIDE: u32 = 65_535;
/// Palettes hold at most 256 entries.
///
/// Indexed sprites reserve one entry for transparency, so they take at most
/// 255 colors; the color mode is only known to the engine, which refuses
/// larger palettes with [`PALETTE_TOO_LARGE`].
pub const MAX_PALETTE_SIZE: usize = 256;

/// Sprite color mode, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Direct RGBA color
    #[default]
    Rgb,
    /// Palette indices
    Indexed,
    Grayscale,
}

impl ColorMode {
    /// Name of the engine's `ColorMode` constant.
    fn engine_name(&self) -> &'static str {
        match self {
            ColorMode::Rgb => "ColorMode.RGB",
            ColorMode::Indexed => "ColorMode.INDEXED",
            ColorMode::Grayscale => "ColorMode.GRAYSCALE",
        }
    }

    pub fn from_str(s: &str) -> Option<ColorMode> {
        match s.to_lowercase().as_str() {
            "rgb" | "rgba" => Some(ColorMode::Rgb),
            "indexed" => Some(ColorMode::Indexed),
            "grayscale" | "gray" => Some(ColorMode::Grayscale),
            _ => None,
        }
    }
}

/// Integer pixel coordinate. May lie outside the canvas; writes there are clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `width`×`height` pixels starting at (`x`, `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Number of pixels in the rectangle.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A single pixel write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWrite {
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

/// Flip axis for [`Operation::FlipSprite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

fn default_duration_ms() -> u32 {
    100
}

fn default_thickness() -> u32 {
    1
}

fn default_pattern() -> String {
    "bayer_4x4".to_string()
}

fn default_layout() -> String {
    "horizontal".to_string()
}

/// One scripted operation against a sprite.
///
/// Layers are addressed by name and frames by 1-based number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create a new sprite file. The only operation without an input sprite.
    CreateCanvas {
        width: u32,
        height: u32,
        #[serde(default)]
        color_mode: ColorMode,
        path: PathBuf,
    },
    AddLayer {
        name: String,
    },
    DeleteLayer {
        name: String,
    },
    AddFrame {
        #[serde(default = "default_duration_ms")]
        duration_ms: u32,
    },
    DeleteFrame {
        frame: u32,
    },
    SetFrameDuration {
        frame: u32,
        duration_ms: u32,
    },
    /// Replace the palette; list position becomes the palette index.
    SetPalette {
        colors: Vec<Color>,
    },
    GetPalette,
    GetSpriteInfo,
    DrawPixels {
        layer: String,
        frame: u32,
        pixels: Vec<PixelWrite>,
        #[serde(default)]
        use_palette: bool,
    },
    DrawLine {
        layer: String,
        frame: u32,
        from: Point,
        to: Point,
        color: Color,
        #[serde(default = "default_thickness")]
        thickness: u32,
        #[serde(default)]
        use_palette: bool,
    },
    DrawRectangle {
        layer: String,
        frame: u32,
        rect: Rect,
        color: Color,
        #[serde(default)]
        filled: bool,
        #[serde(default)]
        use_palette: bool,
    },
    DrawCircle {
        layer: String,
        frame: u32,
        center: Point,
        radius: u32,
        color: Color,
        #[serde(default)]
        filled: bool,
        #[serde(default)]
        use_palette: bool,
    },
    /// 4-connected flood fill from `point`.
    FillArea {
        layer: String,
        frame: u32,
        point: Point,
        color: Color,
        /// Per-channel tolerance; ignored for indexed sprites, which match exact indices.
        #[serde(default)]
        tolerance: u8,
        #[serde(default)]
        use_palette: bool,
    },
    DrawWithDither {
        layer: String,
        frame: u32,
        rect: Rect,
        color1: Color,
        color2: Color,
        #[serde(default = "default_pattern")]
        pattern: String,
        /// Share of pixels that receive `color1`, in `[0, 1]`.
        ratio: f64,
        #[serde(default)]
        use_palette: bool,
    },
    /// Read `count` pixels starting at row-major `offset` within `rect`.
    GetPixels {
        layer: String,
        frame: u32,
        rect: Rect,
        offset: u64,
        count: u64,
    },
    /// Flatten visible layers and save. `frame = 0` exports every frame.
    ExportSprite {
        output: PathBuf,
        #[serde(default)]
        format: Option<String>,
        #[serde(default)]
        frame: u32,
    },
    ExportSpritesheet {
        output: PathBuf,
        #[serde(default = "default_layout")]
        layout: String,
        #[serde(default)]
        padding: u32,
        #[serde(default)]
        include_json: bool,
    },
    FlipSprite {
        direction: FlipDirection,
    },
}

impl Operation {
    /// Snake-case operation name, as used in the `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateCanvas { .. } => "create_canvas",
            Operation::AddLayer { .. } => "add_layer",
            Operation::DeleteLayer { .. } => "delete_layer",
            Operation::AddFrame { .. } => "add_frame",
            Operation::DeleteFrame { .. } => "delete_frame",
            Operation::SetFrameDuration { .. } => "set_frame_duration",
            Operation::SetPalette { .. } => "set_palette",
            Operation::GetPalette => "get_palette",
            Operation::GetSpriteInfo => "get_sprite_info",
            Operation::DrawPixels { .. } => "draw_pixels",
            Operation::DrawLine { .. } => "draw_line",
            Operation::DrawRectangle { .. } => "draw_rectangle",
            Operation::DrawCircle { .. } => "draw_circle",
            Operation::FillArea { .. } => "fill_area",
            Operation::DrawWithDither { .. } => "draw_with_dither",
            Operation::GetPixels { .. } => "get_pixels",
            Operation::ExportSprite { .. } => "export_sprite",
            Operation::ExportSpritesheet { .. } => "export_spritesheet",
            Operation::FlipSprite { .. } => "flip_sprite",
        }
    }

    /// Whether the engine must be started with an existing sprite file.
    pub fn needs_sprite(&self) -> bool {
        !matches!(self, Operation::CreateCanvas { .. })
    }

    /// Literal line printed on success by mutating operations.
    ///
    /// Read operations print JSON instead and return `None`.
    pub fn success_marker(&self) -> Option<&'static str> {
        match self {
            Operation::CreateCanvas { .. } => Some("Canvas created successfully"),
            Operation::AddLayer { .. } => Some("Layer added successfully"),
            Operation::DeleteLayer { .. } => Some("Layer deleted successfully"),
            Operation::AddFrame { .. } => Some("Frame added successfully"),
            Operation::DeleteFrame { .. } => Some("Frame deleted successfully"),
            Operation::SetFrameDuration { .. } => Some("Frame duration set successfully"),
            Operation::SetPalette { .. } => Some("Palette set successfully"),
            Operation::DrawPixels { .. } => Some("Pixels drawn successfully"),
            Operation::DrawLine { .. } => Some("Line drawn successfully"),
            Operation::DrawRectangle { .. } => Some("Rectangle drawn successfully"),
            Operation::DrawCircle { .. } => Some("Circle drawn successfully"),
            Operation::FillArea { .. } => Some("Area filled successfully"),
            Operation::DrawWithDither { .. } => Some("Dithering applied successfully"),
            Operation::ExportSprite { .. } => Some("Exported successfully"),
            Operation::ExportSpritesheet { .. } => Some("Spritesheet exported successfully"),
            Operation::FlipSprite { .. } => Some("Sprite flipped successfully"),
            Operation::GetPalette | Operation::GetSpriteInfo | Operation::GetPixels { .. } => None,
        }
    }

    /// Check every parameter that can be checked without the engine.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Operation::CreateCanvas { width, height, .. } => {
                if *width == 0 || *height == 0 {
                    return Err(ValidationError::NonPositiveSize { width: *width, height: *height });
                }
                if *width > MAX_CANVAS_SIDE || *height > MAX_CANVAS_SIDE {
                    return Err(ValidationError::CanvasTooLarge { width: *width, height: *height });
                }
                Ok(())
            }
            Operation::AddLayer { name } | Operation::DeleteLayer { name } => check_name(name),
            Operation::AddFrame { duration_ms } => check_duration(*duration_ms),
            Operation::DeleteFrame { frame } => check_frame(*frame),
            Operation::SetFrameDuration { frame, duration_ms } => {
                check_frame(*frame)?;
                check_duration(*duration_ms)
            }
            Operation::SetPalette { colors } => {
                if colors.is_empty() {
                    return Err(ValidationError::EmptyPalette);
                }
                if colors.len() > MAX_PALETTE_SIZE {
                    return Err(ValidationError::PaletteTooLarge(colors.len()));
                }
                Ok(())
            }
            Operation::GetPalette | Operation::GetSpriteInfo | Operation::FlipSprite { .. } => {
                Ok(())
            }
            Operation::DrawPixels { layer, frame, pixels, .. } => {
                check_target(layer, *frame)?;
                if pixels.is_empty() {
                    return Err(ValidationError::NoPixels);
                }
                Ok(())
            }
            Operation::DrawLine { layer, frame, thickness, .. } => {
                check_target(layer, *frame)?;
                if *thickness == 0 {
                    return Err(ValidationError::InvalidThickness(*thickness));
                }
                Ok(())
            }
            Operation::DrawRectangle { layer, frame, rect, .. } => {
                check_target(layer, *frame)?;
                check_rect(rect)
            }
            Operation::DrawCircle { layer, frame, .. } | Operation::FillArea { layer, frame, .. } => {
                check_target(layer, *frame)
            }
            Operation::DrawWithDither { layer, frame, rect, color1, color2, pattern, ratio, .. } => {
                check_target(layer, *frame)?;
                check_rect(rect)?;
                if color1.is_transparent() || color2.is_transparent() {
                    return Err(ValidationError::TransparentDitherColor);
                }
                if DitherPattern::from_str(pattern).is_none() {
                    return Err(ValidationError::UnknownPattern(pattern.clone()));
                }
                if !ratio.is_finite() || *ratio < 0.0 || *ratio > 1.0 {
                    return Err(ValidationError::InvalidRatio(*ratio));
                }
                Ok(())
            }
            Operation::GetPixels { layer, frame, rect, offset, count } => {
                check_target(layer, *frame)?;
                check_rect(rect)?;
                let total = rect.area();
                if *count == 0 || offset.checked_add(*count).map_or(true, |end| end > total) {
                    return Err(ValidationError::RangeOutsideRegion {
                        offset: *offset,
                        count: *count,
                        total,
                    });
                }
                Ok(())
            }
            Operation::ExportSprite { output, format, .. } => {
                ExportFormat::resolve(output, format.as_deref()).map(|_| ())
            }
            Operation::ExportSpritesheet { output, layout, .. } => {
                if SheetLayout::from_str(layout).is_none() {
                    return Err(ValidationError::UnsupportedLayout(layout.clone()));
                }
                ExportFormat::resolve(output, None).map(|_| ())
            }
        }
    }
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyLayerName);
    }
    Ok(())
}

fn check_frame(frame: u32) -> Result<(), ValidationError> {
    if frame < 1 {
        return Err(ValidationError::InvalidFrame(frame));
    }
    Ok(())
}

fn check_duration(duration_ms: u32) -> Result<(), ValidationError> {
    if duration_ms == 0 {
        return Err(ValidationError::InvalidDuration(duration_ms));
    }
    Ok(())
}

fn check_target(layer: &str, frame: u32) -> Result<(), ValidationError> {
    check_name(layer)?;
    check_frame(frame)
}

fn check_rect(rect: &Rect) -> Result<(), ValidationError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(ValidationError::NonPositiveSize { width: rect.width, height: rect.height });
    }
    Ok(())
}

/// Validate `op` and render it as a Lua script.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found; no script is produced for
/// an invalid operation.
pub fn generate(op: &Operation) -> Result<String, ValidationError> {
    op.validate()?;

    let script = match op {
        Operation::CreateCanvas { width, height, color_mode, path } => {
            canvas::create_canvas(*width, *height, *color_mode, path)
        }
        Operation::AddLayer { name } => canvas::add_layer(name),
        Operation::DeleteLayer { name } => canvas::delete_layer(name),
        Operation::AddFrame { duration_ms } => canvas::add_frame(*duration_ms),
        Operation::DeleteFrame { frame } => canvas::delete_frame(*frame),
        Operation::SetFrameDuration { frame, duration_ms } => {
            canvas::set_frame_duration(*frame, *duration_ms)
        }
        Operation::SetPalette { colors } => canvas::set_palette(colors),
        Operation::GetPalette => read::get_palette(),
        Operation::GetSpriteInfo => read::get_sprite_info(),
        Operation::FlipSprite { direction } => canvas::flip_sprite(*direction),
        Operation::DrawPixels { layer, frame, pixels, use_palette } => {
            draw::draw_pixels(layer, *frame, pixels, *use_palette)
        }
        Operation::DrawLine { layer, frame, from, to, color, thickness, use_palette } => {
            draw::draw_line(layer, *frame, *from, *to, *color, *thickness, *use_palette)
        }
        Operation::DrawRectangle { layer, frame, rect, color, filled, use_palette } => {
            draw::draw_rectangle(layer, *frame, rect, *color, *filled, *use_palette)
        }
        Operation::DrawCircle { layer, frame, center, radius, color, filled, use_palette } => {
            draw::draw_circle(layer, *frame, *center, *radius, *color, *filled, *use_palette)
        }
        Operation::FillArea { layer, frame, point, color, tolerance, use_palette } => {
            draw::fill_area(layer, *frame, *point, *color, *tolerance, *use_palette)
        }
        Operation::DrawWithDither {
            layer,
            frame,
            rect,
            color1,
            color2,
            pattern,
            ratio,
            use_palette,
        } => {
            // validate() has already accepted the name
            let pattern = DitherPattern::from_str(pattern)
                .ok_or_else(|| ValidationError::UnknownPattern(pattern.clone()))?;
            draw::draw_with_dither(
                layer,
                *frame,
                rect,
                *color1,
                *color2,
                pattern,
                *ratio,
                *use_palette,
            )
        }
        Operation::GetPixels { layer, frame, rect, offset, count } => {
            read::get_pixels(layer, *frame, rect, *offset, *count)
        }
        Operation::ExportSprite { output, format, frame } => {
            let format = ExportFormat::resolve(output, format.as_deref())?;
            export::export_sprite(&format.output_path(output), *frame)
        }
        Operation::ExportSpritesheet { output, layout, padding, include_json } => {
            let layout = SheetLayout::from_str(layout)
                .ok_or_else(|| ValidationError::UnsupportedLayout(layout.clone()))?;
            export::export_spritesheet(output, layout, *padding, *include_json)
        }
    };

    Ok(script)
}
