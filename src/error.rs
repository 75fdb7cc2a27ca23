//! Input validation errors
//!
//! Everything here is detected before the engine is started, so a
//! [`ValidationError`] always means no subprocess ran and no file changed.

use thiserror::Error;

use crate::color::ColorError;
use crate::dither::DitherPattern;
use crate::script::{ExportFormat, SheetLayout, MAX_CANVAS_SIDE, MAX_PALETTE_SIZE};

/// A rejected operation parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Width and height must be positive (got {width}x{height})")]
    NonPositiveSize { width: u32, height: u32 },
    #[error("Canvas {width}x{height} exceeds the maximum side of {max}", max = MAX_CANVAS_SIDE)]
    CanvasTooLarge { width: u32, height: u32 },
    #[error("Layer name must not be empty")]
    EmptyLayerName,
    /// Frame numbers are 1-based
    #[error("Frame number must be at least 1 (got {0})")]
    InvalidFrame(u32),
    #[error("Frame duration must be positive (got {0} ms)")]
    InvalidDuration(u32),
    #[error("Palette must contain at least one color")]
    EmptyPalette,
    #[error("Palette has {0} colors, at most {max} are allowed", max = MAX_PALETTE_SIZE)]
    PaletteTooLarge(usize),
    #[error("No pixels given")]
    NoPixels,
    #[error("Line thickness must be at least 1 (got {0})")]
    InvalidThickness(u32),
    #[error("Dither colors must not be fully transparent")]
    TransparentDitherColor,
    #[error("Unknown dither pattern '{0}' (expected one of: {})", DitherPattern::NAMES.join(", "))]
    UnknownPattern(String),
    #[error("Dither ratio must be within [0, 1] (got {0})")]
    InvalidRatio(f64),
    #[error("Range [{offset}, {offset} + {count}) does not fit a region of {total} pixels")]
    RangeOutsideRegion { offset: u64, count: u64, total: u64 },
    #[error("Unsupported export format '{0}' (expected one of: {})", ExportFormat::NAMES.join(", "))]
    UnsupportedFormat(String),
    #[error("Format '{format}' does not match the extension of '{path}'")]
    FormatMismatch { format: String, path: String },
    #[error("Unsupported spritesheet layout '{0}' (expected one of: {})", SheetLayout::NAMES.join(", "))]
    UnsupportedLayout(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Invalid color: {0}")]
    InvalidColor(#[from] ColorError),
}
