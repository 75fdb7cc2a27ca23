//! Reference image reduction
//!
//! Shrinks an arbitrary image to pixel-art dimensions so it can be traced or
//! drawn into a sprite. Each target pixel is the alpha-weighted box average of
//! the source cell it covers; optionally every visible result pixel is then
//! snapped to a palette with the same rule the draw operations use.

use std::path::Path;

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::color::Color;
use crate::error::ValidationError;
use crate::palette::nearest_palette_color;

#[derive(Debug, Error)]
pub enum DownsampleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Reduce `src` to `width`×`height`.
///
/// Fully transparent cells stay transparent and are never snapped.
pub fn downsample(
    src: &RgbaImage,
    width: u32,
    height: u32,
    palette: Option<&[Color]>,
) -> Result<RgbaImage, ValidationError> {
    if width == 0 || height == 0 {
        return Err(ValidationError::NonPositiveSize { width, height });
    }
    if src.width() == 0 || src.height() == 0 {
        return Err(ValidationError::NonPositiveSize { width: src.width(), height: src.height() });
    }
    let palette = palette.filter(|p| !p.is_empty());

    let mut out = RgbaImage::new(width, height);
    for ty in 0..height {
        let (y0, y1) = cell_span(ty, height, src.height());
        for tx in 0..width {
            let (x0, x1) = cell_span(tx, width, src.width());
            let mut color = box_average(src, x0, x1, y0, y1);
            if let Some(palette) = palette {
                if color.a > 0 {
                    color = nearest_palette_color(color, palette).unwrap_or(color);
                }
            }
            out.put_pixel(tx, ty, Rgba::from(color));
        }
    }
    Ok(out)
}

/// Load `input`, downsample it and save the result as `output`.
pub fn downsample_file(
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    palette: Option<&[Color]>,
) -> Result<RgbaImage, DownsampleError> {
    let src = image::open(input)?.to_rgba8();
    let out = downsample(&src, width, height, palette)?;
    out.save(output)?;
    log::info!(
        "downsampled {} ({}x{}) to {} ({}x{})",
        input.display(),
        src.width(),
        src.height(),
        output.display(),
        width,
        height
    );
    Ok(out)
}

/// Source range `[start, end)` covered by target index `i`; never empty.
fn cell_span(i: u32, target: u32, source: u32) -> (u32, u32) {
    let start = (i as u64 * source as u64 / target as u64) as u32;
    let end = ((i as u64 + 1) * source as u64 / target as u64) as u32;
    (start, end.max(start + 1).min(source))
}

fn box_average(src: &RgbaImage, x0: u32, x1: u32, y0: u32, y1: u32) -> Color {
    let (mut r, mut g, mut b, mut a, mut n) = (0u64, 0u64, 0u64, 0u64, 0u64);
    for y in y0..y1 {
        for x in x0..x1 {
            let p = src.get_pixel(x, y).0;
            let alpha = p[3] as u64;
            r += p[0] as u64 * alpha;
            g += p[1] as u64 * alpha;
            b += p[2] as u64 * alpha;
            a += alpha;
            n += 1;
        }
    }
    if a == 0 {
        return Color::TRANSPARENT;
    }
    let round = |sum: u64, div: u64| ((sum + div / 2) / div) as u8;
    Color::rgba(round(r, a), round(g, a), round(b, a), round(a, n))
}
