//! Palette snapping
//!
//! Nearest-color lookup used whenever a draw asks for palette-constrained
//! output. The generated Lua carries an equivalent routine (see
//! `script::lua`), so both sides must agree on metric and tie-breaking:
//! squared RGB distance, alpha ignored, fully transparent entries skipped,
//! lowest index wins.

use crate::color::Color;

/// Squared RGB distance between two colors. Alpha does not participate.
pub fn rgb_distance_sq(a: Color, b: Color) -> u32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Index of the palette entry closest to `color`.
///
/// Fully transparent entries are only considered when the palette has no
/// other entries. Returns `None` only for an empty palette. On exact ties the
/// lowest index is returned.
pub fn nearest_palette_index(color: Color, palette: &[Color]) -> Option<usize> {
    nearest_where(color, palette, |e| !e.is_transparent())
        .or_else(|| nearest_where(color, palette, |_| true))
}

fn nearest_where(
    color: Color,
    palette: &[Color],
    eligible: impl Fn(&Color) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, entry) in palette.iter().enumerate().filter(|(_, e)| eligible(e)) {
        let d = rgb_distance_sq(color, *entry);
        // Strict comparison keeps the earliest entry on ties
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
            if d == 0 {
                break;
            }
        }
    }
    best.map(|(i, _)| i)
}

/// The palette entry closest to `color`, with the entry's own alpha.
///
/// ```
/// use aseprite_mcp::color::Color;
/// use aseprite_mcp::palette::nearest_palette_color;
///
/// let palette = [Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)];
/// assert_eq!(nearest_palette_color(Color::rgb(200, 30, 40), &palette), Some(palette[0]));
/// ```
pub fn nearest_palette_color(color: Color, palette: &[Color]) -> Option<Color> {
    nearest_palette_index(color, palette).map(|i| palette[i])
}
