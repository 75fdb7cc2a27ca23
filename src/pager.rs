//! Cursor pagination over rectangular pixel reads
//!
//! A read of a `width`×`height` rectangle is split into pages over its
//! row-major scan (y outer, x inner). The cursor handed back to the caller is
//! an opaque URL-safe base64 token naming the next offset and the rectangle
//! it belongs to. A cursor is only meaningful while the sprite is not being
//! modified between pages.

use base64::Engine;

use crate::error::ValidationError;
use crate::script::Rect;

pub const DEFAULT_PAGE_SIZE: u64 = 1000;
pub const MAX_PAGE_SIZE: u64 = 10_000;

const CURSOR_VERSION: &str = "v1";

/// Clamp a requested page size to `[1, MAX_PAGE_SIZE]`.
pub fn clamp_page_size(requested: Option<u64>) -> u64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

pub fn encode_cursor(rect: &Rect, offset: u64) -> String {
    let raw = format!(
        "{}:{},{},{},{}:{}",
        CURSOR_VERSION, rect.x, rect.y, rect.width, rect.height, offset
    );
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw)
}

/// Offset carried by `cursor`, which must have been issued for `rect`.
pub fn decode_cursor(cursor: &str, rect: &Rect) -> Result<u64, ValidationError> {
    let invalid = |why: &str| ValidationError::InvalidCursor(why.to_string());

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(cursor.trim())
        .map_err(|_| invalid("not a cursor token"))?;
    let raw = String::from_utf8(bytes).map_err(|_| invalid("not a cursor token"))?;

    let mut parts = raw.split(':');
    let (Some(version), Some(region), Some(offset), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("malformed cursor"));
    };
    if version != CURSOR_VERSION {
        return Err(invalid("unknown cursor version"));
    }

    let expected = format!("{},{},{},{}", rect.x, rect.y, rect.width, rect.height);
    if region != expected {
        return Err(invalid("cursor was issued for a different region"));
    }

    let offset: u64 = offset.parse().map_err(|_| invalid("malformed cursor offset"))?;
    if offset >= rect.area() {
        return Err(invalid("cursor offset is past the end of the region"));
    }
    Ok(offset)
}

/// One page of a rectangular read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub rect: Rect,
    pub offset: u64,
    pub count: u64,
    pub total: u64,
}

impl PagePlan {
    /// Cursor for the page after this one, or `""` when this is the last.
    pub fn next_cursor(&self) -> String {
        let end = self.offset + self.count;
        if end < self.total {
            encode_cursor(&self.rect, end)
        } else {
            String::new()
        }
    }
}

/// Work out which pixels the page starting at `cursor` covers.
///
/// An absent or empty cursor starts at offset 0.
pub fn plan(
    rect: &Rect,
    cursor: Option<&str>,
    page_size: Option<u64>,
) -> Result<PagePlan, ValidationError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(ValidationError::NonPositiveSize { width: rect.width, height: rect.height });
    }
    let total = rect.area();
    let offset = match cursor.filter(|c| !c.is_empty()) {
        Some(cursor) => decode_cursor(cursor, rect)?,
        None => 0,
    };
    let count = clamp_page_size(page_size).min(total - offset);
    Ok(PagePlan { rect: *rect, offset, count, total })
}
