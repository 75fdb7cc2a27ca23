//! Lua script assembly
//!
//! Every generated script has the same shape: a header comment, a block of
//! `local` parameter bindings rendered from Rust values, then static helper
//! and body chunks. User-supplied strings only ever reach the script through
//! [`LuaValue`], which owns all quoting.

use std::path::Path;

use crate::color::Color;

/// A Rust value that can be written as a Lua literal.
pub trait LuaValue {
    fn to_lua(&self) -> String;
}

impl LuaValue for bool {
    fn to_lua(&self) -> String {
        self.to_string()
    }
}

impl LuaValue for i32 {
    fn to_lua(&self) -> String {
        self.to_string()
    }
}

impl LuaValue for u32 {
    fn to_lua(&self) -> String {
        self.to_string()
    }
}

impl LuaValue for u64 {
    fn to_lua(&self) -> String {
        self.to_string()
    }
}

impl LuaValue for f64 {
    fn to_lua(&self) -> String {
        // Display gives the shortest string that parses back to the same double
        let s = self.to_string();
        if s.contains('.') || s.contains('e') {
            s
        } else {
            format!("{}.0", s)
        }
    }
}

impl LuaValue for str {
    fn to_lua(&self) -> String {
        quote(self)
    }
}

impl LuaValue for String {
    fn to_lua(&self) -> String {
        quote(self)
    }
}

impl LuaValue for Path {
    fn to_lua(&self) -> String {
        quote(&self.to_string_lossy())
    }
}

impl LuaValue for Color {
    /// `{ r, g, b, a }`
    fn to_lua(&self) -> String {
        format!("{{ {}, {}, {}, {} }}", self.r, self.g, self.b, self.a)
    }
}

impl<T: LuaValue> LuaValue for Option<T> {
    fn to_lua(&self) -> String {
        match self {
            Some(v) => v.to_lua(),
            None => "nil".to_string(),
        }
    }
}

/// Quote a string as a double-quoted Lua literal.
///
/// Backslash, quote and every control or non-ASCII byte are escaped as
/// decimal `\ddd` sequences, so the literal is plain ASCII and cannot
/// terminate early or smuggle a newline into the script.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for b in s.bytes() {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            0x20..=0x7e => out.push(b as char),
            // Three digits so a following digit is never absorbed
            _ => out.push_str(&format!("\\{:03}", b)),
        }
    }
    out.push('"');
    out
}

/// Builder for one generated script.
#[derive(Debug)]
pub struct LuaScript {
    buf: String,
}

impl LuaScript {
    /// Start a script for the named operation.
    pub fn new(op_name: &str) -> Self {
        let mut buf = String::new();
        buf.push_str("-- generated by aseprite-mcp: ");
        buf.push_str(op_name);
        buf.push('\n');
        Self { buf }
    }

    /// Bind a parameter: `local NAME = <value>`.
    pub fn param<V: LuaValue + ?Sized>(&mut self, name: &str, value: &V) -> &mut Self {
        self.buf.push_str("local ");
        self.buf.push_str(name);
        self.buf.push_str(" = ");
        self.buf.push_str(&value.to_lua());
        self.buf.push('\n');
        self
    }

    /// Bind a list parameter: `local NAME = { v1, v2, ... }`, one entry per line.
    pub fn param_list<V: LuaValue>(&mut self, name: &str, values: &[V]) -> &mut Self {
        self.buf.push_str("local ");
        self.buf.push_str(name);
        self.buf.push_str(" = {\n");
        for v in values {
            self.buf.push_str("  ");
            self.buf.push_str(&v.to_lua());
            self.buf.push_str(",\n");
        }
        self.buf.push_str("}\n");
        self
    }

    /// Append a raw chunk of Lua.
    pub fn chunk(&mut self, lua: &str) -> &mut Self {
        self.buf.push('\n');
        self.buf.push_str(lua.trim_matches('\n'));
        self.buf.push('\n');
        self
    }

    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}

/// Binds `spr` to the sprite the engine opened from the command line.
pub const OPEN_SPRITE: &str = r#"
local spr = app.activeSprite
if not spr then
  error("No active sprite")
end
"#;

/// Layer lookup by name, descending into groups.
pub const FIND_LAYER: &str = r#"
local function findLayer(layers, name)
  for _, layer in ipairs(layers) do
    if layer.name == name then
      return layer
    end
    if layer.isGroup then
      local found = findLayer(layer.layers, name)
      if found then
        return found
      end
    end
  end
  return nil
end
"#;

/// Indexed-mode transparency handling.
///
/// An indexed sprite keeps one palette entry as its transparent index. Left
/// at its default of 0 it would turn every pixel drawn with palette index 0
/// into a hole, so the transparent index is moved to a dedicated fully
/// transparent entry appended after the visible colors. Pixels that were
/// transparent under the old index are remapped so they stay transparent.
pub const TRANSPARENCY: &str = r#"
local function blankPixel(s)
  if s.colorMode == ColorMode.INDEXED then
    return s.transparentColor
  end
  return 0
end

local function hasSentinel(s)
  local pal = s.palettes[1]
  local t = s.transparentColor
  return t >= 0 and t < #pal and pal:getColor(t).alpha == 0
end

local function ensureSentinel(s)
  if s.colorMode ~= ColorMode.INDEXED or hasSentinel(s) then
    return
  end
  local pal = s.palettes[1]
  local n = #pal
  if n >= 256 then
    error("Palette is full, cannot reserve a transparent index")
  end
  local old = s.transparentColor
  pal:resize(n + 1)
  pal:setColor(n, Color{ r = 0, g = 0, b = 0, a = 0 })
  for _, cel in ipairs(s.cels) do
    if not cel.layer.isBackground then
      local img = cel.image:clone()
      for it in img:pixels() do
        if it() == old then
          it(n)
        end
      end
      cel.image = img
    end
  end
  s.transparentColor = n
end
"#;

/// Color resolution: requested RGBA → pixel value for the sprite's mode.
///
/// `nearestIndex` mirrors `palette::nearest_palette_index`: squared RGB
/// distance, alpha ignored, fully transparent entries only as a fallback,
/// strict `<` so the lowest index wins ties.
pub const RESOLVE_COLOR: &str = r#"
local function nearestIndexWhere(pal, r, g, b, skip, opaqueOnly)
  local best, bestDist = nil, nil
  for i = 0, #pal - 1 do
    local c = pal:getColor(i)
    if i ~= skip and (c.alpha > 0 or not opaqueOnly) then
      local dr, dg, db = r - c.red, g - c.green, b - c.blue
      local d = dr * dr + dg * dg + db * db
      if bestDist == nil or d < bestDist then
        best, bestDist = i, d
      end
    end
  end
  return best
end

local function nearestIndex(pal, r, g, b, skip)
  return nearestIndexWhere(pal, r, g, b, skip, true)
    or nearestIndexWhere(pal, r, g, b, skip, false)
end

local function exactIndex(pal, c, skip)
  for i = 0, #pal - 1 do
    if i ~= skip then
      local e = pal:getColor(i)
      if e.red == c[1] and e.green == c[2] and e.blue == c[3] and e.alpha == c[4] then
        return i
      end
    end
  end
  return nil
end

local function resolvePixel(s, c, usePalette)
  local pal = s.palettes[1]
  if s.colorMode == ColorMode.INDEXED then
    local skip = s.transparentColor
    local idx = nil
    if not usePalette then
      idx = exactIndex(pal, c, skip)
    end
    idx = idx or nearestIndex(pal, c[1], c[2], c[3], skip)
    if idx == nil then
      error("Palette has no drawable colors")
    end
    return idx
  end
  local r, g, b, a = c[1], c[2], c[3], c[4]
  local idx = usePalette and nearestIndex(pal, r, g, b, -1)
  if idx then
    local e = pal:getColor(idx)
    r, g, b, a = e.red, e.green, e.blue, e.alpha
  end
  if s.colorMode == ColorMode.GRAYSCALE then
    local v = math.floor(0.299 * r + 0.587 * g + 0.114 * b + 0.5)
    return app.pixelColor.graya(v, a)
  end
  return app.pixelColor.rgba(r, g, b, a)
end
"#;

/// Pixel value → canonical `#RRGGBBAA`.
pub const PIXEL_HEX: &str = r##"
local function pixelHex(s, layer, v)
  local r, g, b, a
  if s.colorMode == ColorMode.INDEXED then
    local pal = s.palettes[1]
    if (v == s.transparentColor and not layer.isBackground) or v >= #pal then
      return "#00000000"
    end
    local c = pal:getColor(v)
    r, g, b, a = c.red, c.green, c.blue, c.alpha
  elseif s.colorMode == ColorMode.GRAYSCALE then
    local k = app.pixelColor.grayaV(v)
    r, g, b, a = k, k, k, app.pixelColor.grayaA(v)
  else
    r = app.pixelColor.rgbaR(v)
    g = app.pixelColor.rgbaG(v)
    b = app.pixelColor.rgbaB(v)
    a = app.pixelColor.rgbaA(v)
  end
  return string.format("#%02X%02X%02X%02X", r, g, b, a)
end
"##;

/// JSON string escaping for names printed back to the caller.
pub const JSON_STRING: &str = r#"
local function jsonString(s)
  local escaped = s:gsub('[%c"\\]', function(ch)
    return string.format("\\u%04x", ch:byte())
  end)
  return '"' .. escaped .. '"'
end
"#;

/// Full-canvas cel editing.
///
/// Cels are stored cropped to their content, so drawing works on a fresh
/// canvas-sized image seeded with the existing cel and written back as a new
/// cel at the origin.
pub const CANVAS: &str = r#"
local function targetLayer(s, name)
  local layer = findLayer(s.layers, name)
  if not layer then
    error("Layer not found: " .. name)
  end
  if layer.isGroup then
    error("Cannot draw on a group layer: " .. name)
  end
  return layer
end

local function targetFrame(s, number)
  local frame = s.frames[number]
  if not frame then
    error("Frame not found: " .. number)
  end
  return frame
end

local function canvasImage(s, layer, frame)
  local img = Image(s.spec)
  img:clear(blankPixel(s))
  local cel = layer:cel(frame)
  if cel then
    img:drawImage(cel.image, cel.position)
  end
  return img
end

local function plot(img, x, y, v)
  if x >= 0 and y >= 0 and x < img.width and y < img.height then
    img:drawPixel(x, y, v)
  end
end
"#;

/// Closes a mutating script: persist the sprite where it was opened from.
pub const SAVE_SPRITE: &str = r#"
spr:saveAs(spr.filename)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("Layer 1"), "\"Layer 1\"");
    }

    #[test]
    fn test_quote_escapes_breakouts() {
        assert_eq!(quote(r#"a"b"#), r#""a\"b""#);
        assert_eq!(quote(r"C:\art\x.aseprite"), r#""C:\\art\\x.aseprite""#);
        assert_eq!(quote("x\n]]--"), "\"x\\010]]--\"");
        assert_eq!(quote("\u{0}1"), "\"\\0001\"");
    }

    #[test]
    fn test_quote_non_ascii_is_byte_escaped() {
        // "é" is 0xC3 0xA9 in UTF-8
        assert_eq!(quote("é"), "\"\\195\\169\"");
    }

    #[test]
    fn test_float_literals_always_have_a_fraction() {
        assert_eq!(0.0f64.to_lua(), "0.0");
        assert_eq!(1.0f64.to_lua(), "1.0");
        assert_eq!(0.5f64.to_lua(), "0.5");
        assert_eq!(0.0625f64.to_lua(), "0.0625");
    }

    #[test]
    fn test_color_and_option_literals() {
        assert_eq!(Color::rgba(1, 2, 3, 4).to_lua(), "{ 1, 2, 3, 4 }");
        assert_eq!(None::<u32>.to_lua(), "nil");
        assert_eq!(Some(7u32).to_lua(), "7");
    }

    #[test]
    fn test_builder_layout() {
        let script = LuaScript::new("demo")
            .param("NAME", "fg")
            .param("COUNT", &3u32)
            .param_list("COLORS", &[Color::rgb(255, 0, 0)])
            .chunk("\nprint(NAME)\n")
            .finish();
        assert_eq!(
            script,
            "-- generated by aseprite-mcp: demo\nlocal NAME = \"fg\"\nlocal COUNT = 3\n\
             local COLORS = {\n  { 255, 0, 0, 255 },\n}\n\nprint(NAME)\n"
        );
    }

    #[test]
    fn test_nearest_index_skips_transparent_entries_first() {
        assert!(RESOLVE_COLOR.contains("if i ~= skip and (c.alpha > 0 or not opaqueOnly) then"));
        assert!(RESOLVE_COLOR.contains(
            "return nearestIndexWhere(pal, r, g, b, skip, true)\n    or nearestIndexWhere(pal, r, g, b, skip, false)"
        ));
        // Ties keep the earlier entry, as on the Rust side
        assert!(RESOLVE_COLOR.contains("if bestDist == nil or d < bestDist then"));
    }

    #[test]
    fn test_rgb_palette_snap_takes_entry_alpha() {
        assert!(RESOLVE_COLOR.contains("local idx = usePalette and nearestIndex(pal, r, g, b, -1)"));
        assert!(RESOLVE_COLOR.contains("r, g, b, a = e.red, e.green, e.blue, e.alpha"));
    }
}
