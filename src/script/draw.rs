//! Drawing scripts
//!
//! All shapes are rasterized by the script itself and written straight into
//! a full-canvas image of the target cel, so the pixels that land are exactly
//! the ones computed here rather than whatever a brush tool would produce.
//! Colors are resolved once per script with `resolvePixel`, which handles
//! palette snapping and indexed-mode transparency.

use super::lua::{
    quote, LuaScript, LuaValue, CANVAS, FIND_LAYER, OPEN_SPRITE, RESOLVE_COLOR, SAVE_SPRITE,
    TRANSPARENCY,
};
use super::{PixelWrite, Point, Rect};
use crate::color::Color;
use crate::dither::DitherPattern;

impl LuaValue for PixelWrite {
    /// `{ x, y, { r, g, b, a } }`
    fn to_lua(&self) -> String {
        format!("{{ {}, {}, {} }}", self.x, self.y, self.color.to_lua())
    }
}

/// Open the sprite, locate the target cel and copy it onto a canvas image.
fn begin(name: &str, layer: &str, frame: u32, use_palette: bool) -> LuaScript {
    let mut script = LuaScript::new(name);
    script
        .param("LAYER", layer)
        .param("FRAME", &frame)
        .param("USE_PALETTE", &use_palette);
    script
}

/// Shared body between parameters and the operation-specific drawing.
fn prelude(script: &mut LuaScript) {
    script
        .chunk(OPEN_SPRITE)
        .chunk(FIND_LAYER)
        .chunk(TRANSPARENCY)
        .chunk(RESOLVE_COLOR)
        .chunk(CANVAS)
        .chunk(
            r#"
local layer = targetLayer(spr, LAYER)
local frame = targetFrame(spr, FRAME)
"#,
        );
}

/// Wrap `body` in a transaction that edits `img` and commits it as the cel.
fn commit(script: &mut LuaScript, body: &str, marker: &str) -> String {
    script
        .chunk("app.transaction(function()\n  ensureSentinel(spr)\n  local img = canvasImage(spr, layer, frame)")
        .chunk(body)
        .chunk("  spr:newCel(layer, frame, img, Point(0, 0))\nend)")
        .chunk(SAVE_SPRITE)
        .chunk(&format!("print({})", quote(marker)))
        .finish()
}

pub(super) fn draw_pixels(layer: &str, frame: u32, pixels: &[PixelWrite], use_palette: bool) -> String {
    let mut script = begin("draw_pixels", layer, frame, use_palette);
    script.param_list("PIXELS", pixels);
    prelude(&mut script);
    commit(
        &mut script,
        r#"
  local cache = {}
  for _, p in ipairs(PIXELS) do
    local c = p[3]
    local key = c[1] .. "," .. c[2] .. "," .. c[3] .. "," .. c[4]
    local v = cache[key]
    if v == nil then
      v = resolvePixel(spr, c, USE_PALETTE)
      cache[key] = v
    end
    plot(img, p[1], p[2], v)
  end
"#,
        "Pixels drawn successfully",
    )
}

/// Bresenham line stamped with a square brush of `THICKNESS` pixels.
pub(super) fn draw_line(
    layer: &str,
    frame: u32,
    from: Point,
    to: Point,
    color: Color,
    thickness: u32,
    use_palette: bool,
) -> String {
    let mut script = begin("draw_line", layer, frame, use_palette);
    script
        .param("X0", &from.x)
        .param("Y0", &from.y)
        .param("X1", &to.x)
        .param("Y1", &to.y)
        .param("COLOR", &color)
        .param("THICKNESS", &thickness);
    prelude(&mut script);
    commit(
        &mut script,
        r#"
  local v = resolvePixel(spr, COLOR, USE_PALETTE)
  local lo = -((THICKNESS - 1) // 2)
  local function stamp(x, y)
    for dy = lo, lo + THICKNESS - 1 do
      for dx = lo, lo + THICKNESS - 1 do
        plot(img, x + dx, y + dy, v)
      end
    end
  end
  local x, y = X0, Y0
  local dx, dy = math.abs(X1 - X0), -math.abs(Y1 - Y0)
  local sx = X0 < X1 and 1 or -1
  local sy = Y0 < Y1 and 1 or -1
  local err = dx + dy
  while true do
    stamp(x, y)
    if x == X1 and y == Y1 then
      break
    end
    local e2 = 2 * err
    if e2 >= dy then
      err = err + dy
      x = x + sx
    end
    if e2 <= dx then
      err = err + dx
      y = y + sy
    end
  end
"#,
        "Line drawn successfully",
    )
}

pub(super) fn draw_rectangle(
    layer: &str,
    frame: u32,
    rect: &Rect,
    color: Color,
    filled: bool,
    use_palette: bool,
) -> String {
    let mut script = begin("draw_rectangle", layer, frame, use_palette);
    script
        .param("RX", &rect.x)
        .param("RY", &rect.y)
        .param("RW", &rect.width)
        .param("RH", &rect.height)
        .param("COLOR", &color)
        .param("FILLED", &filled);
    prelude(&mut script);
    commit(
        &mut script,
        r#"
  local v = resolvePixel(spr, COLOR, USE_PALETTE)
  for y = RY, RY + RH - 1 do
    for x = RX, RX + RW - 1 do
      local edge = x == RX or y == RY or x == RX + RW - 1 or y == RY + RH - 1
      if FILLED or edge then
        plot(img, x, y, v)
      end
    end
  end
"#,
        "Rectangle drawn successfully",
    )
}

/// Midpoint circle outline, or a disc of every pixel with `dx² + dy² <= r² + r`.
pub(super) fn draw_circle(
    layer: &str,
    frame: u32,
    center: Point,
    radius: u32,
    color: Color,
    filled: bool,
    use_palette: bool,
) -> String {
    let mut script = begin("draw_circle", layer, frame, use_palette);
    script
        .param("CX", &center.x)
        .param("CY", &center.y)
        .param("RADIUS", &radius)
        .param("COLOR", &color)
        .param("FILLED", &filled);
    prelude(&mut script);
    commit(
        &mut script,
        r#"
  local v = resolvePixel(spr, COLOR, USE_PALETTE)
  local r = RADIUS
  if FILLED then
    for dy = -r, r do
      for dx = -r, r do
        if dx * dx + dy * dy <= r * r + r then
          plot(img, CX + dx, CY + dy, v)
        end
      end
    end
  else
    local x, y, err = r, 0, 1 - r
    while x >= y do
      plot(img, CX + x, CY + y, v)
      plot(img, CX + y, CY + x, v)
      plot(img, CX - y, CY + x, v)
      plot(img, CX - x, CY + y, v)
      plot(img, CX - x, CY - y, v)
      plot(img, CX - y, CY - x, v)
      plot(img, CX + y, CY - x, v)
      plot(img, CX + x, CY - y, v)
      y = y + 1
      if err < 0 then
        err = err + 2 * y + 1
      else
        x = x - 1
        err = err + 2 * (y - x) + 1
      end
    end
  end
"#,
        "Circle drawn successfully",
    )
}

pub(super) fn fill_area(
    layer: &str,
    frame: u32,
    point: Point,
    color: Color,
    tolerance: u8,
    use_palette: bool,
) -> String {
    let mut script = begin("fill_area", layer, frame, use_palette);
    script
        .param("SX", &point.x)
        .param("SY", &point.y)
        .param("COLOR", &color)
        .param("TOLERANCE", &(tolerance as u32));
    prelude(&mut script);
    commit(
        &mut script,
        r#"
  local v = resolvePixel(spr, COLOR, USE_PALETTE)
  local w, h = img.width, img.height
  if SX >= 0 and SY >= 0 and SX < w and SY < h then
    local target = img:getPixel(SX, SY)
    local pc = app.pixelColor
    local function channels(p)
      if spr.colorMode == ColorMode.GRAYSCALE then
        return pc.grayaV(p), pc.grayaV(p), pc.grayaV(p), pc.grayaA(p)
      end
      return pc.rgbaR(p), pc.rgbaG(p), pc.rgbaB(p), pc.rgbaA(p)
    end
    local tr, tg, tb, ta = channels(target)
    local function matches(p)
      if p == target then
        return true
      end
      if TOLERANCE == 0 or spr.colorMode == ColorMode.INDEXED then
        return false
      end
      local r, g, b, a = channels(p)
      return math.abs(r - tr) <= TOLERANCE and math.abs(g - tg) <= TOLERANCE
        and math.abs(b - tb) <= TOLERANCE and math.abs(a - ta) <= TOLERANCE
    end
    local visited = {}
    local stack = { { SX, SY } }
    while #stack > 0 do
      local p = table.remove(stack)
      local x, y = p[1], p[2]
      local key = y * w + x
      if x >= 0 and y >= 0 and x < w and y < h and not visited[key] then
        visited[key] = true
        if matches(img:getPixel(x, y)) then
          img:drawPixel(x, y, v)
          stack[#stack + 1] = { x + 1, y }
          stack[#stack + 1] = { x - 1, y }
          stack[#stack + 1] = { x, y + 1 }
          stack[#stack + 1] = { x, y - 1 }
        end
      end
    end
  end
"#,
        "Area filled successfully",
    )
}

/// Ordered dither between two colors.
///
/// The threshold matrix comes from [`DitherPattern::matrix`], so the engine
/// applies exactly the thresholds this crate computes: a pixel gets `COLOR1`
/// when `RATIO > MATRIX[y mod N][x mod N]`, `COLOR2` otherwise.
pub(super) fn draw_with_dither(
    layer: &str,
    frame: u32,
    rect: &Rect,
    color1: Color,
    color2: Color,
    pattern: DitherPattern,
    ratio: f64,
    use_palette: bool,
) -> String {
    let rows: Vec<MatrixRow> = pattern.matrix().into_iter().map(MatrixRow).collect();
    let mut script = begin("draw_with_dither", layer, frame, use_palette);
    script
        .param("RX", &rect.x)
        .param("RY", &rect.y)
        .param("RW", &rect.width)
        .param("RH", &rect.height)
        .param("COLOR1", &color1)
        .param("COLOR2", &color2)
        .param("PATTERN", pattern.name())
        .param("RATIO", &ratio)
        .param("N", &pattern.size())
        .param_list("MATRIX", &rows);
    prelude(&mut script);
    commit(
        &mut script,
        r#"
  local v1 = resolvePixel(spr, COLOR1, USE_PALETTE)
  local v2 = resolvePixel(spr, COLOR2, USE_PALETTE)
  local x0, y0 = math.max(RX, 0), math.max(RY, 0)
  local x1, y1 = math.min(RX + RW, img.width) - 1, math.min(RY + RH, img.height) - 1
  for y = y0, y1 do
    local row = MATRIX[(y % N) + 1]
    for x = x0, x1 do
      if RATIO > row[(x % N) + 1] then
        img:drawPixel(x, y, v1)
      else
        img:drawPixel(x, y, v2)
      end
    end
  end
"#,
        "Dithering applied successfully",
    )
}

/// One row of a threshold matrix as a Lua table literal.
struct MatrixRow(Vec<f64>);

impl LuaValue for MatrixRow {
    fn to_lua(&self) -> String {
        let cells: Vec<String> = self.0.iter().map(|t| t.to_lua()).collect();
        format!("{{ {} }}", cells.join(", "))
    }
}
