//! Read-only scripts. These print JSON and never save the sprite.

use super::lua::{LuaScript, CANVAS, FIND_LAYER, JSON_STRING, OPEN_SPRITE, PIXEL_HEX, TRANSPARENCY};
use super::Rect;

/// Pixels `[OFFSET, OFFSET + COUNT)` of the row-major scan of the rectangle.
///
/// Positions outside the cel (or the canvas) are reported as `#00000000`
/// rather than skipped, so the output always has exactly `COUNT` entries.
pub(super) fn get_pixels(layer: &str, frame: u32, rect: &Rect, offset: u64, count: u64) -> String {
    LuaScript::new("get_pixels")
        .param("LAYER", layer)
        .param("FRAME", &frame)
        .param("RX", &rect.x)
        .param("RY", &rect.y)
        .param("RW", &rect.width)
        .param("RH", &rect.height)
        .param("OFFSET", &offset)
        .param("COUNT", &count)
        .chunk(OPEN_SPRITE)
        .chunk(FIND_LAYER)
        .chunk(TRANSPARENCY)
        .chunk(CANVAS)
        .chunk(PIXEL_HEX)
        .chunk(
            r##"
local layer = targetLayer(spr, LAYER)
local frame = targetFrame(spr, FRAME)
local cel = layer:cel(frame)
local out = {}
for i = OFFSET, OFFSET + COUNT - 1 do
  local x = RX + i % RW
  local y = RY + i // RW
  local hex = "#00000000"
  if cel and x >= 0 and y >= 0 and x < spr.width and y < spr.height then
    local ix, iy = x - cel.position.x, y - cel.position.y
    if ix >= 0 and iy >= 0 and ix < cel.image.width and iy < cel.image.height then
      hex = pixelHex(spr, layer, cel.image:getPixel(ix, iy))
    end
  end
  out[#out + 1] = string.format('{"x":%d,"y":%d,"color":"%s"}', x, y, hex)
end
print("[" .. table.concat(out, ",") .. "]")
"##,
        )
        .finish()
}

/// Palette entries in index order, plus the transparent index for indexed sprites.
pub(super) fn get_palette() -> String {
    LuaScript::new("get_palette")
        .chunk(OPEN_SPRITE)
        .chunk(
            r##"
local pal = spr.palettes[1]
local colors = {}
for i = 0, #pal - 1 do
  local c = pal:getColor(i)
  colors[#colors + 1] = string.format('"#%02X%02X%02X%02X"', c.red, c.green, c.blue, c.alpha)
end
local transparent = "null"
if spr.colorMode == ColorMode.INDEXED then
  transparent = tostring(spr.transparentColor)
end
print(string.format('{"colors":[%s],"transparent_index":%s}', table.concat(colors, ","), transparent))
"##,
        )
        .finish()
}

pub(super) fn get_sprite_info() -> String {
    LuaScript::new("get_sprite_info")
        .chunk(OPEN_SPRITE)
        .chunk(JSON_STRING)
        .chunk(
            r#"
local modes = {
  [ColorMode.RGB] = "rgb",
  [ColorMode.INDEXED] = "indexed",
  [ColorMode.GRAYSCALE] = "grayscale",
}
local layers = {}
local function collect(list, depth)
  for _, layer in ipairs(list) do
    layers[#layers + 1] = string.format('{"name":%s,"visible":%s,"group":%s,"depth":%d}',
      jsonString(layer.name), tostring(layer.isVisible), tostring(layer.isGroup), depth)
    if layer.isGroup then
      collect(layer.layers, depth + 1)
    end
  end
end
collect(spr.layers, 0)
local durations = {}
for _, frame in ipairs(spr.frames) do
  durations[#durations + 1] = tostring(math.floor(frame.duration * 1000 + 0.5))
end
print(string.format(
  '{"width":%d,"height":%d,"color_mode":"%s","layers":[%s],"frame_durations_ms":[%s],"palette_size":%d}',
  spr.width, spr.height, modes[spr.colorMode] or "unknown", table.concat(layers, ","),
  table.concat(durations, ","), #spr.palettes[1]))
"#,
        )
        .finish()
}
