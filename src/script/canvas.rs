//! Canvas, layer, frame and palette scripts.

use std::path::Path;

use super::lua::{
    LuaScript, FIND_LAYER, OPEN_SPRITE, RESOLVE_COLOR, SAVE_SPRITE, TRANSPARENCY,
};
use super::{ColorMode, FlipDirection, LAST_FRAME, LAST_LAYER, PALETTE_TOO_LARGE};
use crate::color::Color;

pub(super) fn create_canvas(width: u32, height: u32, mode: ColorMode, path: &Path) -> String {
    LuaScript::new("create_canvas")
        .param("WIDTH", &width)
        .param("HEIGHT", &height)
        .param("PATH", path)
        .chunk(TRANSPARENCY)
        .chunk(&format!("local spr = Sprite(WIDTH, HEIGHT, {})", mode.engine_name()))
        .chunk(
            r#"
if spr.colorMode == ColorMode.INDEXED then
  -- Keep room for the transparent entry after the default colors
  local pal = spr.palettes[1]
  if #pal >= 256 then
    pal:resize(255)
  end
  ensureSentinel(spr)
end
spr:saveAs(PATH)
spr:close()
print("Canvas created successfully")
"#,
        )
        .finish()
}

pub(super) fn add_layer(name: &str) -> String {
    LuaScript::new("add_layer")
        .param("NAME", name)
        .chunk(OPEN_SPRITE)
        .chunk(
            r#"
app.transaction(function()
  local layer = spr:newLayer()
  layer.name = NAME
end)
"#,
        )
        .chunk(SAVE_SPRITE)
        .chunk(r#"print("Layer added successfully")"#)
        .finish()
}

pub(super) fn delete_layer(name: &str) -> String {
    LuaScript::new("delete_layer")
        .param("NAME", name)
        .param("LAST_LAYER", LAST_LAYER)
        .chunk(OPEN_SPRITE)
        .chunk(FIND_LAYER)
        .chunk(
            r#"
local function countLayers(layers)
  local n = 0
  for _, l in ipairs(layers) do
    if l.isGroup then
      n = n + countLayers(l.layers)
    else
      n = n + 1
    end
  end
  return n
end

local layer = findLayer(spr.layers, NAME)
if not layer then
  error("Layer not found: " .. NAME)
end
-- Groups take their drawable children with them
local removed = 1
if layer.isGroup then
  removed = countLayers(layer.layers)
end
if countLayers(spr.layers) - removed < 1 then
  error(LAST_LAYER)
end
app.transaction(function()
  spr:deleteLayer(layer)
end)
"#,
        )
        .chunk(SAVE_SPRITE)
        .chunk(r#"print("Layer deleted successfully")"#)
        .finish()
}

pub(super) fn add_frame(duration_ms: u32) -> String {
    LuaScript::new("add_frame")
        .param("DURATION_MS", &duration_ms)
        .chunk(OPEN_SPRITE)
        .chunk(
            r#"
local frame
app.transaction(function()
  frame = spr:newEmptyFrame(#spr.frames + 1)
  frame.duration = DURATION_MS / 1000
end)
"#,
        )
        .chunk(SAVE_SPRITE)
        .chunk(r#"print("Frame added successfully (frame " .. frame.frameNumber .. ")")"#)
        .finish()
}

pub(super) fn delete_frame(frame: u32) -> String {
    LuaScript::new("delete_frame")
        .param("FRAME", &frame)
        .param("LAST_FRAME", LAST_FRAME)
        .chunk(OPEN_SPRITE)
        .chunk(
            r#"
if #spr.frames <= 1 then
  error(LAST_FRAME)
end
local frame = spr.frames[FRAME]
if not frame then
  error("Frame not found: " .. FRAME)
end
app.transaction(function()
  spr:deleteFrame(frame)
end)
"#,
        )
        .chunk(SAVE_SPRITE)
        .chunk(r#"print("Frame deleted successfully")"#)
        .finish()
}

pub(super) fn set_frame_duration(frame: u32, duration_ms: u32) -> String {
    LuaScript::new("set_frame_duration")
        .param("FRAME", &frame)
        .param("DURATION_MS", &duration_ms)
        .chunk(OPEN_SPRITE)
        .chunk(
            r#"
local frame = spr.frames[FRAME]
if not frame then
  error("Frame not found: " .. FRAME)
end
app.transaction(function()
  frame.duration = DURATION_MS / 1000
end)
"#,
        )
        .chunk(SAVE_SPRITE)
        .chunk(r#"print("Frame duration set successfully")"#)
        .finish()
}

/// Replace the palette in one transaction.
///
/// Indexed sprites get the transparent entry appended after `colors`. Pixels
/// that were transparent stay transparent, and opaque pixels whose index no
/// longer fits the new palette move to the nearest new color.
pub(super) fn set_palette(colors: &[Color]) -> String {
    LuaScript::new("set_palette")
        .param_list("COLORS", colors)
        .param("PALETTE_TOO_LARGE", PALETTE_TOO_LARGE)
        .chunk(OPEN_SPRITE)
        .chunk(RESOLVE_COLOR)
        .chunk(
            r#"
local indexed = spr.colorMode == ColorMode.INDEXED
if indexed and #COLORS >= 256 then
  error(PALETTE_TOO_LARGE)
end

local function remapCels(old, oldTransparent, pal, sentinel)
  local oldColors = {}
  for i = 0, #old - 1 do
    local c = old:getColor(i)
    oldColors[i] = { c.red, c.green, c.blue }
  end
  local caches = { [true] = {}, [false] = {} }
  local function target(v, background)
    if v == oldTransparent and not background then
      return sentinel
    end
    if v < sentinel then
      return v
    end
    local cache = caches[background]
    if cache[v] == nil then
      local c = oldColors[v]
      if c then
        cache[v] = nearestIndex(pal, c[1], c[2], c[3], sentinel)
      elseif background then
        cache[v] = 0
      else
        cache[v] = sentinel
      end
    end
    return cache[v]
  end
  for _, cel in ipairs(spr.cels) do
    local background = cel.layer.isBackground
    local img = cel.image:clone()
    local changed = false
    for it in img:pixels() do
      local v = it()
      local t = target(v, background)
      if t ~= v then
        it(t)
        changed = true
      end
    end
    if changed then
      cel.image = img
    end
  end
end

app.transaction(function()
  local size = #COLORS
  if indexed then
    size = size + 1
  end
  local pal = Palette(size)
  for i, c in ipairs(COLORS) do
    pal:setColor(i - 1, Color{ r = c[1], g = c[2], b = c[3], a = c[4] })
  end
  if indexed then
    local sentinel = #COLORS
    pal:setColor(sentinel, Color{ r = 0, g = 0, b = 0, a = 0 })
    remapCels(spr.palettes[1], spr.transparentColor, pal, sentinel)
    spr:setPalette(pal)
    spr.transparentColor = sentinel
  else
    spr:setPalette(pal)
  end
end)
"#,
        )
        .chunk(SAVE_SPRITE)
        .chunk(r#"print("Palette set successfully")"#)
        .finish()
}

pub(super) fn flip_sprite(direction: FlipDirection) -> String {
    let orientation = match direction {
        FlipDirection::Horizontal => "horizontal",
        FlipDirection::Vertical => "vertical",
    };
    LuaScript::new("flip_sprite")
        .param("ORIENTATION", orientation)
        .chunk(OPEN_SPRITE)
        .chunk(
            r#"
app.transaction(function()
  app.command.Flip{ target = "canvas", orientation = ORIENTATION }
end)
"#,
        )
        .chunk(SAVE_SPRITE)
        .chunk(r#"print("Sprite flipped successfully")"#)
        .finish()
}
