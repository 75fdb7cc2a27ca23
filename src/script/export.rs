//! Export scripts and the formats/layouts they accept.

use std::path::{Path, PathBuf};

use super::lua::{LuaScript, OPEN_SPRITE, TRANSPARENCY};
use crate::error::ValidationError;

/// Output file formats the engine can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Gif,
    Jpeg,
    Bmp,
    Webp,
    Aseprite,
}

impl ExportFormat {
    pub const NAMES: &'static [&'static str] = &["png", "gif", "jpg", "bmp", "webp", "aseprite"];

    pub fn from_str(s: &str) -> Option<ExportFormat> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "gif" => Some(ExportFormat::Gif),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "bmp" => Some(ExportFormat::Bmp),
            "webp" => Some(ExportFormat::Webp),
            "aseprite" | "ase" => Some(ExportFormat::Aseprite),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Gif => "gif",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
            ExportFormat::Webp => "webp",
            ExportFormat::Aseprite => "aseprite",
        }
    }

    /// Work out the format from the output path and an optional explicit name.
    ///
    /// The engine chooses the encoder from the file extension, so an explicit
    /// format must agree with the extension when both are present. A path
    /// without an extension takes the explicit format's extension.
    pub fn resolve(output: &Path, explicit: Option<&str>) -> Result<ExportFormat, ValidationError> {
        let explicit = match explicit {
            Some(name) => Some(
                ExportFormat::from_str(name)
                    .ok_or_else(|| ValidationError::UnsupportedFormat(name.to_string()))?,
            ),
            None => None,
        };
        let from_ext = output.extension().and_then(|e| e.to_str());

        match (from_ext, explicit) {
            (Some(ext), explicit) => {
                let format = ExportFormat::from_str(ext)
                    .ok_or_else(|| ValidationError::UnsupportedFormat(ext.to_string()))?;
                match explicit {
                    Some(e) if e != format => Err(ValidationError::FormatMismatch {
                        format: e.extension().to_string(),
                        path: output.display().to_string(),
                    }),
                    _ => Ok(format),
                }
            }
            (None, Some(format)) => Ok(format),
            (None, None) => Err(ValidationError::UnsupportedFormat(String::new())),
        }
    }

    /// `output` with this format's extension if it has none.
    pub fn output_path(&self, output: &Path) -> PathBuf {
        if output.extension().is_some() {
            output.to_path_buf()
        } else {
            output.with_extension(self.extension())
        }
    }
}

/// Sprite sheet arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayout {
    Horizontal,
    Vertical,
    Rows,
    Columns,
    Packed,
}

impl SheetLayout {
    pub const NAMES: &'static [&'static str] = &["horizontal", "vertical", "rows", "columns", "packed"];

    pub fn from_str(s: &str) -> Option<SheetLayout> {
        match s.to_lowercase().as_str() {
            "horizontal" => Some(SheetLayout::Horizontal),
            "vertical" => Some(SheetLayout::Vertical),
            "rows" | "by_rows" => Some(SheetLayout::Rows),
            "columns" | "by_columns" => Some(SheetLayout::Columns),
            "packed" => Some(SheetLayout::Packed),
            _ => None,
        }
    }

    fn engine_name(&self) -> &'static str {
        match self {
            SheetLayout::Horizontal => "SpriteSheetType.HORIZONTAL",
            SheetLayout::Vertical => "SpriteSheetType.VERTICAL",
            SheetLayout::Rows => "SpriteSheetType.ROWS",
            SheetLayout::Columns => "SpriteSheetType.COLUMNS",
            SheetLayout::Packed => "SpriteSheetType.PACKED",
        }
    }
}

/// Export one frame as a flattened image, or every frame with `frame = 0`.
///
/// Single frames are composited here: each visible layer, recursing into
/// visible groups, is drawn bottom-to-top onto a blank canvas with its cel
/// and layer opacity and blend mode. The result goes into a fresh sprite of
/// the same spec, which for indexed sprites receives the source palette so
/// the output is not written against an empty default palette.
pub(super) fn export_sprite(output: &Path, frame: u32) -> String {
    LuaScript::new("export_sprite")
        .param("OUTPUT", output)
        .param("FRAME", &frame)
        .chunk(OPEN_SPRITE)
        .chunk(TRANSPARENCY)
        .chunk(
            r#"
if FRAME == 0 then
  spr:saveCopyAs(OUTPUT)
else
  local frame = spr.frames[FRAME]
  if not frame then
    error("Frame not found: " .. FRAME)
  end
  local img = Image(spr.spec)
  img:clear(blankPixel(spr))
  local function composite(layers)
    for _, layer in ipairs(layers) do
      if layer.isVisible then
        if layer.isGroup then
          composite(layer.layers)
        else
          local cel = layer:cel(frame)
          if cel then
            local opacity = (cel.opacity * layer.opacity) // 255
            img:drawImage(cel.image, cel.position, opacity, layer.blendMode)
          end
        end
      end
    end
  end
  composite(spr.layers)
  local out = Sprite(spr.spec)
  if spr.colorMode == ColorMode.INDEXED then
    out:setPalette(spr.palettes[1])
    out.transparentColor = spr.transparentColor
  end
  out:newCel(out.layers[1], out.frames[1], img, Point(0, 0))
  out:saveAs(OUTPUT)
  out:close()
end
print("Exported successfully")
"#,
        )
        .finish()
}

pub(super) fn export_spritesheet(
    output: &Path,
    layout: SheetLayout,
    padding: u32,
    include_json: bool,
) -> String {
    let data = if include_json { Some(output.with_extension("json")) } else { None };
    LuaScript::new("export_spritesheet")
        .param("OUTPUT", output)
        .param("DATA", &data.as_deref().map(|p| p.to_string_lossy().into_owned()))
        .param("PADDING", &padding)
        .chunk(OPEN_SPRITE)
        .chunk(&format!("local SHEET_TYPE = {}", layout.engine_name()))
        .chunk(
            r#"
app.command.ExportSpriteSheet{
  ui = false,
  askOverwrite = false,
  type = SHEET_TYPE,
  textureFilename = OUTPUT,
  dataFilename = DATA or "",
  dataFormat = SpriteSheetDataFormat.JSON_ARRAY,
  shapePadding = PADDING,
  splitLayers = false,
  listLayers = true,
  listTags = true,
}
print("Spritesheet exported successfully")
"#,
        )
        .finish()
}
