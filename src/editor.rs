//! Typed sprite editing on top of the engine
//!
//! [`SpriteEditor`] is the glue between callers and the engine: every call
//! validates the operation, renders it, runs it through a [`ProcessClient`],
//! classifies a failure and parses the output. Nothing reaches the engine
//! unless validation passed.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientError, EngineOutput, ProcessClient};
use crate::color::Color;
use crate::error::ValidationError;
use crate::pager;
use crate::script::{self, ColorMode, Operation, Rect, REFUSALS};

/// Default per-call engine timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

static FRAME_NUMBER: OnceLock<regex::Regex> = OnceLock::new();

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The engine declined the request, e.g. deleting the last layer.
    #[error("{refusal}")]
    Refused { refusal: &'static str, diagnostic: String },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Unexpected output from {op}: {output}")]
    UnexpectedOutput { op: &'static str, output: String },
    #[error("Failed to parse engine output: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller can fix this by changing the request.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Refused { .. })
    }
}

/// One pixel read back from a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelInfo {
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

/// A page of a rectangular read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelPage {
    pub pixels: Vec<PixelInfo>,
    /// Empty when this is the last page.
    pub next_cursor: String,
    pub total_pixels: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteInfo {
    pub colors: Vec<Color>,
    /// Index of the transparent entry; `None` outside indexed mode.
    pub transparent_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub visible: bool,
    pub group: bool,
    /// Nesting depth, 0 for top-level layers.
    pub depth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteInfo {
    pub width: u32,
    pub height: u32,
    pub color_mode: ColorMode,
    /// Bottom-to-top, groups followed by their children.
    pub layers: Vec<LayerInfo>,
    pub frame_durations_ms: Vec<u32>,
    pub palette_size: u32,
}

impl SpriteInfo {
    pub fn frame_count(&self) -> usize {
        self.frame_durations_ms.len()
    }
}

/// Runs operations against sprite files on disk.
#[derive(Debug, Clone)]
pub struct SpriteEditor {
    client: ProcessClient,
    timeout: Duration,
    cancel: CancellationToken,
}

impl SpriteEditor {
    pub fn new(client: ProcessClient) -> Self {
        Self { client, timeout: DEFAULT_TIMEOUT, cancel: CancellationToken::new() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Calls made through this editor are killed once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn client(&self) -> &ProcessClient {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate, render and run `op`, returning the engine's stdout.
    ///
    /// `sprite` is ignored for operations that create their file.
    pub async fn run(&self, sprite: &Path, op: &Operation) -> Result<String, Error> {
        Ok(self.execute(sprite, op).await?.stdout)
    }

    async fn execute(&self, sprite: &Path, op: &Operation) -> Result<EngineOutput, Error> {
        let script = script::generate(op)?;
        let target = if op.needs_sprite() { Some(sprite) } else { None };
        log::debug!("{} on {}", op.name(), sprite.display());
        self.client
            .execute(&self.cancel, &script, target, self.timeout)
            .await
            .map_err(classify)
    }

    /// Run a mutating operation and confirm its success marker.
    ///
    /// Returns the marker line. Read operations are rejected with
    /// [`Error::UnexpectedOutput`] since they print no marker.
    pub async fn apply(&self, sprite: &Path, op: &Operation) -> Result<String, Error> {
        let output = self.execute(sprite, op).await?;
        confirm(op, &output)
    }

    pub async fn create_canvas(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        color_mode: ColorMode,
    ) -> Result<(), Error> {
        let op = Operation::CreateCanvas { width, height, color_mode, path: path.to_path_buf() };
        self.apply(path, &op).await.map(|_| ())
    }

    pub async fn add_layer(&self, sprite: &Path, name: &str) -> Result<(), Error> {
        self.apply(sprite, &Operation::AddLayer { name: name.to_string() }).await.map(|_| ())
    }

    /// Fails with [`Error::Refused`] when `name` is the only layer.
    pub async fn delete_layer(&self, sprite: &Path, name: &str) -> Result<(), Error> {
        self.apply(sprite, &Operation::DeleteLayer { name: name.to_string() }).await.map(|_| ())
    }

    /// Append a frame and return its 1-based number.
    pub async fn add_frame(&self, sprite: &Path, duration_ms: u32) -> Result<u32, Error> {
        let op = Operation::AddFrame { duration_ms };
        let line = self.apply(sprite, &op).await?;
        parse_frame_number(&line).ok_or(Error::UnexpectedOutput { op: op.name(), output: line })
    }

    /// Fails with [`Error::Refused`] when `frame` is the only frame.
    pub async fn delete_frame(&self, sprite: &Path, frame: u32) -> Result<(), Error> {
        self.apply(sprite, &Operation::DeleteFrame { frame }).await.map(|_| ())
    }

    pub async fn set_frame_duration(
        &self,
        sprite: &Path,
        frame: u32,
        duration_ms: u32,
    ) -> Result<(), Error> {
        let op = Operation::SetFrameDuration { frame, duration_ms };
        self.apply(sprite, &op).await.map(|_| ())
    }

    pub async fn set_palette(&self, sprite: &Path, colors: &[Color]) -> Result<(), Error> {
        let op = Operation::SetPalette { colors: colors.to_vec() };
        self.apply(sprite, &op).await.map(|_| ())
    }

    pub async fn get_palette(&self, sprite: &Path) -> Result<PaletteInfo, Error> {
        let stdout = self.run(sprite, &Operation::GetPalette).await?;
        Ok(serde_json::from_str(json_line(&stdout))?)
    }

    pub async fn get_sprite_info(&self, sprite: &Path) -> Result<SpriteInfo, Error> {
        let stdout = self.run(sprite, &Operation::GetSpriteInfo).await?;
        Ok(serde_json::from_str(json_line(&stdout))?)
    }

    /// Read pixels `[offset, offset + count)` of the row-major scan of `rect`.
    pub async fn read_pixels(
        &self,
        sprite: &Path,
        layer: &str,
        frame: u32,
        rect: Rect,
        offset: u64,
        count: u64,
    ) -> Result<Vec<PixelInfo>, Error> {
        let op = Operation::GetPixels { layer: layer.to_string(), frame, rect, offset, count };
        let stdout = self.run(sprite, &op).await?;
        let pixels: Vec<PixelInfo> = serde_json::from_str(json_line(&stdout))?;
        if pixels.len() as u64 != count {
            return Err(Error::UnexpectedOutput {
                op: op.name(),
                output: format!("expected {} pixels, got {}", count, pixels.len()),
            });
        }
        Ok(pixels)
    }

    /// Read one page of `rect`, starting at `cursor` (absent or empty for the first page).
    pub async fn get_pixels(
        &self,
        sprite: &Path,
        layer: &str,
        frame: u32,
        rect: Rect,
        cursor: Option<&str>,
        page_size: Option<u64>,
    ) -> Result<PixelPage, Error> {
        let page = pager::plan(&rect, cursor, page_size)?;
        let pixels = self.read_pixels(sprite, layer, frame, rect, page.offset, page.count).await?;
        Ok(PixelPage { pixels, next_cursor: page.next_cursor(), total_pixels: page.total })
    }
}

fn classify(err: ClientError) -> Error {
    if let ClientError::Failed { diagnostic, .. } = &err {
        if let Some(refusal) = find_refusal(diagnostic) {
            return Error::Refused { refusal, diagnostic: diagnostic.clone() };
        }
    }
    Error::Client(err)
}

fn find_refusal(text: &str) -> Option<&'static str> {
    REFUSALS.iter().copied().find(|r| text.contains(r))
}

/// The stdout line carrying `op`'s success marker.
fn confirm(op: &Operation, output: &EngineOutput) -> Result<String, Error> {
    let combined = || {
        let (stdout, stderr) = (output.stdout.trim(), output.stderr.trim());
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{}\n{}", stdout, stderr),
        }
    };
    let unexpected = || Error::UnexpectedOutput { op: op.name(), output: combined() };
    let marker = op.success_marker().ok_or_else(unexpected)?;
    if let Some(line) = output.stdout.lines().find(|l| l.contains(marker)) {
        return Ok(line.trim().to_string());
    }
    // Some engine builds report script errors with a zero exit, on either stream
    let refusal = find_refusal(&output.stdout).or_else(|| find_refusal(&output.stderr));
    if let Some(refusal) = refusal {
        return Err(Error::Refused { refusal, diagnostic: combined() });
    }
    Err(unexpected())
}

/// Last non-empty line of `stdout`, where read scripts print their JSON.
fn json_line(stdout: &str) -> &str {
    stdout.lines().rev().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

fn parse_frame_number(line: &str) -> Option<u32> {
    let re = FRAME_NUMBER.get_or_init(|| {
        regex::Regex::new(r"\(frame (\d+)\)").expect("invalid frame number regex")
    });
    re.captures(line)?.get(1)?.as_str().parse().ok()
}
