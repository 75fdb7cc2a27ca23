//! Engine subprocess execution
//!
//! [`ProcessClient`] runs one generated script per call:
//!
//! 1. the script is written to a fresh temporary `.lua` file,
//! 2. the engine is started as `<engine> --batch [sprite] --script <file>`,
//! 3. the call waits for exit, the timeout, or cancellation, whichever is first.
//!
//! The child is spawned with `kill_on_drop`, so a timeout, a cancelled token
//! or a dropped future all terminate the engine. The temporary file is owned
//! by the call and removed when it returns, on every path.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Engine binary looked up on `PATH` when none is configured.
pub const DEFAULT_ENGINE: &str = "aseprite";

/// Failure to run a script to a successful exit.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Engine not found at '{}'", .0.display())]
    EngineNotFound(PathBuf),
    #[error("Failed to start engine: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Failed to write script file: {0}")]
    ScriptFile(#[source] std::io::Error),
    #[error("I/O error while waiting for engine: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine timed out after {0:?}")]
    Timeout(Duration),
    #[error("Engine call cancelled")]
    Cancelled,
    /// Non-zero exit. `code` is `None` when the engine was killed by a signal.
    #[error("Engine failed ({}): {diagnostic}", code.map_or("signal".to_string(), |c| format!("exit code {}", c)))]
    Failed { code: Option<i32>, diagnostic: String },
}

/// What a successful engine run printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// Captured verbatim.
    pub stdout: String,
    /// Warnings and script errors that did not change the exit code.
    pub stderr: String,
}

/// Runs scripts against the external engine. Holds no per-call state.
#[derive(Debug, Clone)]
pub struct ProcessClient {
    engine: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl Default for ProcessClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl ProcessClient {
    pub fn new(engine: impl Into<PathBuf>) -> Self {
        Self { engine: engine.into(), temp_dir: None }
    }

    /// Create script files under `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn engine(&self) -> &Path {
        &self.engine
    }

    /// Run `script`, optionally against the sprite at `sprite`.
    ///
    /// Returns the engine's stdout and stderr verbatim on a zero exit.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Timeout`] / [`ClientError::Cancelled`]: the engine was
    ///   killed and its partial output discarded.
    /// - [`ClientError::Failed`]: non-zero exit, with stderr (or stdout when
    ///   stderr is empty) as the diagnostic.
    /// - [`ClientError::EngineNotFound`]: the engine binary does not exist.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        script: &str,
        sprite: Option<&Path>,
        timeout: Duration,
    ) -> Result<EngineOutput, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        // Removed when dropped at the end of this call
        let script_file = self.write_script(script)?;

        log::debug!(
            "running {} (sprite: {}, script: {} bytes)",
            self.engine.display(),
            sprite.map_or_else(|| "-".to_string(), |p| p.display().to_string()),
            script.len()
        );

        let child = Command::new(&self.engine)
            .args(command_args(sprite, script_file.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ClientError::EngineNotFound(self.engine.clone()),
                _ => ClientError::Spawn(e),
            })?;

        let started = Instant::now();
        let output = tokio::select! {
            result = tokio::time::timeout(timeout, child.wait_with_output()) => match result {
                Ok(output) => output?,
                Err(_) => {
                    log::warn!("engine timed out after {:?}, killed", timeout);
                    return Err(ClientError::Timeout(timeout));
                }
            },
            _ = cancel.cancelled() => {
                log::warn!("engine call cancelled after {:?}, killed", started.elapsed());
                return Err(ClientError::Cancelled);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if output.status.success() {
            log::debug!("engine finished in {:?}", started.elapsed());
            return Ok(EngineOutput { stdout, stderr });
        }

        let diagnostic = diagnostic(&stderr, &stdout);
        log::debug!("engine exited with {}: {}", output.status, diagnostic);
        Err(ClientError::Failed { code: output.status.code(), diagnostic })
    }

    fn write_script(&self, script: &str) -> Result<tempfile::NamedTempFile, ClientError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("aseprite-mcp-").suffix(".lua");
        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(ClientError::ScriptFile)?;
        file.write_all(script.as_bytes()).map_err(ClientError::ScriptFile)?;
        file.flush().map_err(ClientError::ScriptFile)?;
        Ok(file)
    }
}

/// `--batch [sprite] --script <file>`
fn command_args(sprite: Option<&Path>, script: &Path) -> Vec<OsString> {
    let mut args = vec![OsString::from("--batch")];
    if let Some(sprite) = sprite {
        args.push(sprite.as_os_str().to_owned());
    }
    args.push(OsString::from("--script"));
    args.push(script.as_os_str().to_owned());
    args
}

fn diagnostic(stderr: &str, stdout: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_with_sprite() {
        let args = command_args(Some(Path::new("a.aseprite")), Path::new("/tmp/s.lua"));
        assert_eq!(args, vec!["--batch", "a.aseprite", "--script", "/tmp/s.lua"]);
    }

    #[test]
    fn test_args_without_sprite() {
        let args = command_args(None, Path::new("s.lua"));
        assert_eq!(args, vec!["--batch", "--script", "s.lua"]);
    }

    #[test]
    fn test_diagnostic_prefers_stderr() {
        assert_eq!(diagnostic("  boom\n", "out"), "boom");
        assert_eq!(diagnostic("\n", "only stdout\n"), "only stdout");
    }

    #[test]
    fn test_failed_display() {
        let err = ClientError::Failed { code: Some(1), diagnostic: "bad".into() };
        assert_eq!(err.to_string(), "Engine failed (exit code 1): bad");
        let err = ClientError::Failed { code: None, diagnostic: "killed".into() };
        assert_eq!(err.to_string(), "Engine failed (signal): killed");
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let client = ProcessClient::new("/definitely/not/here");
        let err = client.execute(&token, "print(1)", None, Duration::from_secs(1)).await;
        assert!(matches!(err, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn test_missing_engine() {
        let client = ProcessClient::new("/definitely/not/here/aseprite");
        let err = client
            .execute(&CancellationToken::new(), "print(1)", None, Duration::from_secs(1))
            .await;
        assert!(matches!(err, Err(ClientError::EngineNotFound(_))));
    }
}
