//! Configuration schema types for `aseprite-mcp.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{ProcessClient, DEFAULT_ENGINE};
use crate::editor::SpriteEditor;

/// Longest per-call timeout accepted from configuration.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Engine invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the Aseprite binary; looked up on `PATH` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory for temporary script files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { path: None, timeout_secs: default_timeout_secs(), temp_dir: None }
    }
}

impl EngineConfig {
    pub fn engine_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// Complete `aseprite-mcp.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// A configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Dotted path to the invalid field (e.g., "engine.timeout_secs")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "aseprite-mcp.toml: '{}' {}", self.field, self.message)
    }
}

impl AppConfig {
    /// Validate the configuration and return every problem found
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.engine.timeout_secs == 0 || self.engine.timeout_secs > MAX_TIMEOUT_SECS {
            errors.push(ConfigValidationError {
                field: "engine.timeout_secs".to_string(),
                message: format!("must be between 1 and {}", MAX_TIMEOUT_SECS),
            });
        }

        if self.engine.path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            errors.push(ConfigValidationError {
                field: "engine.path".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        if let Some(dir) = &self.engine.temp_dir {
            if !dir.is_dir() {
                errors.push(ConfigValidationError {
                    field: "engine.temp_dir".to_string(),
                    message: format!("'{}' is not a directory", dir.display()),
                });
            }
        }

        if !LOG_LEVELS.contains(&self.log.level.to_lowercase().as_str()) {
            errors.push(ConfigValidationError {
                field: "log.level".to_string(),
                message: format!("must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn client(&self) -> ProcessClient {
        let client = ProcessClient::new(self.engine.engine_path());
        match &self.engine.temp_dir {
            Some(dir) => client.with_temp_dir(dir),
            None => client,
        }
    }

    pub fn editor(&self) -> SpriteEditor {
        SpriteEditor::new(self.client()).with_timeout(self.engine.timeout())
    }
}
