//! Configuration loading and discovery for `aseprite-mcp.toml`
//!
//! Precedence, lowest first: built-in defaults, the config file, environment
//! variables, command-line flags.

use super::schema::AppConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "aseprite-mcp.toml";

/// Overrides the engine path.
pub const ENV_ENGINE_PATH: &str = "ASEPRITE_PATH";
/// Overrides the per-call timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ASEPRITE_TIMEOUT_SECS";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse aseprite-mcp.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub engine: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Find the config file.
///
/// Search order:
/// 1. Walk up from the current directory looking for `aseprite-mcp.toml`
/// 2. `$XDG_CONFIG_HOME/aseprite-mcp/aseprite-mcp.toml` (or `~/.config/...`)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }
    find_xdg_config()
}

pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("aseprite-mcp").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Walk up from `start` looking for the config file.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load the config file at `path`, or the discovered one, or the defaults.
///
/// The file is parsed but not validated; see [`resolve_config`].
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            let contents = fs::read_to_string(&p)?;
            Ok(toml::from_str(&contents)?)
        }
        None => Ok(AppConfig::default()),
    }
}

/// Apply environment overrides read through `var`.
pub fn apply_env_overrides<F>(config: &mut AppConfig, var: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = var(ENV_ENGINE_PATH).filter(|p| !p.is_empty()) {
        config.engine.path = Some(PathBuf::from(path));
    }
    if let Some(raw) = var(ENV_TIMEOUT_SECS) {
        let secs = raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::Validation(vec![format!(
                "{}: '{}' is not a whole number of seconds",
                ENV_TIMEOUT_SECS, raw
            )])
        })?;
        config.engine.timeout_secs = secs;
    }
    Ok(())
}

/// Merge CLI overrides into a configuration. CLI values take precedence.
pub fn merge_cli_overrides(config: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(ref engine) = overrides.engine {
        config.engine.path = Some(engine.clone());
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.engine.timeout_secs = timeout;
    }
}

/// Load, apply environment and CLI overrides, then validate.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<AppConfig, ConfigError> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, |k| env::var(k).ok())?;
    merge_cli_overrides(&mut config, overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, contents).expect("should write config");
        path
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[engine]\ntimeout_secs = 5\n");
        let subdir = temp.path().join("art").join("sprites");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        assert_eq!(find_config_from(subdir), Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[engine]\ntimeout_secs = 5\n[log]\nlevel = \"warn\"\n");
        let config = load_config(Some(&path)).expect("should load");
        assert_eq!(config.engine.timeout_secs, 5);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[engine\n");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            [(ENV_ENGINE_PATH, "/usr/bin/aseprite"), (ENV_TIMEOUT_SECS, " 12 ")].into();
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.engine.path, Some(PathBuf::from("/usr/bin/aseprite")));
        assert_eq!(config.engine.timeout_secs, 12);

        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, |k| {
            (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string())
        });
        assert!(matches!(err, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = AppConfig::default();
        config.engine.timeout_secs = 5;
        merge_cli_overrides(
            &mut config,
            &CliOverrides { engine: Some(PathBuf::from("./aseprite")), timeout_secs: Some(60) },
        );
        assert_eq!(config.engine.engine_path(), PathBuf::from("./aseprite"));
        assert_eq!(config.engine.timeout_secs, 60);
    }

    #[test]
    #[serial]
    fn test_resolve_reads_process_env() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[engine]\ntimeout_secs = 5\n");
        env::set_var(ENV_TIMEOUT_SECS, "7");
        let resolved = resolve_config(Some(&path), &CliOverrides::default());
        env::remove_var(ENV_TIMEOUT_SECS);
        assert_eq!(resolved.expect("should resolve").engine.timeout_secs, 7);
    }

    #[test]
    #[serial]
    fn test_resolve_rejects_invalid() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[engine]\ntimeout_secs = 0\n");
        let err = resolve_config(Some(&path), &CliOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("engine.timeout_secs"));
    }
}
