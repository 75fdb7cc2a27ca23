//! `script`, `run` and `config` commands.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::AppConfig;
use crate::editor::Error as EditorError;
use crate::script::{self, Operation};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Read an operation from a JSON file, or stdin for `-`.
pub(crate) fn read_operation(source: &Path) -> Result<Operation, String> {
    let text = if source == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| format!("Failed to read '{}': {}", source.display(), e))?
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid operation: {}", e))
}

pub fn run_script(source: &Path) -> ExitCode {
    let op = match read_operation(source) {
        Ok(op) => op,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    match script::generate(&op) {
        Ok(lua) => {
            print!("{}", lua);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
    }
}

pub fn run_op(config: &AppConfig, source: &Path, sprite: Option<&Path>) -> ExitCode {
    let op = match read_operation(source) {
        Ok(op) => op,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let sprite: PathBuf = match (sprite, &op) {
        (Some(p), _) => p.to_path_buf(),
        (None, Operation::CreateCanvas { path, .. }) => path.clone(),
        (None, _) => {
            eprintln!("Error: --sprite is required for {}", op.name());
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create async runtime: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let editor = config.editor();
    let result = runtime.block_on(async {
        if op.success_marker().is_some() {
            editor.apply(&sprite, &op).await
        } else {
            editor.run(&sprite, &op).await
        }
    });

    match result {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            match e {
                EditorError::Validation(_) | EditorError::Refused { .. } => {
                    ExitCode::from(EXIT_INVALID_ARGS)
                }
                _ => ExitCode::from(EXIT_ERROR),
            }
        }
    }
}

pub fn run_config(config: &AppConfig) -> ExitCode {
    match toml::to_string_pretty(config) {
        Ok(text) => {
            print!("{}", text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
