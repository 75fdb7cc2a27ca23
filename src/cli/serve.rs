//! `serve`: MCP over stdio.

use std::process::ExitCode;

use crate::config::AppConfig;

use super::{EXIT_ERROR, EXIT_SUCCESS};

pub fn run_serve(config: &AppConfig) -> ExitCode {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create async runtime: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match rt.block_on(crate::mcp::run_server(config.editor())) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: MCP server failed: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
