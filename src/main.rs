//! aseprite-mcp - command-line and MCP front end for scripted Aseprite editing

use std::process::ExitCode;

use aseprite_mcp::cli;

fn main() -> ExitCode {
    cli::run()
}
