//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod downsample;
mod ops;
#[cfg(feature = "mcp")]
mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{resolve_config, AppConfig, CliOverrides};

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Drive Aseprite from scripts and AI agents
#[derive(Parser)]
#[command(name = "aseprite-mcp")]
#[command(about = "Edit Aseprite sprites through generated batch scripts, standalone or as an MCP server")]
#[command(version)]
pub struct Cli {
    /// Config file (default: discover aseprite-mcp.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Aseprite binary (overrides config and ASEPRITE_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Per-call engine timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve MCP over stdin/stdout
    #[cfg(feature = "mcp")]
    Serve,

    /// Print the Lua script generated for an operation
    Script {
        /// Operation as JSON (e.g. {"op": "add_layer", "name": "fg"}); "-" reads stdin
        op: PathBuf,
    },

    /// Run an operation against a sprite and print the engine output
    Run {
        /// Operation as JSON file; "-" reads stdin
        op: PathBuf,

        /// Sprite file to open (not needed for create_canvas)
        #[arg(long, short)]
        sprite: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Shrink a reference image to pixel-art size
    Downsample {
        /// Input image
        input: PathBuf,

        /// Output PNG
        #[arg(long, short)]
        output: PathBuf,

        /// Target width in pixels
        #[arg(long)]
        width: u32,

        /// Target height in pixels
        #[arg(long)]
        height: u32,

        /// Snap to these colors (repeat or comma-separate)
        #[arg(long, value_delimiter = ',')]
        palette: Vec<String>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let overrides = CliOverrides { engine: cli.engine.clone(), timeout_secs: cli.timeout };
    let config = match resolve_config(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    init_logging(&config);

    match cli.command {
        #[cfg(feature = "mcp")]
        Commands::Serve => serve::run_serve(&config),
        Commands::Script { op } => ops::run_script(&op),
        Commands::Run { op, sprite } => ops::run_op(&config, &op, sprite.as_deref()),
        Commands::Config => ops::run_config(&config),
        Commands::Downsample { input, output, width, height, palette } => {
            downsample::run_downsample(&input, &output, width, height, &palette)
        }
    }
}

/// Log to stderr; stdout carries command output and MCP traffic.
fn init_logging(config: &AppConfig) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log.level.as_str()),
    )
    .target(env_logger::Target::Stderr)
    .try_init();
}
