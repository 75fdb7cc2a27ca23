//! Configuration for the engine client and logging
//!
//! Provides types and loading for `aseprite-mcp.toml`.

pub mod loader;
pub mod schema;

pub use loader::{resolve_config, CliOverrides, ConfigError};
pub use schema::*;
