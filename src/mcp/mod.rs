//! MCP (Model Context Protocol) server
//!
//! Exposes every sprite operation as an MCP tool over stdio so AI models can
//! create, draw on, inspect and export Aseprite sprites.
//!
//! Start the server with `aseprite-mcp serve` (feature `mcp`).

mod server;
pub mod tools;

pub use server::{run_server, AsepriteMcpServer};
