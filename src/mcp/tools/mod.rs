//! MCP tool definitions
//!
//! Each module contributes a tool router; the server combines them. Tools
//! parse their parameters into an [`Operation`](crate::script::Operation)
//! and hand it to the sprite editor under the sprite's lock.

pub mod canvas;
pub mod draw;
pub mod export;
pub mod palette;
pub mod read;
