//! aseprite-mcp - scripted sprite editing through Aseprite
//!
//! This library drives Aseprite in batch mode to:
//! - Create sprites and manage their layers, frames and palettes
//! - Draw pixels, lines, rectangles, circles, flood fills and ordered dithers,
//!   optionally snapped to the sprite palette
//! - Read pixels back with cursor pagination and export images and spritesheets
//!
//! Each operation is an [`script::Operation`] rendered into a Lua script by
//! [`script::generate`] and run by [`client::ProcessClient`];
//! [`editor::SpriteEditor`] ties the two together with typed results.

pub mod cli;
pub mod client;
pub mod color;
pub mod config;
pub mod dither;
pub mod downsample;
pub mod editor;
pub mod error;
pub mod locks;
pub mod palette;
pub mod pager;
pub mod script;

#[cfg(feature = "mcp")]
pub mod mcp;
