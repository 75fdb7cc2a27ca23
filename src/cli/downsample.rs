//! `downsample` command.

use std::path::Path;
use std::process::ExitCode;

use crate::color::parse_color;
use crate::downsample::{downsample_file, DownsampleError};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

pub fn run_downsample(
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    palette: &[String],
) -> ExitCode {
    let mut colors = Vec::with_capacity(palette.len());
    for value in palette {
        match parse_color(value) {
            Ok(c) => colors.push(c),
            Err(e) => {
                eprintln!("Error: invalid palette color '{}': {}", value, e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }
    let palette = if colors.is_empty() { None } else { Some(colors.as_slice()) };

    match downsample_file(input, output, width, height, palette) {
        Ok(_) => {
            println!("Saved {}x{} image to {}", width, height, output.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(DownsampleError::Validation(e)) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
