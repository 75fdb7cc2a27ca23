//! CLI integration tests for the `aseprite-mcp` binary.
//!
//! Covers script generation, config resolution, operation parsing errors,
//! running operations against a stand-in engine, and downsampling.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aseprite-mcp"));
    cmd.env_remove("ASEPRITE_PATH").env_remove("ASEPRITE_TIMEOUT_SECS").env("RUST_LOG", "off");
    cmd
}

/// Run the binary and return (stdout, stderr, exit code).
fn run(cmd: &mut Command) -> (String, String, i32) {
    let Output { stdout, stderr, status } = cmd.output().expect("Failed to execute aseprite-mcp");
    (
        String::from_utf8_lossy(&stdout).to_string(),
        String::from_utf8_lossy(&stderr).to_string(),
        status.code().unwrap_or(-1),
    )
}

fn write_op(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("op.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_script_prints_generated_lua() {
    let dir = tempfile::tempdir().unwrap();
    let op = write_op(dir.path(), r#"{"op": "add_layer", "name": "fg"}"#);
    let (stdout, _, code) = run(binary().arg("script").arg(&op));
    assert_eq!(code, 0);
    assert!(stdout.starts_with("-- generated by aseprite-mcp: add_layer\n"));
    assert!(stdout.contains("\"fg\""));
    assert!(stdout.contains("Layer added successfully"));
}

#[test]
fn test_script_rejects_invalid_operation() {
    let dir = tempfile::tempdir().unwrap();

    let op = write_op(dir.path(), r#"{"op": "delete_frame", "frame": 0}"#);
    let (stdout, stderr, code) = run(binary().arg("script").arg(&op));
    assert_eq!(code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Frame number must be at least 1"));

    let op = write_op(dir.path(), r#"{"op": "teleport"}"#);
    let (_, stderr, code) = run(binary().arg("script").arg(&op));
    assert_eq!(code, 2);
    assert!(stderr.contains("Invalid operation"));

    let (_, stderr, code) = run(binary().arg("script").arg(dir.path().join("missing.json")));
    assert_eq!(code, 2);
    assert!(stderr.contains("Failed to read"));
}

#[test]
fn test_config_reflects_file_env_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aseprite-mcp.toml");
    std::fs::write(&config, "[engine]\npath = \"/opt/aseprite\"\ntimeout_secs = 12\n").unwrap();

    let (stdout, _, code) = run(binary().arg("config").arg("--config").arg(&config));
    assert_eq!(code, 0);
    assert!(stdout.contains("path = \"/opt/aseprite\""));
    assert!(stdout.contains("timeout_secs = 12"));

    let (stdout, _, code) =
        run(binary().arg("config").arg("--config").arg(&config).env("ASEPRITE_TIMEOUT_SECS", "20"));
    assert_eq!(code, 0);
    assert!(stdout.contains("timeout_secs = 20"));

    let (stdout, _, code) = run(binary()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .env("ASEPRITE_TIMEOUT_SECS", "20")
        .args(["--timeout", "5", "--engine", "/usr/bin/aseprite"]));
    assert_eq!(code, 0);
    assert!(stdout.contains("timeout_secs = 5"));
    assert!(stdout.contains("path = \"/usr/bin/aseprite\""));
}

#[test]
fn test_invalid_config_exits_with_invalid_args() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aseprite-mcp.toml");
    std::fs::write(&config, "[engine]\ntimeout_secs = 0\n").unwrap();
    let (_, stderr, code) = run(binary().arg("config").arg("--config").arg(&config));
    assert_eq!(code, 2);
    assert!(stderr.contains("timeout_secs"));
}

#[test]
fn test_run_requires_sprite() {
    let dir = tempfile::tempdir().unwrap();
    let op = write_op(dir.path(), r#"{"op": "get_palette"}"#);
    let (_, stderr, code) = run(binary().arg("run").arg(&op));
    assert_eq!(code, 2);
    assert!(stderr.contains("--sprite is required for get_palette"));
}

#[test]
fn test_run_with_missing_engine_fails() {
    let dir = tempfile::tempdir().unwrap();
    let op = write_op(dir.path(), r#"{"op": "add_layer", "name": "fg"}"#);
    let (_, stderr, code) = run(binary()
        .arg("run")
        .arg(&op)
        .args(["--sprite", "a.aseprite", "--engine", "/nonexistent/aseprite"]));
    assert_eq!(code, 1);
    assert!(stderr.contains("Engine not found"));
}

#[cfg(unix)]
#[test]
fn test_run_against_stand_in_engine() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let engine = dir.path().join("fake-aseprite");
    std::fs::write(&engine, "#!/bin/sh\necho 'Canvas created successfully'\n").unwrap();
    std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755)).unwrap();

    let op = write_op(
        dir.path(),
        r#"{"op": "create_canvas", "width": 32, "height": 32, "path": "hero.aseprite"}"#,
    );
    let (stdout, _, code) = run(binary().arg("run").arg(&op).arg("--engine").arg(&engine));
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Canvas created successfully");
}

#[test]
fn test_downsample_command() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ref.png");
    let output = dir.path().join("out.png");
    let mut img = image::RgbaImage::from_pixel(8, 8, image::Rgba([10, 10, 240, 255]));
    for y in 0..4 {
        for x in 0..8 {
            img.put_pixel(x, y, image::Rgba([240, 240, 240, 255]));
        }
    }
    img.save(&input).unwrap();

    let (stdout, _, code) = run(binary()
        .arg("downsample")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--width", "2", "--height", "2", "--palette", "#FFFFFF,#0000FF"]));
    assert_eq!(code, 0);
    assert!(stdout.contains("Saved 2x2 image"));

    let out = image::open(&output).unwrap().to_rgba8();
    assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(out.get_pixel(1, 1).0, [0, 0, 255, 255]);
}

#[test]
fn test_downsample_rejects_bad_palette_color() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run(binary()
        .arg("downsample")
        .arg(dir.path().join("ref.png"))
        .arg("-o")
        .arg(dir.path().join("out.png"))
        .args(["--width", "2", "--height", "2", "--palette", "#GG0000"]));
    assert_eq!(code, 2);
    assert!(stderr.contains("invalid palette color"));
}
