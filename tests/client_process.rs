//! ProcessClient lifecycle tests against a fake engine.
//!
//! The fake engine is a small shell script standing in for the Aseprite
//! binary. It receives the same `--batch [sprite] --script <file>` arguments,
//! so these tests cover argument passing, output capture, failure
//! classification, timeouts, cancellation and temp file cleanup without a
//! real engine installed.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use aseprite_mcp::client::{ClientError, ProcessClient};
use aseprite_mcp::editor::{Error as EditorError, SpriteEditor};
use aseprite_mcp::script::LAST_LAYER;
use serial_test::serial;
use tokio_util::sync::CancellationToken;

/// Write an executable `#!/bin/sh` engine with the given body.
fn fake_engine(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-aseprite");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("should write fake engine");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("should make fake engine executable");
    path
}

/// Prints the contents of the `--script` argument.
const CAT_SCRIPT: &str = r#"
while [ $# -gt 0 ]; do
  if [ "$1" = "--script" ]; then
    cat "$2"
  fi
  shift
done
"#;

/// Prints the path of the `--script` argument.
const ECHO_SCRIPT_PATH: &str = r#"
while [ $# -gt 0 ]; do
  if [ "$1" = "--script" ]; then
    echo "$2"
  fi
  shift
done
"#;

fn no_cancel() -> CancellationToken {
    CancellationToken::new()
}

#[tokio::test]
#[serial]
async fn test_script_reaches_engine_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let client = ProcessClient::new(fake_engine(dir.path(), CAT_SCRIPT));
    let script = "print(\"Layer added successfully\")\n";
    let out = client
        .execute(&no_cancel(), script, Some(Path::new("a.aseprite")), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(out.stdout, script);
    assert!(out.stderr.is_empty());
}

#[tokio::test]
#[serial]
async fn test_arguments_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let client = ProcessClient::new(fake_engine(dir.path(), r#"echo "$1|$2|$3""#));
    let out = client
        .execute(&no_cancel(), "", Some(Path::new("hero.aseprite")), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(out.stdout.trim(), "--batch|hero.aseprite|--script");

    let out = client.execute(&no_cancel(), "", None, Duration::from_secs(5)).await.unwrap();
    assert!(out.stdout.starts_with("--batch|--script|"));
}

#[tokio::test]
#[serial]
async fn test_temp_script_removed_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = tempfile::tempdir().unwrap();
    let client =
        ProcessClient::new(fake_engine(dir.path(), ECHO_SCRIPT_PATH)).with_temp_dir(scripts.path());
    let out = client.execute(&no_cancel(), "-- x", None, Duration::from_secs(5)).await.unwrap();
    let script_path = PathBuf::from(out.stdout.trim());
    assert!(script_path.starts_with(scripts.path()));
    assert!(!script_path.exists());
    assert_eq!(std::fs::read_dir(scripts.path()).unwrap().count(), 0);
}

#[tokio::test]
#[serial]
async fn test_nonzero_exit_carries_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = tempfile::tempdir().unwrap();
    let engine = fake_engine(dir.path(), "echo partial\necho 'script.lua:3: boom' >&2\nexit 3");
    let client = ProcessClient::new(engine).with_temp_dir(scripts.path());
    let err = client.execute(&no_cancel(), "", None, Duration::from_secs(5)).await.unwrap_err();
    match err {
        ClientError::Failed { code, diagnostic } => {
            assert_eq!(code, Some(3));
            assert_eq!(diagnostic, "script.lua:3: boom");
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(std::fs::read_dir(scripts.path()).unwrap().count(), 0);
}

#[tokio::test]
#[serial]
async fn test_zero_exit_keeps_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(dir.path(), "echo done\necho 'warning: slow' >&2");
    let client = ProcessClient::new(engine);
    let out = client.execute(&no_cancel(), "", None, Duration::from_secs(5)).await.unwrap();
    assert_eq!(out.stdout.trim(), "done");
    assert_eq!(out.stderr.trim(), "warning: slow");
}

#[tokio::test]
#[serial]
async fn test_timeout_kills_engine() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = tempfile::tempdir().unwrap();
    let client =
        ProcessClient::new(fake_engine(dir.path(), "sleep 10")).with_temp_dir(scripts.path());
    let started = Instant::now();
    let err = client.execute(&no_cancel(), "", None, Duration::from_millis(200)).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(std::fs::read_dir(scripts.path()).unwrap().count(), 0);
}

#[tokio::test]
#[serial]
async fn test_cancellation_kills_engine() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = tempfile::tempdir().unwrap();
    let client =
        ProcessClient::new(fake_engine(dir.path(), "sleep 10")).with_temp_dir(scripts.path());
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });
    let started = Instant::now();
    let err = client.execute(&token, "", None, Duration::from_secs(30)).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(std::fs::read_dir(scripts.path()).unwrap().count(), 0);
}

#[tokio::test]
#[serial]
async fn test_editor_classifies_refusal() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(dir.path(), &format!("echo 'tmp.lua:9: {}' >&2\nexit 1", LAST_LAYER));
    let editor = SpriteEditor::new(ProcessClient::new(engine));
    let err = editor.delete_layer(Path::new("a.aseprite"), "Layer 1").await.unwrap_err();
    assert!(matches!(err, EditorError::Refused { refusal: LAST_LAYER, .. }));
}

#[tokio::test]
#[serial]
async fn test_editor_classifies_refusal_on_stderr_with_zero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(dir.path(), &format!("echo 'tmp.lua:9: {}' >&2", LAST_LAYER));
    let editor = SpriteEditor::new(ProcessClient::new(engine));
    let err = editor.delete_layer(Path::new("a.aseprite"), "Layer 1").await.unwrap_err();
    assert!(matches!(err, EditorError::Refused { refusal: LAST_LAYER, .. }));
}

#[tokio::test]
#[serial]
async fn test_editor_requires_marker() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(dir.path(), "echo 'something else'");
    let editor = SpriteEditor::new(ProcessClient::new(engine));
    let err = editor.add_layer(Path::new("a.aseprite"), "fg").await.unwrap_err();
    assert!(matches!(err, EditorError::UnexpectedOutput { op: "add_layer", .. }));
}

#[tokio::test]
#[serial]
async fn test_editor_parses_frame_number_and_pages() {
    let dir = tempfile::tempdir().unwrap();
    let engine = fake_engine(dir.path(), "echo 'Frame added successfully (frame 4)'");
    let editor = SpriteEditor::new(ProcessClient::new(engine));
    assert_eq!(editor.add_frame(Path::new("a.aseprite"), 120).await.unwrap(), 4);

    // A 2x1 read answered by a canned engine
    let engine = fake_engine(
        dir.path(),
        r##"echo '[{"x":0,"y":0,"color":"#FF0000FF"},{"x":1,"y":0,"color":"#00000000"}]'"##,
    );
    let editor = SpriteEditor::new(ProcessClient::new(engine));
    let page = editor
        .get_pixels(
            Path::new("a.aseprite"),
            "Layer 1",
            1,
            aseprite_mcp::script::Rect::new(0, 0, 2, 1),
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(page.total_pixels, 2);
    assert_eq!(page.pixels.len(), 2);
    assert!(page.next_cursor.is_empty());
    assert!(page.pixels[1].color.is_transparent());
}
