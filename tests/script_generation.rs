//! Script generation across the whole operation set.
//!
//! Operations are parsed from their JSON form, the same way the CLI and MCP
//! layers receive them, and every generated script is checked for its
//! header, its success marker and safe quoting of user strings.

use aseprite_mcp::error::ValidationError;
use aseprite_mcp::script::{self, Operation};

/// One JSON operation per line, covering every operation.
const ALL_OPS: &str = r##"
{"op": "create_canvas", "width": 16, "height": 16, "color_mode": "indexed", "path": "a.aseprite"}
{"op": "add_layer", "name": "fg"}
{"op": "delete_layer", "name": "fg"}
{"op": "add_frame"}
{"op": "delete_frame", "frame": 2}
{"op": "set_frame_duration", "frame": 1, "duration_ms": 250}
{"op": "set_palette", "colors": ["#000000", "red", "#00FF0080"]}
{"op": "get_palette"}
{"op": "get_sprite_info"}
{"op": "draw_pixels", "layer": "Layer 1", "frame": 1, "pixels": [{"x": 0, "y": 0, "color": "#FF0000"}]}
{"op": "draw_line", "layer": "Layer 1", "frame": 1, "from": {"x": 0, "y": 0}, "to": {"x": 7, "y": 3}, "color": "blue"}
{"op": "draw_rectangle", "layer": "Layer 1", "frame": 1, "rect": {"x": 1, "y": 1, "width": 4, "height": 3}, "color": "#0F0", "filled": true}
{"op": "draw_circle", "layer": "Layer 1", "frame": 1, "center": {"x": 8, "y": 8}, "radius": 4, "color": "white"}
{"op": "fill_area", "layer": "Layer 1", "frame": 1, "point": {"x": 2, "y": 2}, "color": "#123456", "tolerance": 8}
{"op": "draw_with_dither", "layer": "Layer 1", "frame": 1, "rect": {"x": 0, "y": 0, "width": 8, "height": 8}, "color1": "#FF0000", "color2": "#0000FF", "ratio": 0.25}
{"op": "get_pixels", "layer": "Layer 1", "frame": 1, "rect": {"x": 0, "y": 0, "width": 4, "height": 4}, "offset": 4, "count": 8}
{"op": "export_sprite", "output": "out.png", "frame": 1}
{"op": "export_spritesheet", "output": "sheet.png", "layout": "rows", "include_json": true}
{"op": "flip_sprite", "direction": "horizontal"}
"##;

fn all_ops() -> Vec<Operation> {
    ALL_OPS
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("{}: {}", l, e)))
        .collect()
}

#[test]
fn test_every_operation_generates() {
    let ops = all_ops();
    assert_eq!(ops.len(), 19);
    for op in &ops {
        let lua = script::generate(op).unwrap_or_else(|e| panic!("{}: {}", op.name(), e));
        assert!(
            lua.starts_with(&format!("-- generated by aseprite-mcp: {}\n", op.name())),
            "{} header",
            op.name()
        );
    }
}

#[test]
fn test_mutating_scripts_print_their_marker() {
    for op in all_ops() {
        let lua = script::generate(&op).unwrap();
        match op.success_marker() {
            Some(marker) => assert!(lua.contains(marker), "{} lacks its marker", op.name()),
            // Read operations answer with a single JSON line
            None => assert!(!lua.contains("successfully"), "{} prints a marker", op.name()),
        }
    }
}

#[test]
fn test_operations_round_trip_through_json() {
    for op in all_ops() {
        let json = serde_json::to_string(&op).unwrap();
        let back: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
        assert!(json.contains(&format!("\"op\":\"{}\"", op.name())));
    }
}

#[test]
fn test_hostile_layer_names_stay_quoted() {
    let op = Operation::AddLayer { name: "x\")\nos.execute(\"rm -rf /\")\n--".into() };
    let lua = script::generate(&op).unwrap();
    assert!(!lua.contains("\nos.execute"));
    assert!(lua.contains(r#"x\")\010os.execute(\"rm -rf /\")\010--"#));
}

#[test]
fn test_invalid_operations_produce_no_script() {
    let cases = [
        (
            r#"{"op": "create_canvas", "width": 0, "height": 4, "path": "a.aseprite"}"#,
            "Width and height must be positive",
        ),
        (r#"{"op": "add_layer", "name": "  "}"#, "Layer name must not be empty"),
        (r#"{"op": "set_palette", "colors": []}"#, "at least one color"),
        (
            r##"{"op": "draw_with_dither", "layer": "L", "frame": 1, "rect": {"x": 0, "y": 0, "width": 2, "height": 2}, "color1": "#F00", "color2": "#00F", "pattern": "plaid", "ratio": 0.5}"##,
            "Unknown dither pattern 'plaid'",
        ),
        (
            r#"{"op": "get_pixels", "layer": "L", "frame": 1, "rect": {"x": 0, "y": 0, "width": 2, "height": 2}, "offset": 3, "count": 2}"#,
            "does not fit a region of 4 pixels",
        ),
        (
            r#"{"op": "export_sprite", "output": "out.png", "format": "gif"}"#,
            "does not match the extension",
        ),
        (
            r#"{"op": "export_spritesheet", "output": "s.png", "layout": "spiral"}"#,
            "Unsupported spritesheet layout 'spiral'",
        ),
    ];
    for (json, expected) in cases {
        let op: Operation = serde_json::from_str(json).unwrap();
        let err = script::generate(&op).unwrap_err();
        assert!(err.to_string().contains(expected), "{} gave {}", json, err);
    }
}

#[test]
fn test_transparent_dither_color_rejected() {
    let op: Operation = serde_json::from_str(
        r##"{"op": "draw_with_dither", "layer": "L", "frame": 1, "rect": {"x": 0, "y": 0, "width": 2, "height": 2}, "color1": "transparent", "color2": "#00F", "ratio": 0.5}"##,
    )
    .unwrap();
    assert_eq!(script::generate(&op).unwrap_err(), ValidationError::TransparentDitherColor);
}
