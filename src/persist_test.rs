use super::*;
use crate::camera::Point;
use crate::doc::{GridConfig, GridType, Stroke, StrokeShape, StrokeTool, TokenDraft, UnitType};

fn sample_doc() -> MapDocument {
    let mut doc = MapDocument::new();
    doc.commit_stroke(Stroke {
        points: vec![0.0, 0.0, 10.5, 20.25],
        color: "#aa0000".into(),
        width: 5.0,
        tool: StrokeTool::Ink,
        shape: StrokeShape::Freehand,
    });
    doc.commit_stroke(Stroke {
        points: vec![0.0, 0.0, 100.0, 100.0],
        color: "#000000".into(),
        width: 40.0,
        tool: StrokeTool::FogShroud,
        shape: StrokeShape::Rectangle,
    });
    doc.add_token(TokenDraft::image("maps/keep.png", Point::new(50.0, 50.0)));
    let mut pin = TokenDraft::pin("entry-9", "Harbor", Point::new(-30.0, 12.0));
    pin.blurb = Some("Smugglers meet here".into());
    pin.rotation = 15.0;
    doc.add_token(pin);
    doc.grid = GridConfig { grid_type: GridType::Hex, scale: 1.5, unit_number: 10, unit_type: UnitType::M };
    doc
}

// =============================================================
// Extract
// =============================================================

#[test]
fn extracts_first_block_body() {
    let text = "# Map\n\nSome prose.\n\n```json:map-data\n  {\"strokes\": []}  \n```\n\nMore prose.";
    assert_eq!(extract_block(text).unwrap(), Some("{\"strokes\": []}"));
}

#[test]
fn missing_block_is_none() {
    assert_eq!(extract_block("just text\n```json\n{}\n```").unwrap(), None);
}

#[test]
fn missing_block_loads_empty_map() {
    let doc = document_from_text("no map here");
    assert_eq!(doc, MapDocument::new());
    assert_eq!(doc.grid, GridConfig::default());
}

#[test]
fn malformed_block_loads_empty_map() {
    let doc = document_from_text("```json:map-data\n{ not json\n```");
    assert_eq!(doc, MapDocument::new());
}

#[test]
fn legacy_lines_block_loads_as_ink() {
    let text = r##"```json:map-data
{
  "lines": [
    { "points": [0, 0, 10, 10], "stroke": "#ff0000", "strokeWidth": 3, "tool": "brush" },
    { "points": [5, 5], "stroke": "#000000", "strokeWidth": 10, "tool": "erase" }
  ]
}
```"##;
    let doc = document_from_text(text);
    assert_eq!(doc.strokes.len(), 2);
    assert_eq!(doc.strokes[0].color, "#ff0000");
    assert_eq!(doc.strokes[0].width, 3.0);
    assert_eq!(doc.strokes[0].tool, StrokeTool::Ink);
    assert_eq!(doc.strokes[0].shape, StrokeShape::Freehand);
    assert_eq!(doc.strokes[1].tool, StrokeTool::Erase);
    assert!(doc.fog_strokes.is_empty());
    assert!(doc.tokens.is_empty());
}

// =============================================================
// Upsert
// =============================================================

#[test]
fn upsert_appends_after_blank_line() {
    let doc = MapDocument::new();
    let out = upsert_block("Notes about the keep.", &doc).unwrap();
    assert!(out.starts_with("Notes about the keep.\n\n```json:map-data\n"));
    assert!(out.ends_with("\n```"));
}

#[test]
fn upsert_replaces_only_first_block() {
    let text = "intro\n```json:map-data\n{\"old\": 1}\n```\nmiddle\n```json:map-data\n{\"second\": 2}\n```\noutro";
    let out = upsert_block(text, &sample_doc()).unwrap();
    assert!(out.starts_with("intro\n```json:map-data\n{"));
    assert!(!out.contains("\"old\""));
    assert!(out.contains("\nmiddle\n```json:map-data\n{\"second\": 2}\n```\noutro"));
    assert_eq!(out.matches("```json:map-data").count(), 2);
}

#[test]
fn upsert_is_idempotent() {
    let doc = sample_doc();
    let once = upsert_block("prose", &doc).unwrap();
    let twice = upsert_block(&once, &doc).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn round_trip_preserves_every_field() {
    let doc = sample_doc();
    let text = upsert_block("# Harbor map\n", &doc).unwrap();
    assert_eq!(document_from_text(&text), doc);
}

#[test]
fn backticks_in_strings_do_not_close_the_fence() {
    let mut doc = sample_doc();
    let mut pin = TokenDraft::pin("entry-3", "The ```Vault```", Point::new(5.0, 5.0));
    pin.blurb = Some("say `hello`".into());
    doc.add_token(pin);

    let once = upsert_block("# Vault\n", &doc).unwrap();
    assert_eq!(once.matches("```").count(), 2);
    assert_eq!(document_from_text(&once), doc);

    let twice = upsert_block(&once, &doc).unwrap();
    assert_eq!(twice, once);
    assert_eq!(twice.matches("```").count(), 2);
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn wire_format_uses_camel_case_and_kebab_values() {
    let json = encode(&sample_doc()).unwrap();
    for needle in [
        "\"fogStrokes\"",
        "\"zOrder\"",
        "\"linkedEntryId\"",
        "\"unitNumber\"",
        "\"unitType\": \"m\"",
        "\"type\": \"hex\"",
        "\"fog-shroud\"",
        "\"rectangle\"",
        "\"kind\": \"pin\"",
    ] {
        assert!(json.contains(needle), "missing {needle} in {json}");
    }
    assert!(!json.contains("\"label\": null"));
}

#[test]
fn decode_rejects_non_object() {
    assert!(matches!(decode("[1, 2, 3]"), Err(PersistError::Json(_))));
}
