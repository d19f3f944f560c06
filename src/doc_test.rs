#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use serde_json::json;

use super::*;

fn stroke(tool: StrokeTool) -> Stroke {
    Stroke {
        points: vec![0.0, 0.0, 10.0, 10.0],
        color: "#000000".into(),
        width: 5.0,
        tool,
        shape: StrokeShape::Freehand,
    }
}

fn image_at(doc: &mut MapDocument, x: f64, y: f64, z: Option<i64>) -> Token {
    let mut draft = TokenDraft::image("tokens/goblin.png", Point::new(x, y));
    draft.z_order = z;
    doc.add_token(draft)
}

// =============================================================
// Stroke
// =============================================================

#[test]
fn stroke_iter_points_pairs_coordinates() {
    let s = Stroke { points: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], ..stroke(StrokeTool::Ink) };
    let pts: Vec<Point> = s.iter_points().collect();
    assert_eq!(pts, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)]);
    assert_eq!(s.point_count(), 3);
}

#[test]
fn stroke_rect_only_for_rectangles() {
    let mut s = stroke(StrokeTool::FogReveal);
    assert!(s.rect().is_none());
    s.shape = StrokeShape::Rectangle;
    s.points = vec![10.0, 10.0, 0.0, 5.0];
    assert_eq!(s.rect(), Some(Rect::new(0.0, 5.0, 10.0, 5.0)));
}

#[test]
fn stroke_filled_rectangles() {
    let mut s = stroke(StrokeTool::Ink);
    s.shape = StrokeShape::Rectangle;
    assert!(!s.is_filled());
    for tool in [StrokeTool::Erase, StrokeTool::FogReveal, StrokeTool::FogShroud] {
        s.tool = tool;
        assert!(s.is_filled());
    }
}

#[test]
fn stroke_tool_fog_classification() {
    assert!(!StrokeTool::Ink.is_fog());
    assert!(!StrokeTool::Erase.is_fog());
    assert!(StrokeTool::FogReveal.is_fog());
    assert!(StrokeTool::FogShroud.is_fog());
}

#[test]
fn stroke_serializes_kebab_case_tool() {
    let s = Stroke { shape: StrokeShape::Rectangle, ..stroke(StrokeTool::FogReveal) };
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["tool"], "fog-reveal");
    assert_eq!(v["shape"], "rectangle");
    assert_eq!(v["width"], 5.0);
}

#[test]
fn legacy_line_record_deserializes_as_ink() {
    let v = json!({ "points": [1, 2, 3, 4], "stroke": "#dc2626", "strokeWidth": 7, "tool": "brush" });
    let s: Stroke = serde_json::from_value(v).unwrap();
    assert_eq!(s.tool, StrokeTool::Ink);
    assert_eq!(s.shape, StrokeShape::Freehand);
    assert_eq!(s.color, "#dc2626");
    assert_eq!(s.width, 7.0);
}

#[test]
fn legacy_erase_record_keeps_erase() {
    let v = json!({ "points": [1, 2], "stroke": "#000000", "strokeWidth": 10, "tool": "erase" });
    let s: Stroke = serde_json::from_value(v).unwrap();
    assert_eq!(s.tool, StrokeTool::Erase);
}

// =============================================================
// ZLayer
// =============================================================

#[test]
fn zlayer_of_maps_bucket_bounds() {
    assert_eq!(ZLayer::of(0), Some(ZLayer::Base));
    assert_eq!(ZLayer::of(9), Some(ZLayer::Base));
    assert_eq!(ZLayer::of(10), Some(ZLayer::Surface));
    assert_eq!(ZLayer::of(30), Some(ZLayer::Objects));
    assert_eq!(ZLayer::of(79), Some(ZLayer::Markers));
    assert_eq!(ZLayer::of(85), None);
    assert_eq!(ZLayer::of(90), Some(ZLayer::Fog));
    assert_eq!(ZLayer::of(100), Some(ZLayer::Interface));
    assert_eq!(ZLayer::of(101), None);
}

#[test]
fn zlayer_default_z_by_kind() {
    assert_eq!(ZLayer::of(ZLayer::default_z(TokenKind::Image)), Some(ZLayer::Objects));
    assert_eq!(ZLayer::of(ZLayer::default_z(TokenKind::Pin)), Some(ZLayer::Markers));
}

// =============================================================
// Tokens
// =============================================================

#[test]
fn add_image_token_defaults() {
    let mut doc = MapDocument::new();
    let t = doc.add_token(TokenDraft::image("a.png", Point::new(200.0, 100.0)));
    assert_eq!(t.kind, TokenKind::Image);
    assert_eq!(t.z_order, 30);
    assert_eq!((t.width, t.height), (100.0, 100.0));
    assert_eq!(t.center(), Point::new(200.0, 100.0));
    assert_eq!(t.src.as_deref(), Some("a.png"));
    assert_eq!(doc.tokens.len(), 1);
}

#[test]
fn add_pin_token_defaults() {
    let mut doc = MapDocument::new();
    let t = doc.add_token(TokenDraft::pin("entry-7", "Old Mill", Point::new(0.0, 0.0)));
    assert_eq!(t.kind, TokenKind::Pin);
    assert_eq!(t.z_order, 60);
    assert_eq!((t.width, t.height), (20.0, 20.0));
    assert_eq!(t.linked_entry_id.as_deref(), Some("entry-7"));
    assert_eq!(t.label.as_deref(), Some("Old Mill"));
    assert_eq!(t.color.as_deref(), Some("#ef4444"));
}

#[test]
fn token_ids_are_pairwise_distinct() {
    let mut doc = MapDocument::new();
    for i in 0..500 {
        image_at(&mut doc, f64::from(i), 0.0, None);
    }
    let ids: HashSet<TokenId> = doc.tokens.iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 500);
}

#[test]
fn update_token_applies_only_present_fields() {
    let mut doc = MapDocument::new();
    let t = image_at(&mut doc, 50.0, 50.0, None);
    assert!(doc.update_token(&t.id, &TokenPatch::position(7.0, 8.0)));
    let after = doc.token(&t.id).unwrap();
    assert_eq!((after.x, after.y), (7.0, 8.0));
    assert_eq!((after.width, after.height, after.rotation), (t.width, t.height, t.rotation));
}

#[test]
fn update_token_missing_id_is_noop() {
    let mut doc = MapDocument::new();
    image_at(&mut doc, 0.0, 0.0, None);
    let before = doc.clone();
    assert!(!doc.update_token(&Uuid::new_v4(), &TokenPatch::position(1.0, 1.0)));
    assert_eq!(doc, before);
}

#[test]
fn update_token_sets_pin_color() {
    let mut doc = MapDocument::new();
    let t = doc.add_token(TokenDraft::pin("e", "E", Point::new(0.0, 0.0)));
    let patch = TokenPatch { color: Some("#3b82f6".into()), ..Default::default() };
    doc.update_token(&t.id, &patch);
    assert_eq!(doc.token(&t.id).unwrap().color.as_deref(), Some("#3b82f6"));
}

#[test]
fn delete_token_removes_and_is_idempotent() {
    let mut doc = MapDocument::new();
    let t = image_at(&mut doc, 0.0, 0.0, None);
    assert_eq!(doc.delete_token(&t.id).map(|d| d.id), Some(t.id));
    assert!(doc.delete_token(&t.id).is_none());
    assert!(doc.tokens.is_empty());
}

#[test]
fn sorted_tokens_ascending_z_regardless_of_insertion() {
    let mut doc = MapDocument::new();
    image_at(&mut doc, 0.0, 0.0, Some(50));
    image_at(&mut doc, 0.0, 0.0, Some(10));
    image_at(&mut doc, 0.0, 0.0, Some(30));
    let zs: Vec<i64> = doc.sorted_tokens().iter().map(|t| t.z_order).collect();
    assert_eq!(zs, vec![10, 30, 50]);
}

#[test]
fn sorted_tokens_ties_keep_insertion_order() {
    let mut doc = MapDocument::new();
    let a = image_at(&mut doc, 0.0, 0.0, Some(30));
    let b = image_at(&mut doc, 0.0, 0.0, Some(30));
    let c = image_at(&mut doc, 0.0, 0.0, Some(20));
    let ids: Vec<TokenId> = doc.sorted_tokens().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
}

#[test]
fn token_patch_is_empty() {
    assert!(TokenPatch::default().is_empty());
    assert!(!TokenPatch::position(0.0, 0.0).is_empty());
}

// =============================================================
// MapDocument
// =============================================================

#[test]
fn commit_stroke_routes_by_surface() {
    let mut doc = MapDocument::new();
    doc.commit_stroke(stroke(StrokeTool::Ink));
    doc.commit_stroke(stroke(StrokeTool::Erase));
    doc.commit_stroke(stroke(StrokeTool::FogReveal));
    doc.commit_stroke(stroke(StrokeTool::FogShroud));
    assert_eq!(doc.strokes.len(), 2);
    assert_eq!(doc.fog_strokes.len(), 2);
    assert_eq!(doc.fog_strokes[0].tool, StrokeTool::FogReveal);
    assert_eq!(doc.fog_strokes[1].tool, StrokeTool::FogShroud);
}

#[test]
fn default_grid_config() {
    let g = GridConfig::default();
    assert_eq!(g.grid_type, GridType::Square);
    assert_eq!(g.scale, 1.0);
    assert_eq!(g.unit_number, 5);
    assert_eq!(g.unit_type, UnitType::Ft);
}

#[test]
fn grid_config_wire_keys() {
    let g = GridConfig { grid_type: GridType::Hex, scale: 2.0, unit_number: 10, unit_type: UnitType::Mi };
    let v = serde_json::to_value(g).unwrap();
    assert_eq!(v, json!({ "type": "hex", "scale": 2.0, "unitNumber": 10, "unitType": "mi" }));
}

#[test]
fn document_wire_keys_are_camel_case() {
    let mut doc = MapDocument::new();
    doc.commit_stroke(stroke(StrokeTool::FogShroud));
    let t = doc.add_token(TokenDraft::pin("e1", "Keep", Point::new(0.0, 0.0)));
    let v = serde_json::to_value(&doc).unwrap();
    assert!(v.get("fogStrokes").is_some());
    assert!(v.get("strokes").is_some());
    assert!(v.get("grid").is_some());
    assert_eq!(v["tokens"][0]["zOrder"], 60);
    assert_eq!(v["tokens"][0]["linkedEntryId"], "e1");
    assert_eq!(v["tokens"][0]["id"], t.id.to_string());
    assert!(v["tokens"][0].get("src").is_none());
}

#[test]
fn document_missing_keys_default() {
    let doc: MapDocument = serde_json::from_value(json!({})).unwrap();
    assert_eq!(doc, MapDocument::default());
}

#[test]
fn document_legacy_lines_key_loads_as_strokes() {
    let doc: MapDocument = serde_json::from_value(json!({
        "lines": [{ "points": [0, 0, 5, 5], "stroke": "#000", "strokeWidth": 5, "tool": "brush" }]
    }))
    .unwrap();
    assert_eq!(doc.strokes.len(), 1);
    assert!(doc.fog_strokes.is_empty());
}

#[test]
fn unit_abbrev() {
    assert_eq!(UnitType::Ft.abbrev(), "ft");
    assert_eq!(UnitType::M.abbrev(), "m");
    assert_eq!(UnitType::Km.abbrev(), "km");
    assert_eq!(UnitType::Mi.abbrev(), "mi");
}

#[test]
fn stroke_tool_names_match_wire_values() {
    for tool in [StrokeTool::Ink, StrokeTool::Erase, StrokeTool::FogReveal, StrokeTool::FogShroud] {
        assert_eq!(serde_json::to_value(tool).unwrap(), serde_json::Value::from(tool.name()));
    }
}
