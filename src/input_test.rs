use uuid::Uuid;

use super::*;

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_pan() {
    assert_eq!(Tool::default(), Tool::Pan);
}

#[test]
fn drawing_tools_map_to_stroke_tools() {
    assert_eq!(Tool::Brush.stroke_tool(), Some(StrokeTool::Ink));
    assert_eq!(Tool::Room.stroke_tool(), Some(StrokeTool::Ink));
    assert_eq!(Tool::Erase.stroke_tool(), Some(StrokeTool::Erase));
    assert_eq!(Tool::FogReveal.stroke_tool(), Some(StrokeTool::FogReveal));
    assert_eq!(Tool::FogShroud.stroke_tool(), Some(StrokeTool::FogShroud));
}

#[test]
fn non_drawing_tools() {
    for tool in [Tool::Select, Tool::Pan, Tool::Measure, Tool::Stamp] {
        assert!(!tool.is_drawing(), "{tool:?}");
        assert!(tool.stroke_tool().is_none());
    }
}

#[test]
fn tool_cursors() {
    assert_eq!(Tool::Pan.cursor(), "grab");
    assert_eq!(Tool::Brush.cursor(), "none");
    assert_eq!(Tool::FogShroud.cursor(), "none");
    assert_eq!(Tool::Measure.cursor(), "crosshair");
    assert_eq!(Tool::Select.cursor(), "default");
}

// =============================================================
// UiState / InputState
// =============================================================

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Pan);
    assert!(ui.selected_id.is_none());
    assert!(ui.stamp.is_none());
    assert!(ui.pointer_world.is_none());
}

#[test]
fn input_state_default_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}

#[test]
fn transform_preview_only_for_matching_token() {
    let id = Uuid::new_v4();
    let g = TokenGeometry { x: 1.0, y: 2.0, width: 3.0, height: 4.0, rotation: 5.0 };
    let state = InputState::RotatingToken { id, orig: g, preview: g };
    assert_eq!(state.transform_preview(&id), Some(g));
    assert_eq!(state.transform_preview(&Uuid::new_v4()), None);
    assert_eq!(InputState::Idle.transform_preview(&id), None);
}

#[test]
fn drop_payload_equality() {
    let a = DropPayload::EntryLink { entry_id: "e1".into(), title: "Inn".into() };
    assert_eq!(a.clone(), a);
    assert_ne!(a, DropPayload::ImageFile { path: "x.png".into() });
}

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}
