#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{StrokeTool, TokenKind};
use crate::input::Stamp;

fn ev(x: f64, y: f64) -> PointerEvent {
    PointerEvent { screen: Point::new(x, y), world: Point::new(x, y), modifiers: Modifiers::default() }
}

fn core_with(tool: Tool) -> EngineCore {
    let mut core = EngineCore::new();
    core.ui.tool = tool;
    core
}

#[test]
fn draw_tool_ignores_non_drawing_tool() {
    let mut core = core_with(Tool::Select);
    assert!(DrawTool.on_pointer_down(&mut core, &ev(0.0, 0.0)).is_empty());
    assert!(matches!(core.input, InputState::Idle));
}

#[test]
fn draw_tool_captures_shape_at_gesture_start() {
    let mut core = core_with(Tool::Brush);
    DrawTool.on_pointer_down(&mut core, &ev(0.0, 0.0));
    core.ui.brush.shape = StrokeShape::Rectangle;
    DrawTool.on_pointer_move(&mut core, &ev(1.0, 1.0));
    DrawTool.on_pointer_move(&mut core, &ev(2.0, 2.0));
    DrawTool.on_pointer_up(&mut core, &ev(2.0, 2.0));

    let stroke = &core.doc.strokes[0];
    assert_eq!(stroke.shape, StrokeShape::Freehand);
    assert_eq!(stroke.point_count(), 3);
}

#[test]
fn draw_tool_rectangle_from_brush_shape() {
    let mut core = core_with(Tool::FogShroud);
    core.ui.brush.shape = StrokeShape::Rectangle;
    DrawTool.on_pointer_down(&mut core, &ev(0.0, 0.0));
    DrawTool.on_pointer_move(&mut core, &ev(50.0, 50.0));
    DrawTool.on_pointer_move(&mut core, &ev(100.0, 100.0));
    let actions = DrawTool.on_pointer_up(&mut core, &ev(100.0, 100.0));

    let stroke = &core.doc.fog_strokes[0];
    assert_eq!(stroke.points, vec![0.0, 0.0, 100.0, 100.0]);
    assert_eq!(stroke.tool, StrokeTool::FogShroud);
    assert_eq!(actions[0], Action::StrokeCommitted(stroke.clone()));
}

#[test]
fn draw_tool_move_without_gesture_still_redraws_cursor() {
    let mut core = core_with(Tool::Brush);
    assert_eq!(DrawTool.on_pointer_move(&mut core, &ev(3.0, 3.0)), vec![Action::RenderNeeded]);
    assert!(DrawTool.on_pointer_up(&mut core, &ev(3.0, 3.0)).is_empty());
}

#[test]
fn pan_tool_move_without_gesture_is_noop() {
    let mut core = core_with(Tool::Pan);
    assert!(PanTool.on_pointer_move(&mut core, &ev(10.0, 10.0)).is_empty());
    assert!(PanTool.on_pointer_up(&mut core, &ev(10.0, 10.0)).is_empty());
    assert_eq!(core.camera.pan_x, 0.0);
}

#[test]
fn measure_tool_tracks_only_pending_session() {
    let mut core = core_with(Tool::Measure);
    assert!(MeasureTool.on_pointer_move(&mut core, &ev(1.0, 1.0)).is_empty());
    MeasureTool.on_pointer_down(&mut core, &ev(0.0, 0.0));
    assert_eq!(MeasureTool.on_pointer_move(&mut core, &ev(4.0, 3.0)), vec![Action::RenderNeeded]);
    assert!((core.ruler.session().unwrap().pixel_distance() - 5.0).abs() < 1e-9);
    assert!(MeasureTool.on_pointer_up(&mut core, &ev(4.0, 3.0)).is_empty());
}

#[test]
fn stamp_tool_uses_active_stamp() {
    let mut core = core_with(Tool::Stamp);
    assert!(StampTool.on_pointer_down(&mut core, &ev(0.0, 0.0)).is_empty());

    core.ui.stamp = Some(Stamp { src: "door.png".into(), width: 10.0, height: 20.0 });
    let actions = StampTool.on_pointer_down(&mut core, &ev(0.0, 0.0));
    let Action::TokenCreated(token) = &actions[0] else {
        panic!("expected TokenCreated, got {actions:?}");
    };
    assert_eq!(token.kind, TokenKind::Image);
    assert_eq!((token.x, token.y), (-5.0, -10.0));
    assert_eq!(token.src.as_deref(), Some("door.png"));
}

#[test]
fn select_tool_up_while_idle_keeps_state() {
    let mut core = core_with(Tool::Select);
    assert!(SelectTool.on_pointer_up(&mut core, &ev(0.0, 0.0)).is_empty());
    assert!(matches!(core.input, InputState::Idle));
}

#[test]
fn select_tool_drag_of_deleted_token_is_dropped() {
    let mut core = core_with(Tool::Select);
    let Action::TokenCreated(token) = core.add_token(TokenDraft::pin("e", "A", Point::new(0.0, 0.0)))
    else {
        panic!("expected TokenCreated");
    };
    SelectTool.on_pointer_down(&mut core, &ev(0.0, 0.0));
    core.doc.delete_token(&token.id);
    assert_eq!(SelectTool.on_pointer_move(&mut core, &ev(5.0, 5.0)), Vec::<Action>::new());
    assert!(SelectTool.on_pointer_up(&mut core, &ev(5.0, 5.0)).is_empty());
}

#[test]
fn every_tool_has_a_behavior() {
    let tools = [
        Tool::Select,
        Tool::Pan,
        Tool::Measure,
        Tool::Brush,
        Tool::Erase,
        Tool::Room,
        Tool::FogReveal,
        Tool::FogShroud,
        Tool::Stamp,
    ];
    for tool in tools {
        let mut core = core_with(tool);
        // Releasing without a gesture is always harmless.
        let actions = behavior_for(tool).on_pointer_up(&mut core, &ev(0.0, 0.0));
        assert!(!actions.iter().any(Action::is_mutation), "{tool:?}");
    }
}
