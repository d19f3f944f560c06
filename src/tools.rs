//! Per-tool pointer behavior.
//!
//! Every [`Tool`] maps to one stateless behavior object. The engine picks the
//! behavior for the active tool (or the pan behavior while a pan gesture is
//! live) and forwards pointer-down/move/up to it. All gesture state lives in
//! [`EngineCore::input`], so behaviors can be tested in isolation against a
//! bare `EngineCore`.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use crate::camera::Point;
use crate::doc::{StrokeShape, TokenDraft, TokenPatch};
use crate::engine::{Action, EngineCore, then_render};
use crate::hit::{self, HitPart, TokenGeometry};
use crate::input::{InputState, Modifiers, Tool};
use crate::surface::StrokeBuilder;

/// A pointer sample, already converted to world space.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub screen: Point,
    pub world: Point,
    pub modifiers: Modifiers,
}

/// Pointer handling for one tool.
pub trait ToolBehavior: Sync {
    fn on_pointer_down(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action>;

    fn on_pointer_move(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action>;

    /// Also called when the pointer leaves the canvas mid-gesture.
    fn on_pointer_up(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action>;
}

/// Behavior object for `tool`.
#[must_use]
pub fn behavior_for(tool: Tool) -> &'static dyn ToolBehavior {
    match tool {
        Tool::Select => &SelectTool,
        Tool::Pan => &PanTool,
        Tool::Measure => &MeasureTool,
        Tool::Brush | Tool::Erase | Tool::Room | Tool::FogReveal | Tool::FogShroud => &DrawTool,
        Tool::Stamp => &StampTool,
    }
}

// =============================================================
// Pan
// =============================================================

/// Drags the camera. Also serves middle-button panning under any tool.
pub struct PanTool;

impl ToolBehavior for PanTool {
    fn on_pointer_down(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        core.input = InputState::Panning { last_screen: ev.screen };
        vec![Action::SetCursor("grabbing".to_owned())]
    }

    fn on_pointer_move(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        let InputState::Panning { last_screen } = &mut core.input else {
            return vec![];
        };
        let (dx, dy) = (ev.screen.x - last_screen.x, ev.screen.y - last_screen.y);
        *last_screen = ev.screen;
        core.camera.pan_by(dx, dy);
        vec![Action::RenderNeeded]
    }

    fn on_pointer_up(&self, core: &mut EngineCore, _ev: &PointerEvent) -> Vec<Action> {
        if !matches!(core.input, InputState::Panning { .. }) {
            return vec![];
        }
        core.input = InputState::Idle;
        vec![Action::SetCursor(core.ui.tool.cursor().to_owned())]
    }
}

// =============================================================
// Draw (brush, erase, room, fog reveal/shroud)
// =============================================================

/// Builds strokes on the ink or fog surface.
pub struct DrawTool;

impl ToolBehavior for DrawTool {
    fn on_pointer_down(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        let Some(stroke_tool) = core.ui.tool.stroke_tool() else {
            return vec![];
        };
        // Shape is captured here; the builder keeps it for the whole gesture.
        let shape = if core.ui.tool == Tool::Room { StrokeShape::Rectangle } else { core.ui.brush.shape };
        let builder = StrokeBuilder::begin(stroke_tool, shape, ev.world, &core.ui.brush);
        core.input = InputState::Drawing { builder };
        vec![Action::RenderNeeded]
    }

    fn on_pointer_move(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        if let InputState::Drawing { builder } = &mut core.input {
            builder.extend(ev.world);
        }
        // The brush cursor follows the pointer even when idle.
        vec![Action::RenderNeeded]
    }

    fn on_pointer_up(&self, core: &mut EngineCore, _ev: &PointerEvent) -> Vec<Action> {
        let InputState::Drawing { builder } = std::mem::take(&mut core.input) else {
            return vec![];
        };
        let stroke = builder.finish();
        tracing::debug!(tool = ?stroke.tool, points = stroke.point_count(), "stroke committed");
        core.doc.commit_stroke(stroke.clone());
        vec![Action::StrokeCommitted(stroke), Action::RenderNeeded]
    }
}

// =============================================================
// Measure
// =============================================================

/// Two-click ruler.
pub struct MeasureTool;

impl ToolBehavior for MeasureTool {
    fn on_pointer_down(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        core.ruler.click(ev.world);
        vec![Action::RenderNeeded]
    }

    fn on_pointer_move(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        if core.ruler.track(ev.world) { vec![Action::RenderNeeded] } else { vec![] }
    }

    fn on_pointer_up(&self, _core: &mut EngineCore, _ev: &PointerEvent) -> Vec<Action> {
        vec![]
    }
}

// =============================================================
// Stamp
// =============================================================

/// Places the active stamp centered on the click.
pub struct StampTool;

impl ToolBehavior for StampTool {
    fn on_pointer_down(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        let Some(stamp) = core.ui.stamp.clone() else {
            return vec![];
        };
        let draft = TokenDraft::image_sized(stamp.src, ev.world, stamp.width, stamp.height);
        vec![core.add_token(draft), Action::RenderNeeded]
    }

    fn on_pointer_move(&self, _core: &mut EngineCore, _ev: &PointerEvent) -> Vec<Action> {
        vec![]
    }

    fn on_pointer_up(&self, _core: &mut EngineCore, _ev: &PointerEvent) -> Vec<Action> {
        vec![]
    }
}

// =============================================================
// Select
// =============================================================

/// Selects, moves, resizes and rotates tokens.
pub struct SelectTool;

impl ToolBehavior for SelectTool {
    fn on_pointer_down(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        let images = &core.images;
        let hit = hit::hit_test(ev.world, &core.doc, &core.camera, core.ui.selected_id, |t| images.is_ready(t));

        let Some(hit) = hit else {
            core.ui.selected_id = None;
            return vec![Action::RenderNeeded];
        };
        let Some(orig) = core.doc.token(&hit.token_id).map(TokenGeometry::of) else {
            return vec![];
        };

        core.ui.selected_id = Some(hit.token_id);
        core.input = match hit.part {
            HitPart::Body => InputState::DraggingToken {
                id: hit.token_id,
                last_world: ev.world,
                orig_x: orig.x,
                orig_y: orig.y,
            },
            HitPart::ResizeHandle(anchor) => {
                InputState::ResizingToken { id: hit.token_id, anchor, orig, preview: orig }
            }
            HitPart::RotateHandle => InputState::RotatingToken { id: hit.token_id, orig, preview: orig },
        };
        vec![Action::RenderNeeded]
    }

    fn on_pointer_move(&self, core: &mut EngineCore, ev: &PointerEvent) -> Vec<Action> {
        match &mut core.input {
            InputState::DraggingToken { id, last_world, .. } => {
                let (dx, dy) = (ev.world.x - last_world.x, ev.world.y - last_world.y);
                *last_world = ev.world;
                let id = *id;
                let Some(token) = core.doc.token(&id) else {
                    return vec![];
                };
                let patch = TokenPatch::position(token.x + dx, token.y + dy);
                core.doc.update_token(&id, &patch);
                vec![Action::RenderNeeded]
            }
            InputState::ResizingToken { anchor, orig, preview, .. } => {
                *preview = hit::resize_geometry(orig, *anchor, ev.world);
                vec![Action::RenderNeeded]
            }
            InputState::RotatingToken { orig, preview, .. } => {
                preview.rotation = hit::rotation_toward(orig.center(), ev.world);
                vec![Action::RenderNeeded]
            }
            _ => vec![],
        }
    }

    fn on_pointer_up(&self, core: &mut EngineCore, _ev: &PointerEvent) -> Vec<Action> {
        match std::mem::take(&mut core.input) {
            InputState::DraggingToken { id, orig_x, orig_y, .. } => {
                let Some(token) = core.doc.token(&id) else {
                    return vec![];
                };
                if Point::new(token.x, token.y) == Point::new(orig_x, orig_y) {
                    return vec![];
                }
                vec![Action::TokenUpdated { id, patch: TokenPatch::position(token.x, token.y) }]
            }
            InputState::ResizingToken { id, preview, .. } | InputState::RotatingToken { id, preview, .. } => {
                then_render(core.apply_transform_end(&id, &preview))
            }
            other => {
                core.input = other;
                vec![]
            }
        }
    }
}
