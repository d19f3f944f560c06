//! Map engine: owns one map session and turns input events into [`Action`]s.
//!
//! `EngineCore` holds the document, camera, UI state, gesture state and
//! ruler for a single map. It has no browser dependency; the `web` module
//! wraps it together with a canvas element.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashSet;

use serde::Serialize;

use crate::camera::{Camera, Point};
use crate::consts::{DEFAULT_PIN_COLOR, PIN_PALETTE};
use crate::doc::{GridConfig, MapDocument, Stroke, Token, TokenDraft, TokenId, TokenKind, TokenPatch};
use crate::hit::{self, HitPart, TokenGeometry};
use crate::input::{Button, DropPayload, InputState, Key, Modifiers, Stamp, Tool, UiState, WheelDelta};
use crate::measure::Ruler;
use crate::render::{self, Scene};
use crate::surface::BrushSettings;
use crate::tools::{self, PanTool, PointerEvent, ToolBehavior};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    StrokeCommitted(Stroke),
    TokenCreated(Token),
    TokenUpdated { id: TokenId, patch: TokenPatch },
    TokenDeleted { id: TokenId },
    GridChanged(GridConfig),
    SetCursor(String),
    /// The user asked to open the document entry a pin links to.
    OpenEntryRequested { entry_id: String },
    RenderNeeded,
}

impl Action {
    /// Whether the action changed persisted map state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::StrokeCommitted(_)
                | Self::TokenCreated(_)
                | Self::TokenUpdated { .. }
                | Self::TokenDeleted { .. }
                | Self::GridChanged(_)
        )
    }
}

/// `action` followed by a redraw. [`Action::None`] is dropped.
pub(crate) fn then_render(action: Action) -> Vec<Action> {
    match action {
        Action::None => vec![Action::RenderNeeded],
        action => vec![action, Action::RenderNeeded],
    }
}

/// Load state of token images, keyed by `src`.
///
/// Image tokens neither render nor hit-test until their image has loaded.
#[derive(Debug, Clone, Default)]
pub struct ImageStates {
    loaded: HashSet<String>,
    failed: HashSet<String>,
}

impl ImageStates {
    pub fn mark_loaded(&mut self, src: &str) {
        self.failed.remove(src);
        self.loaded.insert(src.to_owned());
    }

    pub fn mark_failed(&mut self, src: &str) {
        self.loaded.remove(src);
        self.failed.insert(src.to_owned());
    }

    #[must_use]
    pub fn is_loaded(&self, src: &str) -> bool {
        self.loaded.contains(src)
    }

    #[must_use]
    pub fn is_failed(&self, src: &str) -> bool {
        self.failed.contains(src)
    }

    /// Whether `token` can be drawn and interacted with.
    #[must_use]
    pub fn is_ready(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Pin => true,
            TokenKind::Image => token.src.as_deref().is_some_and(|src| self.is_loaded(src)),
        }
    }
}

/// Snapshot of view state for a debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub pointer: Option<Point>,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub doc: MapDocument,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub ruler: Ruler,
    pub images: ImageStates,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: MapDocument::new(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            ruler: Ruler::default(),
            images: ImageStates::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the whole document, e.g. after loading it from storage.
    pub fn load_document(&mut self, doc: MapDocument) {
        self.doc = doc;
        self.ui.selected_id = None;
        self.input = InputState::Idle;
        self.ruler.clear();
    }

    /// Place a token and report it.
    pub fn add_token(&mut self, draft: TokenDraft) -> Action {
        Action::TokenCreated(self.doc.add_token(draft))
    }

    /// Apply a partial update. Unknown ids are ignored.
    pub fn update_token(&mut self, id: &TokenId, patch: TokenPatch) -> Action {
        if patch.is_empty() || !self.doc.update_token(id, &patch) {
            return Action::None;
        }
        Action::TokenUpdated { id: *id, patch }
    }

    /// Remove a token. Unknown ids are ignored.
    pub fn delete_token(&mut self, id: &TokenId) -> Action {
        if self.doc.delete_token(id).is_none() {
            return Action::None;
        }
        if self.ui.selected_id.as_ref() == Some(id) {
            self.ui.selected_id = None;
        }
        Action::TokenDeleted { id: *id }
    }

    /// Pin context action: recolor.
    pub fn set_token_color(&mut self, id: &TokenId, color: impl Into<String>) -> Action {
        self.update_token(id, TokenPatch { color: Some(color.into()), ..Default::default() })
    }

    /// Pin context action: step to the next palette color.
    pub fn cycle_pin_color(&mut self, id: &TokenId) -> Action {
        let Some(token) = self.doc.token(id).filter(|t| t.kind == TokenKind::Pin) else {
            return Action::None;
        };
        let current = token.color.as_deref().unwrap_or(DEFAULT_PIN_COLOR);
        let next = PIN_PALETTE
            .iter()
            .position(|c| *c == current)
            .map_or(PIN_PALETTE[0], |i| PIN_PALETTE[(i + 1) % PIN_PALETTE.len()]);
        self.set_token_color(id, next)
    }

    /// Commit the result of a resize or rotate gesture.
    pub fn apply_transform_end(&mut self, id: &TokenId, geom: &TokenGeometry) -> Action {
        let patch = TokenPatch {
            x: Some(geom.x),
            y: Some(geom.y),
            width: Some(geom.width),
            height: Some(geom.height),
            rotation: Some(geom.rotation),
            ..Default::default()
        };
        self.update_token(id, patch)
    }

    /// Replace the grid configuration.
    pub fn set_grid(&mut self, grid: GridConfig) -> Vec<Action> {
        self.doc.grid = grid;
        vec![Action::GridChanged(grid), Action::RenderNeeded]
    }

    // --- Tool / toolbar ---

    /// Set the active tool.
    ///
    /// An unfinished stroke is dropped, not committed. The ruler is cleared.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Drawing { builder } => {
                tracing::info!(points = builder.stroke().point_count(), "stroke abandoned on tool change");
            }
            InputState::DraggingToken { id, orig_x, orig_y, .. } => {
                // The drag already moved the token; report where it ended up.
                if let Some(token) = self.doc.token(&id) {
                    if Point::new(token.x, token.y) != Point::new(orig_x, orig_y) {
                        actions.push(Action::TokenUpdated { id, patch: TokenPatch::position(token.x, token.y) });
                    }
                }
            }
            _ => {}
        }
        self.ruler.clear();
        self.ui.tool = tool;
        actions.push(Action::SetCursor(tool.cursor().to_owned()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Brush used by strokes started from now on.
    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.ui.brush = brush;
    }

    /// Choose the image the stamp tool places.
    pub fn set_stamp(&mut self, stamp: Option<Stamp>) {
        self.ui.stamp = stamp;
    }

    // --- Viewport ---

    /// Update viewport dimensions in CSS pixels.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
    }

    // --- Images ---

    pub fn mark_image_loaded(&mut self, src: &str) -> Action {
        self.images.mark_loaded(src);
        Action::RenderNeeded
    }

    pub fn mark_image_failed(&mut self, src: &str) -> Action {
        tracing::warn!(src, "token image failed to load");
        self.images.mark_failed(src);
        Action::RenderNeeded
    }

    // --- Input events ---

    /// A middle press pans under any tool, but only from idle; it never
    /// interrupts a live gesture.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let ev = self.pointer_event(screen_pt, modifiers);
        match button {
            Button::Middle if matches!(self.input, InputState::Idle) => PanTool.on_pointer_down(self, &ev),
            Button::Primary => tools::behavior_for(self.ui.tool).on_pointer_down(self, &ev),
            Button::Middle | Button::Secondary => vec![],
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let ev = self.pointer_event(screen_pt, modifiers);
        self.active_behavior().on_pointer_move(self, &ev)
    }

    /// Primary releases end the live gesture. A middle release only ends a pan.
    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let ev = self.pointer_event(screen_pt, modifiers);
        match button {
            Button::Primary => self.active_behavior().on_pointer_up(self, &ev),
            Button::Middle if matches!(self.input, InputState::Panning { .. }) => PanTool.on_pointer_up(self, &ev),
            Button::Middle | Button::Secondary => vec![],
        }
    }

    /// The pointer left the canvas. Any gesture ends as if released at the
    /// last known position.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let last = self.ui.pointer_screen;
        let mut actions = match last {
            Some(screen) => {
                let ev = self.pointer_event(screen, Modifiers::default());
                self.active_behavior().on_pointer_up(self, &ev)
            }
            None => vec![],
        };
        self.ui.pointer_world = None;
        self.ui.pointer_screen = None;
        if self.ui.tool.is_drawing() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return vec![];
        }
        self.camera.zoom_at(screen_pt, delta.dy);
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => {
                let Some(id) = self.ui.selected_id else {
                    return vec![];
                };
                self.input = InputState::Idle;
                then_render(self.delete_token(&id))
            }
            "Escape" => {
                if self.ui.selected_id.take().is_none() {
                    return vec![];
                }
                vec![Action::RenderNeeded]
            }
            _ => vec![],
        }
    }

    /// Double-click on a linked pin asks the host to open its entry.
    pub fn on_double_click(&self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let images = &self.images;
        let Some(hit) = hit::hit_test(world, &self.doc, &self.camera, None, |t| images.is_ready(t)) else {
            return vec![];
        };
        if hit.part != HitPart::Body {
            return vec![];
        }
        self.doc
            .token(&hit.token_id)
            .filter(|t| t.kind == TokenKind::Pin)
            .and_then(|t| t.linked_entry_id.clone())
            .map(|entry_id| vec![Action::OpenEntryRequested { entry_id }])
            .unwrap_or_default()
    }

    /// Something was dropped on the canvas at `screen_pt`.
    pub fn on_drop(&mut self, screen_pt: Point, payload: DropPayload) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let draft = match payload {
            DropPayload::ImageFile { path } => TokenDraft::image(path, world),
            DropPayload::EntryLink { entry_id, title } => TokenDraft::pin(entry_id, title, world),
        };
        vec![self.add_token(draft), Action::RenderNeeded]
    }

    // --- Render ---

    /// Build the display list for the current state.
    #[must_use]
    pub fn scene(&self) -> Scene {
        render::build_scene(self)
    }

    // --- Queries ---

    /// The currently selected token, if any.
    #[must_use]
    pub fn selection(&self) -> Option<TokenId> {
        self.ui.selected_id
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Look up a token by ID.
    #[must_use]
    pub fn token(&self, id: &TokenId) -> Option<&Token> {
        self.doc.token(id)
    }

    #[must_use]
    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            zoom: self.camera.zoom,
            pan_x: self.camera.pan_x,
            pan_y: self.camera.pan_y,
            pointer: self.ui.pointer_screen,
        }
    }

    // --- Internals ---

    fn pointer_event(&mut self, screen: Point, modifiers: Modifiers) -> PointerEvent {
        let world = self.camera.screen_to_world(screen);
        self.ui.pointer_screen = Some(screen);
        self.ui.pointer_world = Some(world);
        PointerEvent { screen, world, modifiers }
    }

    /// A live pan gesture owns the pointer regardless of the active tool.
    fn active_behavior(&self) -> &'static dyn ToolBehavior {
        match self.input {
            InputState::Panning { .. } => &PanTool,
            _ => tools::behavior_for(self.ui.tool),
        }
    }
}
