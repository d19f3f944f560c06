//! Rendering: turns engine state into a backend-neutral display list.
//!
//! [`build_scene`] reads the document, camera and UI state and produces a
//! [`Scene`]: an ordered list of [`DrawCommand`]s in world coordinates. It
//! never mutates application state. A backend (see the `web` module) plays
//! the commands onto a real surface.
//!
//! Paint order, bottom first:
//!
//! 1. grid
//! 2. ink surface (isolated, so erase strokes only cut ink)
//! 3. tokens below the fog bucket, ascending z-order
//! 4. fog surface (isolated, opaque sheet over the world bounds)
//! 5. tokens in or above the fog bucket
//! 6. interface: ruler, selection gizmo, brush cursor
//!
//! Interface sizes are given in screen pixels and divided by the zoom so
//! they stay constant on screen.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{DEFAULT_PIN_COLOR, FOG_Z_MIN, HANDLE_RADIUS_PX};
use crate::doc::{Stroke, StrokeShape, Token, TokenKind};
use crate::engine::EngineCore;
use crate::grid::{self, GridGeometry};
use crate::hit::{self, TokenGeometry};
use crate::input::InputState;
use crate::measure;
use crate::surface::{CompositeOp, FOG_COLOR};

const GRID_COLOR: &str = "rgba(0, 0, 0, 0.15)";
const CROSSHAIR_COLOR: &str = "rgba(0, 0, 0, 0.5)";
const RULER_COLOR: &str = "#f59e0b";
const SELECTION_COLOR: &str = "#3b82f6";
const HANDLE_FILL: &str = "#ffffff";
const BRUSH_CURSOR_COLOR: &str = "rgba(128, 128, 128, 0.9)";
const PIN_OUTLINE: &str = "#ffffff";
const LABEL_COLOR: &str = "#1f1a17";

/// Selection and ruler dash length in screen pixels.
const DASH_PX: f64 = 6.0;
const LABEL_FONT_PX: f64 = 12.0;
const RULER_FONT_PX: f64 = 14.0;

/// A section of the scene. Isolated sections are composited on their own
/// surface before being drawn onto the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneLayer {
    Grid,
    Ink,
    Tokens,
    Fog,
    TokensAboveFog,
    Interface,
}

impl SceneLayer {
    #[must_use]
    pub fn is_isolated(self) -> bool {
        matches!(self, Self::Ink | Self::Fog)
    }
}

/// Outline style.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    /// Width in world units.
    pub width: f64,
    /// Dash length in world units; `None` draws a solid line.
    pub dash: Option<f64>,
}

impl LineStyle {
    fn solid(color: &str, width: f64) -> Self {
        Self { color: color.to_owned(), width, dash: None }
    }

    fn dashed(color: &str, width: f64, dash: f64) -> Self {
        Self { color: color.to_owned(), width, dash: Some(dash) }
    }
}

/// One drawing instruction. Geometry is in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the frame and set the world-to-screen transform.
    Begin { camera: Camera, viewport_width: f64, viewport_height: f64 },
    BeginLayer(SceneLayer),
    EndLayer,
    /// Composite operation for the following commands in the current layer.
    Composite(CompositeOp),
    /// Polyline with round caps and joins.
    Path { points: Vec<Point>, closed: bool, style: LineStyle },
    FillRect { rect: Rect, color: String },
    StrokeRect { rect: Rect, style: LineStyle },
    Circle { center: Point, radius: f64, fill: Option<String>, stroke: Option<LineStyle> },
    /// An image drawn into a (possibly rotated) token box.
    Image { src: String, geom: TokenGeometry },
    /// Text centered on `at`; `size` is the font size in world units.
    Text { at: Point, text: String, color: String, size: f64 },
}

/// A complete frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    /// Commands inside `layer`, or an empty slice if the layer is absent.
    #[must_use]
    pub fn layer(&self, layer: SceneLayer) -> &[DrawCommand] {
        let Some(start) = self.commands.iter().position(|c| *c == DrawCommand::BeginLayer(layer)) else {
            return &[];
        };
        let body = &self.commands[start + 1..];
        let end = body.iter().position(|c| *c == DrawCommand::EndLayer).unwrap_or(body.len());
        &body[..end]
    }

    #[must_use]
    pub fn has_layer(&self, layer: SceneLayer) -> bool {
        self.commands.contains(&DrawCommand::BeginLayer(layer))
    }

    fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    fn layer_with(&mut self, layer: SceneLayer, f: impl FnOnce(&mut Scene)) {
        self.push(DrawCommand::BeginLayer(layer));
        f(self);
        self.push(DrawCommand::EndLayer);
    }
}

/// Build the frame for the engine's current state.
#[must_use]
pub fn build_scene(core: &EngineCore) -> Scene {
    let zoom = core.camera.zoom;
    let mut scene = Scene::default();
    scene.push(DrawCommand::Begin {
        camera: core.camera,
        viewport_width: core.viewport_width,
        viewport_height: core.viewport_height,
    });

    let visible = core.camera.visible_world(core.viewport_width, core.viewport_height);
    let geometry = grid::grid_geometry(&core.doc.grid, visible, zoom);
    scene.layer_with(SceneLayer::Grid, |s| draw_grid(s, &geometry, zoom));

    let in_progress = match &core.input {
        InputState::Drawing { builder } => Some(builder.stroke()),
        _ => None,
    };
    let ink_live = in_progress.filter(|s| !s.tool.is_fog());
    let fog_live = in_progress.filter(|s| s.tool.is_fog());

    scene.layer_with(SceneLayer::Ink, |s| {
        for stroke in core.doc.strokes.iter().chain(ink_live) {
            draw_stroke(s, stroke);
        }
    });

    let (below, above): (Vec<&Token>, Vec<&Token>) = core
        .doc
        .sorted_tokens()
        .into_iter()
        .filter(|t| core.images.is_ready(t))
        .partition(|t| t.z_order < FOG_Z_MIN);

    scene.layer_with(SceneLayer::Tokens, |s| {
        for token in below {
            draw_token(s, token, core, zoom);
        }
    });

    if !core.doc.fog_strokes.is_empty() || fog_live.is_some() {
        scene.layer_with(SceneLayer::Fog, |s| {
            s.push(DrawCommand::FillRect { rect: grid::world_bounds(), color: FOG_COLOR.to_owned() });
            for stroke in core.doc.fog_strokes.iter().chain(fog_live) {
                draw_stroke(s, stroke);
            }
        });
    }

    if !above.is_empty() {
        scene.layer_with(SceneLayer::TokensAboveFog, |s| {
            for token in above {
                draw_token(s, token, core, zoom);
            }
        });
    }

    scene.layer_with(SceneLayer::Interface, |s| draw_interface(s, core, zoom));
    scene
}

// =============================================================
// Grid
// =============================================================

fn draw_grid(scene: &mut Scene, geometry: &GridGeometry, zoom: f64) {
    let style = LineStyle::solid(GRID_COLOR, 1.0 / zoom);
    for seg in &geometry.lines {
        scene.push(DrawCommand::Path { points: vec![seg.a, seg.b], closed: false, style: style.clone() });
    }
    for hex in &geometry.hexagons {
        scene.push(DrawCommand::Path { points: hex.to_vec(), closed: true, style: style.clone() });
    }
    if let Some(arms) = &geometry.crosshair {
        let style = LineStyle::solid(CROSSHAIR_COLOR, 2.0 / zoom);
        for seg in arms {
            scene.push(DrawCommand::Path { points: vec![seg.a, seg.b], closed: false, style: style.clone() });
        }
    }
}

// =============================================================
// Strokes
// =============================================================

fn draw_stroke(scene: &mut Scene, stroke: &Stroke) {
    scene.push(DrawCommand::Composite(CompositeOp::for_tool(stroke.tool)));
    if let Some(rect) = stroke.rect() {
        if stroke.is_filled() {
            let half = stroke.width / 2.0;
            let rect = Rect::new(rect.x - half, rect.y - half, rect.width + stroke.width, rect.height + stroke.width);
            scene.push(DrawCommand::FillRect { rect, color: stroke.color.clone() });
        } else {
            scene.push(DrawCommand::StrokeRect { rect, style: LineStyle::solid(&stroke.color, stroke.width) });
        }
        return;
    }

    let points: Vec<Point> = stroke.iter_points().collect();
    match points.as_slice() {
        [] => {}
        [only] => scene.push(DrawCommand::Circle {
            center: *only,
            radius: stroke.width / 2.0,
            fill: Some(stroke.color.clone()),
            stroke: None,
        }),
        _ => scene.push(DrawCommand::Path {
            points,
            closed: stroke.shape == StrokeShape::Rectangle,
            style: LineStyle::solid(&stroke.color, stroke.width),
        }),
    }
}

// =============================================================
// Tokens
// =============================================================

fn draw_token(scene: &mut Scene, token: &Token, core: &EngineCore, zoom: f64) {
    let geom = core.input.transform_preview(&token.id).unwrap_or_else(|| TokenGeometry::of(token));
    match token.kind {
        TokenKind::Image => {
            if let Some(src) = &token.src {
                scene.push(DrawCommand::Image { src: src.clone(), geom });
            }
        }
        TokenKind::Pin => {
            let center = geom.center();
            let color = token.color.as_deref().unwrap_or(DEFAULT_PIN_COLOR);
            scene.push(DrawCommand::Circle {
                center,
                radius: geom.width.min(geom.height) / 2.0,
                fill: Some(color.to_owned()),
                stroke: Some(LineStyle::solid(PIN_OUTLINE, 2.0 / zoom)),
            });
            if let Some(label) = &token.label {
                let size = LABEL_FONT_PX / zoom;
                scene.push(DrawCommand::Text {
                    at: Point::new(center.x, geom.y + geom.height + size),
                    text: label.clone(),
                    color: LABEL_COLOR.to_owned(),
                    size,
                });
            }
        }
    }
}

// =============================================================
// Interface
// =============================================================

fn draw_interface(scene: &mut Scene, core: &EngineCore, zoom: f64) {
    if let Some(m) = core.ruler.session() {
        let g = measure::ruler_geometry(m, &core.doc.grid, zoom);
        scene.push(DrawCommand::Path {
            points: vec![g.line.a, g.line.b],
            closed: false,
            style: LineStyle::dashed(RULER_COLOR, 2.0 / zoom, DASH_PX / zoom),
        });
        for tick in g.ticks {
            scene.push(DrawCommand::Path {
                points: vec![tick.a, tick.b],
                closed: false,
                style: LineStyle::solid(RULER_COLOR, 2.0 / zoom),
            });
        }
        scene.push(DrawCommand::Text {
            at: g.label_at,
            text: g.label,
            color: RULER_COLOR.to_owned(),
            size: RULER_FONT_PX / zoom,
        });
    }

    let selected = core.ui.selected_id.and_then(|id| core.doc.token(&id)).filter(|t| core.images.is_ready(t));
    if let Some(token) = selected {
        let geom = core.input.transform_preview(&token.id).unwrap_or_else(|| TokenGeometry::of(token));
        draw_selection(scene, &geom, zoom);
    }

    if core.ui.tool.is_drawing() {
        if let Some(at) = core.ui.pointer_world {
            draw_brush_cursor(scene, core, at, zoom);
        }
    }
}

fn draw_selection(scene: &mut Scene, geom: &TokenGeometry, zoom: f64) {
    let handles = hit::resize_handle_positions(geom);
    // Corners are the diagonal anchors: NE, SE, SW, NW.
    let corners = vec![handles[1], handles[3], handles[5], handles[7]];
    scene.push(DrawCommand::Path {
        points: corners,
        closed: true,
        style: LineStyle::dashed(SELECTION_COLOR, 1.0 / zoom, DASH_PX / zoom),
    });

    let rotate = hit::rotate_handle_position(geom, zoom);
    scene.push(DrawCommand::Path {
        points: vec![handles[0], rotate],
        closed: false,
        style: LineStyle::solid(SELECTION_COLOR, 1.0 / zoom),
    });

    let radius = HANDLE_RADIUS_PX / 2.0 / zoom;
    for center in handles.into_iter().chain(std::iter::once(rotate)) {
        scene.push(DrawCommand::Circle {
            center,
            radius,
            fill: Some(HANDLE_FILL.to_owned()),
            stroke: Some(LineStyle::solid(SELECTION_COLOR, 1.0 / zoom)),
        });
    }
}

fn draw_brush_cursor(scene: &mut Scene, core: &EngineCore, at: Point, zoom: f64) {
    let Some(tool) = core.ui.tool.stroke_tool() else {
        return;
    };
    let (_, width) = core.ui.brush.style_for(tool);
    scene.push(DrawCommand::Circle {
        center: at,
        radius: width / 2.0,
        fill: None,
        stroke: Some(LineStyle::solid(BRUSH_CURSOR_COLOR, 1.0 / zoom)),
    });
}
