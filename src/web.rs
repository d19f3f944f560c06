//! Browser backend: plays a [`Scene`] onto a `<canvas>` element.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! Isolated layers (ink and fog) are drawn onto an offscreen canvas first so
//! their destination-out strokes only cut their own layer, then the
//! offscreen canvas is composited onto the frame.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::{Camera, Point, Rect};
use crate::doc::TokenKind;
use crate::engine::{Action, EngineCore};
use crate::hit::TokenGeometry;
use crate::render::{DrawCommand, LineStyle, Scene};
use crate::surface::CompositeOp;

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas elements.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    layer_canvas: HtmlCanvasElement,
    layer_ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    dpr: f64,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine bound to `canvas`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a 2D context cannot be obtained or the offscreen
    /// layer canvas cannot be created.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let layer_canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
        let layer_ctx = context_2d(&layer_canvas)?;
        Ok(Self { canvas, ctx, layer_canvas, layer_ctx, images: HashMap::new(), dpr: 1.0, core: EngineCore::new() })
    }

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
        let (w, h) = device_size(width_css, height_css, self.dpr);
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.layer_canvas.set_width(w);
        self.layer_canvas.set_height(h);
        self.core.set_viewport(width_css, height_css);
    }

    /// Start loading images for new image tokens and report images that
    /// finished loading or failed since the last poll.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an image element cannot be created.
    pub fn poll_images(&mut self) -> Result<Vec<Action>, JsValue> {
        let sources: Vec<String> = self
            .core
            .doc
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Image)
            .filter_map(|t| t.src.clone())
            .collect();
        for src in sources {
            if !self.images.contains_key(&src) {
                let img = HtmlImageElement::new()?;
                img.set_src(&src);
                self.images.insert(src, img);
            }
        }

        let mut actions = Vec::new();
        for (src, img) in &self.images {
            let settled = self.core.images.is_loaded(src) || self.core.images.is_failed(src);
            if settled || !img.complete() {
                continue;
            }
            if img.natural_width() > 0 {
                actions.push(self.core.mark_image_loaded(src));
            } else {
                actions.push(self.core.mark_image_failed(src));
            }
        }
        Ok(actions)
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let scene = self.core.scene();
        self.play(&scene)
    }

    fn play(&self, scene: &Scene) -> Result<(), JsValue> {
        let mut camera = Camera::default();
        let mut ctx = &self.ctx;
        let mut isolated = false;

        for cmd in &scene.commands {
            match cmd {
                DrawCommand::Begin { camera: cam, viewport_width, viewport_height } => {
                    camera = *cam;
                    self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0)?;
                    self.ctx.clear_rect(0.0, 0.0, *viewport_width, *viewport_height);
                    self.apply_camera(&self.ctx, &camera)?;
                }
                DrawCommand::BeginLayer(layer) => {
                    if layer.is_isolated() {
                        let w = f64::from(self.layer_canvas.width());
                        let h = f64::from(self.layer_canvas.height());
                        self.layer_ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
                        self.layer_ctx.clear_rect(0.0, 0.0, w, h);
                        self.apply_camera(&self.layer_ctx, &camera)?;
                        ctx = &self.layer_ctx;
                        isolated = true;
                    }
                }
                DrawCommand::EndLayer => {
                    ctx.set_global_composite_operation(CompositeOp::SourceOver.as_css())?;
                    if isolated {
                        self.ctx.save();
                        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
                        self.ctx.draw_image_with_html_canvas_element(&self.layer_canvas, 0.0, 0.0)?;
                        self.ctx.restore();
                        ctx = &self.ctx;
                        isolated = false;
                    }
                }
                DrawCommand::Composite(op) => ctx.set_global_composite_operation(op.as_css())?,
                DrawCommand::Path { points, closed, style } => draw_path(ctx, points, *closed, style)?,
                DrawCommand::FillRect { rect, color } => {
                    ctx.set_fill_style_str(color);
                    ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
                }
                DrawCommand::StrokeRect { rect, style } => draw_stroke_rect(ctx, rect, style)?,
                DrawCommand::Circle { center, radius, fill, stroke } => {
                    draw_circle(ctx, *center, *radius, fill.as_deref(), stroke.as_ref())?;
                }
                DrawCommand::Image { src, geom } => self.draw_image(ctx, src, geom)?,
                DrawCommand::Text { at, text, color, size } => {
                    ctx.set_fill_style_str(color);
                    ctx.set_text_align("center");
                    ctx.set_text_baseline("middle");
                    ctx.set_font(&format!("{size}px sans-serif"));
                    ctx.fill_text(text, at.x, at.y)?;
                }
            }
        }
        Ok(())
    }

    fn apply_camera(&self, ctx: &CanvasRenderingContext2d, camera: &Camera) -> Result<(), JsValue> {
        let scale = self.dpr * camera.zoom;
        ctx.set_transform(scale, 0.0, 0.0, scale, self.dpr * camera.pan_x, self.dpr * camera.pan_y)
    }

    fn draw_image(&self, ctx: &CanvasRenderingContext2d, src: &str, geom: &TokenGeometry) -> Result<(), JsValue> {
        let Some(img) = self.images.get(src) else {
            return Ok(());
        };
        let center = geom.center();
        ctx.save();
        ctx.translate(center.x, center.y)?;
        ctx.rotate(geom.rotation.to_radians())?;
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            -geom.width / 2.0,
            -geom.height / 2.0,
            geom.width,
            geom.height,
        )?;
        ctx.restore();
        Ok(())
    }
}

// =============================================================
// Primitives
// =============================================================

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn device_size(width_css: f64, height_css: f64, dpr: f64) -> (u32, u32) {
    let w = (width_css * dpr).round().max(0.0) as u32;
    let h = (height_css * dpr).round().max(0.0) as u32;
    (w, h)
}

fn apply_line_style(ctx: &CanvasRenderingContext2d, style: &LineStyle) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(&style.color);
    ctx.set_line_width(style.width);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    let dash_array = js_sys::Array::new();
    if let Some(dash) = style.dash {
        dash_array.push(&dash.into());
        dash_array.push(&dash.into());
    }
    ctx.set_line_dash(&dash_array)
}

fn draw_path(ctx: &CanvasRenderingContext2d, points: &[Point], closed: bool, style: &LineStyle) -> Result<(), JsValue> {
    let Some((first, rest)) = points.split_first() else {
        return Ok(());
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    if closed {
        ctx.close_path();
    }
    apply_line_style(ctx, style)?;
    ctx.stroke();
    Ok(())
}

fn draw_stroke_rect(ctx: &CanvasRenderingContext2d, rect: &Rect, style: &LineStyle) -> Result<(), JsValue> {
    apply_line_style(ctx, style)?;
    ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    Ok(())
}

fn draw_circle(
    ctx: &CanvasRenderingContext2d,
    center: Point,
    radius: f64,
    fill: Option<&str>,
    stroke: Option<&LineStyle>,
) -> Result<(), JsValue> {
    ctx.begin_path();
    ctx.arc(center.x, center.y, radius.max(0.0), 0.0, 2.0 * PI)?;
    if let Some(color) = fill {
        ctx.set_fill_style_str(color);
        ctx.fill();
    }
    if let Some(style) = stroke {
        apply_line_style(ctx, style)?;
        ctx.stroke();
    }
    Ok(())
}
