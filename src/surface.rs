//! Drawing surfaces: stroke construction and compositing rules.
//!
//! Two surfaces share the [`Stroke`] record. The ink surface paints normally
//! and erases with destination-out. The fog surface starts as an opaque sheet
//! over the world bounds; reveal strokes cut it with destination-out and
//! shroud strokes paint it back with source-over. Because both fog tools share
//! one ordered list, replaying the list reproduces the exact history.
//!
//! The coverage helpers at the bottom evaluate those rules at a single world
//! point. The renderer does not use them; they exist so hosts (and tests) can
//! ask "is this point fogged?" without a raster backend.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::camera::Point;
use crate::doc::{Stroke, StrokeShape, StrokeTool};

/// How a stroke combines with the pixels already on its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    /// Normal alpha blending.
    SourceOver,
    /// Removes destination where the source is opaque.
    DestinationOut,
}

impl CompositeOp {
    /// Canvas `globalCompositeOperation` name.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::DestinationOut => "destination-out",
        }
    }

    /// Composite operation a stroke made with `tool` is drawn with.
    #[must_use]
    pub fn for_tool(tool: StrokeTool) -> Self {
        match tool {
            StrokeTool::Ink | StrokeTool::FogShroud => Self::SourceOver,
            StrokeTool::Erase | StrokeTool::FogReveal => Self::DestinationOut,
        }
    }
}

/// Color of the fog sheet and of shroud strokes.
pub const FOG_COLOR: &str = "#000000";

/// Brush parameters chosen in the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushSettings {
    /// Ink color.
    pub color: String,
    /// Ink width in world units. The eraser is twice as wide.
    pub size: f64,
    /// Width of fog reveal/shroud strokes in world units.
    pub fog_size: f64,
    /// Shape used by the brush, erase and fog tools. The room tool always draws rectangles.
    pub shape: StrokeShape,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self { color: "#000000".to_owned(), size: 5.0, fog_size: 40.0, shape: StrokeShape::Freehand }
    }
}

impl BrushSettings {
    /// Color and width a new stroke made with `tool` gets.
    #[must_use]
    pub fn style_for(&self, tool: StrokeTool) -> (String, f64) {
        match tool {
            StrokeTool::Ink => (self.color.clone(), self.size),
            StrokeTool::Erase => (FOG_COLOR.to_owned(), self.size * 2.0),
            StrokeTool::FogReveal | StrokeTool::FogShroud => (FOG_COLOR.to_owned(), self.fog_size),
        }
    }
}

/// A stroke under construction between pointer-down and pointer-up.
///
/// The shape is fixed when the builder is created; later toolbar changes do
/// not affect a gesture already in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeBuilder {
    stroke: Stroke,
}

impl StrokeBuilder {
    /// Start a stroke at world point `at`.
    #[must_use]
    pub fn begin(tool: StrokeTool, shape: StrokeShape, at: Point, brush: &BrushSettings) -> Self {
        let (color, width) = brush.style_for(tool);
        let points = match shape {
            StrokeShape::Freehand => vec![at.x, at.y],
            StrokeShape::Rectangle => vec![at.x, at.y, at.x, at.y],
        };
        Self { stroke: Stroke { points, color, width, tool, shape } }
    }

    /// Feed a pointer-move sample.
    ///
    /// Freehand strokes grow by one point; rectangles move their second corner.
    pub fn extend(&mut self, at: Point) {
        match self.stroke.shape {
            StrokeShape::Freehand => {
                self.stroke.points.push(at.x);
                self.stroke.points.push(at.y);
            }
            StrokeShape::Rectangle => {
                let n = self.stroke.points.len();
                self.stroke.points[n - 2] = at.x;
                self.stroke.points[n - 1] = at.y;
            }
        }
    }

    /// The stroke as it currently stands.
    #[must_use]
    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    /// Finish the gesture and hand back the stroke for committing.
    #[must_use]
    pub fn finish(self) -> Stroke {
        self.stroke
    }
}

// =============================================================
// Point coverage
// =============================================================

/// Whether `stroke` paints the world point `p`.
#[must_use]
pub fn stroke_covers(stroke: &Stroke, p: Point) -> bool {
    let half = stroke.width / 2.0;
    if let Some(rect) = stroke.rect() {
        if stroke.is_filled() {
            return p.x >= rect.x - half
                && p.x <= rect.right() + half
                && p.y >= rect.y - half
                && p.y <= rect.bottom() + half;
        }
        let corners = [
            Point::new(rect.x, rect.y),
            Point::new(rect.right(), rect.y),
            Point::new(rect.right(), rect.bottom()),
            Point::new(rect.x, rect.bottom()),
        ];
        return (0..4).any(|i| dist_to_segment(p, corners[i], corners[(i + 1) % 4]) <= half);
    }

    let points: Vec<Point> = stroke.iter_points().collect();
    match points.as_slice() {
        [] => false,
        [only] => only.distance(p) <= half,
        _ => points.windows(2).any(|w| dist_to_segment(p, w[0], w[1]) <= half),
    }
}

/// Fog opacity (0 = revealed, 1 = fully fogged) at `p` after replaying `fog_strokes`.
///
/// An empty list means the map has no fog.
#[must_use]
pub fn fog_opacity_at(fog_strokes: &[Stroke], p: Point) -> f64 {
    if fog_strokes.is_empty() {
        return 0.0;
    }
    fog_strokes
        .iter()
        .filter(|s| stroke_covers(s, p))
        .fold(1.0, |_, s| match CompositeOp::for_tool(s.tool) {
            CompositeOp::DestinationOut => 0.0,
            CompositeOp::SourceOver => 1.0,
        })
}

/// Color left on the ink layer at `p`, or `None` if nothing (or an eraser) is on top.
#[must_use]
pub fn ink_at(strokes: &[Stroke], p: Point) -> Option<&str> {
    strokes
        .iter()
        .filter(|s| stroke_covers(s, p))
        .fold(None, |_, s| match CompositeOp::for_tool(s.tool) {
            CompositeOp::DestinationOut => None,
            CompositeOp::SourceOver => Some(s.color.as_str()),
        })
}

fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
