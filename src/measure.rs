//! Measurement ruler: a two-click, never-persisted distance tool.
//!
//! Lifecycle: no session, first click starts one (`start == end`), pointer
//! moves rubber-band `end`, the second click freezes it, and the next click
//! throws the finished session away and starts over.

#[cfg(test)]
#[path = "measure_test.rs"]
mod measure_test;

use crate::camera::Point;
use crate::consts::{MEASURE_LABEL_OFFSET_PX, MEASURE_PX_PER_UNIT, MEASURE_TICK_PX};
use crate::doc::GridConfig;
use crate::grid::Segment;

/// One ruler measurement in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub start: Point,
    pub end: Point,
    pub finalized: bool,
}

impl Measurement {
    #[must_use]
    pub fn begin(at: Point) -> Self {
        Self { start: at, end: at, finalized: false }
    }

    /// Euclidean length in world units.
    #[must_use]
    pub fn pixel_distance(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Length converted to the grid's real-world unit.
    #[must_use]
    pub fn units(&self, grid: &GridConfig) -> f64 {
        pixels_to_units(self.pixel_distance(), grid)
    }

    /// Display text such as `"12.5 ft"`.
    #[must_use]
    pub fn label(&self, grid: &GridConfig) -> String {
        format!("{:.1} {}", self.units(grid), grid.unit_type.abbrev())
    }
}

/// Convert a world distance to grid units: one cell edge of 100 world units
/// at grid scale 1 equals `unit_number` units.
#[must_use]
pub fn pixels_to_units(pixel_distance: f64, grid: &GridConfig) -> f64 {
    (pixel_distance / (MEASURE_PX_PER_UNIT * grid.scale)) * f64::from(grid.unit_number)
}

/// The measure tool's session state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ruler {
    session: Option<Measurement>,
}

impl Ruler {
    #[must_use]
    pub fn session(&self) -> Option<&Measurement> {
        self.session.as_ref()
    }

    /// Handle a click at world point `at`.
    pub fn click(&mut self, at: Point) {
        match self.session.as_mut() {
            Some(m) if !m.finalized => {
                m.end = at;
                m.finalized = true;
            }
            _ => self.session = Some(Measurement::begin(at)),
        }
    }

    /// Track the pointer. Returns true if the session changed.
    pub fn track(&mut self, at: Point) -> bool {
        match self.session.as_mut() {
            Some(m) if !m.finalized => {
                m.end = at;
                true
            }
            _ => false,
        }
    }

    /// Drop any session. Returns true if there was one.
    pub fn clear(&mut self) -> bool {
        self.session.take().is_some()
    }
}

/// Everything needed to draw a ruler.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerGeometry {
    /// The measured line (drawn dashed).
    pub line: Segment,
    /// One perpendicular tick through each endpoint.
    pub ticks: [Segment; 2],
    /// Label anchor: the midpoint pushed off the line along its normal.
    pub label_at: Point,
    pub label: String,
}

/// Build ruler geometry. Tick and label offsets are fixed in screen pixels.
#[must_use]
pub fn ruler_geometry(m: &Measurement, grid: &GridConfig, zoom: f64) -> RulerGeometry {
    let normal = unit_normal(m.start, m.end);
    let tick = MEASURE_TICK_PX / zoom;
    let tick_through = |p: Point| {
        Segment::new(
            Point::new(p.x - normal.x * tick, p.y - normal.y * tick),
            Point::new(p.x + normal.x * tick, p.y + normal.y * tick),
        )
    };
    let offset = MEASURE_LABEL_OFFSET_PX / zoom;
    let mid = Point::new((m.start.x + m.end.x) / 2.0, (m.start.y + m.end.y) / 2.0);

    RulerGeometry {
        line: Segment::new(m.start, m.end),
        ticks: [tick_through(m.start), tick_through(m.end)],
        label_at: Point::new(mid.x + normal.x * offset, mid.y + normal.y * offset),
        label: m.label(grid),
    }
}

/// Unit vector perpendicular to `a -> b`; straight up for a zero-length line.
fn unit_normal(a: Point, b: Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len == 0.0 {
        return Point::new(0.0, -1.0);
    }
    Point::new(-dy / len, dx / len)
}
