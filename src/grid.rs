//! Grid geometry: square and hex tilings derived purely from configuration.
//!
//! Nothing here is stored. The renderer calls [`grid_geometry`] every frame
//! with the current [`GridConfig`] and the visible world rectangle; the
//! result is clipped to the world bounds so panning far away never produces
//! unbounded work.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use crate::camera::{Point, Rect};
use crate::consts::{CROSSHAIR_HALF, GRID_BASE_SPACING, MIN_GRID_CELL_PX, WORLD_HALF_EXTENT};
use crate::doc::{GridConfig, GridType};

/// A straight line between two world points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }
}

/// Everything the renderer needs to draw the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridGeometry {
    /// Square grid lines.
    pub lines: Vec<Segment>,
    /// Hex cell outlines, six vertices each.
    pub hexagons: Vec<[Point; 6]>,
    /// Orientation marker at the world origin.
    pub crosshair: Option<[Segment; 2]>,
}

/// The world rectangle grids are confined to.
#[must_use]
pub fn world_bounds() -> Rect {
    Rect::new(
        -WORLD_HALF_EXTENT,
        -WORLD_HALF_EXTENT,
        WORLD_HALF_EXTENT * 2.0,
        WORLD_HALF_EXTENT * 2.0,
    )
}

/// Distance between square grid lines (and hex column pitch), in world units.
#[must_use]
pub fn cell_spacing(config: &GridConfig) -> f64 {
    GRID_BASE_SPACING * config.scale
}

/// Circumradius of a hex cell.
#[must_use]
pub fn hex_size(config: &GridConfig) -> f64 {
    cell_spacing(config) / 3.0_f64.sqrt()
}

/// Vertices of a pointy-top hexagon centered on `center`.
#[must_use]
pub fn hex_vertices(center: Point, size: f64) -> [Point; 6] {
    std::array::from_fn(|i| {
        let angle = (60.0 * i as f64 - 30.0).to_radians();
        Point::new(center.x + size * angle.cos(), center.y + size * angle.sin())
    })
}

/// Center of hex cell `(row, col)`; odd rows shift right by half a cell.
#[must_use]
pub fn hex_center(row: i64, col: i64, size: f64) -> Point {
    let width = 3.0_f64.sqrt() * size;
    let shift = if row.rem_euclid(2) == 1 { width / 2.0 } else { 0.0 };
    Point::new(col as f64 * width + shift, row as f64 * size * 1.5)
}

/// Build grid geometry for the part of the world inside `visible`.
///
/// `zoom` is only used to skip cells too small to see.
#[must_use]
pub fn grid_geometry(config: &GridConfig, visible: Rect, zoom: f64) -> GridGeometry {
    if config.grid_type == GridType::None {
        return GridGeometry::default();
    }

    let mut geometry = GridGeometry { crosshair: Some(crosshair()), ..Default::default() };
    let spacing = cell_spacing(config);
    if spacing.is_nan() || spacing <= 0.0 || spacing * zoom < MIN_GRID_CELL_PX {
        return geometry;
    }
    let Some(bounds) = visible.intersect(&world_bounds()) else {
        return geometry;
    };

    match config.grid_type {
        GridType::Square => geometry.lines = square_lines(bounds, spacing),
        GridType::Hex => geometry.hexagons = hex_cells(bounds, hex_size(config)),
        GridType::None => {}
    }
    geometry
}

fn crosshair() -> [Segment; 2] {
    [
        Segment::new(Point::new(-CROSSHAIR_HALF, 0.0), Point::new(CROSSHAIR_HALF, 0.0)),
        Segment::new(Point::new(0.0, -CROSSHAIR_HALF), Point::new(0.0, CROSSHAIR_HALF)),
    ]
}

#[allow(clippy::cast_possible_truncation)]
fn square_lines(bounds: Rect, spacing: f64) -> Vec<Segment> {
    let mut lines = Vec::new();

    let first_col = (bounds.x / spacing).ceil() as i64;
    let last_col = (bounds.right() / spacing).floor() as i64;
    for k in first_col..=last_col {
        let x = k as f64 * spacing;
        lines.push(Segment::new(Point::new(x, bounds.y), Point::new(x, bounds.bottom())));
    }

    let first_row = (bounds.y / spacing).ceil() as i64;
    let last_row = (bounds.bottom() / spacing).floor() as i64;
    for k in first_row..=last_row {
        let y = k as f64 * spacing;
        lines.push(Segment::new(Point::new(bounds.x, y), Point::new(bounds.right(), y)));
    }

    lines
}

#[allow(clippy::cast_possible_truncation)]
fn hex_cells(bounds: Rect, size: f64) -> Vec<[Point; 6]> {
    let width = 3.0_f64.sqrt() * size;
    let row_height = size * 1.5;
    let world = world_bounds();

    let first_row = ((bounds.y - size) / row_height).floor() as i64;
    let last_row = ((bounds.bottom() + size) / row_height).ceil() as i64;
    let first_col = ((bounds.x - width) / width).floor() as i64;
    let last_col = ((bounds.right() + width) / width).ceil() as i64;

    let mut cells = Vec::new();
    for row in first_row..=last_row {
        for col in first_col..=last_col {
            let center = hex_center(row, col, size);
            if !world.contains(center) {
                continue;
            }
            let cell = Rect::new(center.x - width / 2.0, center.y - size, width, size * 2.0);
            if cell.intersect(&bounds).is_some() {
                cells.push(hex_vertices(center, size));
            }
        }
    }
    cells
}
