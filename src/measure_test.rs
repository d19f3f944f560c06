#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{GridType, UnitType};

const EPSILON: f64 = 1e-9;

fn grid(scale: f64, unit_number: u32, unit_type: UnitType) -> GridConfig {
    GridConfig { grid_type: GridType::Square, scale, unit_number, unit_type }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Unit conversion
// =============================================================

#[test]
fn hundred_pixels_is_one_cell_at_scale_one() {
    let g = grid(1.0, 5, UnitType::Ft);
    assert!((pixels_to_units(100.0, &g) - 5.0).abs() < EPSILON);
    let m = Measurement { start: pt(0.0, 0.0), end: pt(100.0, 0.0), finalized: true };
    assert_eq!(m.label(&g), "5.0 ft");
}

#[test]
fn grid_scale_stretches_units() {
    let g = grid(2.0, 10, UnitType::M);
    assert!((pixels_to_units(100.0, &g) - 5.0).abs() < EPSILON);
    assert!((pixels_to_units(400.0, &g) - 20.0).abs() < EPSILON);
}

#[test]
fn diagonal_distance_is_euclidean() {
    let m = Measurement { start: pt(0.0, 0.0), end: pt(300.0, 400.0), finalized: false };
    assert!((m.pixel_distance() - 500.0).abs() < EPSILON);
    assert_eq!(m.label(&grid(1.0, 1, UnitType::Mi)), "5.0 mi");
}

#[test]
fn label_rounds_to_one_decimal() {
    let m = Measurement { start: pt(0.0, 0.0), end: pt(34.0, 0.0), finalized: true };
    assert_eq!(m.label(&grid(1.0, 5, UnitType::Km)), "1.7 km");
}

// =============================================================
// Ruler state machine
// =============================================================

#[test]
fn first_click_starts_pending_session() {
    let mut r = Ruler::default();
    assert!(r.session().is_none());
    r.click(pt(10.0, 10.0));
    let m = r.session().unwrap();
    assert_eq!(m.start, pt(10.0, 10.0));
    assert_eq!(m.end, pt(10.0, 10.0));
    assert!(!m.finalized);
}

#[test]
fn moves_rubber_band_until_second_click() {
    let mut r = Ruler::default();
    r.click(pt(0.0, 0.0));
    assert!(r.track(pt(5.0, 5.0)));
    assert_eq!(r.session().unwrap().end, pt(5.0, 5.0));
    r.click(pt(20.0, 0.0));
    let m = *r.session().unwrap();
    assert!(m.finalized);
    assert_eq!(m.end, pt(20.0, 0.0));
    assert!(!r.track(pt(99.0, 99.0)));
    assert_eq!(r.session().unwrap().end, pt(20.0, 0.0));
}

#[test]
fn click_after_finalized_starts_fresh() {
    let mut r = Ruler::default();
    r.click(pt(0.0, 0.0));
    r.click(pt(10.0, 0.0));
    r.click(pt(50.0, 50.0));
    let m = r.session().unwrap();
    assert_eq!(m.start, pt(50.0, 50.0));
    assert_eq!(m.end, pt(50.0, 50.0));
    assert!(!m.finalized);
}

#[test]
fn track_without_session_is_noop() {
    let mut r = Ruler::default();
    assert!(!r.track(pt(1.0, 1.0)));
    assert!(r.session().is_none());
}

#[test]
fn clear_drops_session() {
    let mut r = Ruler::default();
    assert!(!r.clear());
    r.click(pt(0.0, 0.0));
    assert!(r.clear());
    assert!(r.session().is_none());
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn ticks_are_perpendicular_to_line() {
    let m = Measurement { start: pt(0.0, 0.0), end: pt(100.0, 0.0), finalized: true };
    let g = ruler_geometry(&m, &GridConfig::default(), 1.0);
    for tick in g.ticks {
        let tx = tick.b.x - tick.a.x;
        let ty = tick.b.y - tick.a.y;
        // Dot product with the line direction is zero.
        assert!((tx * 100.0 + ty * 0.0).abs() < EPSILON);
        assert!((tx.hypot(ty) - 16.0).abs() < EPSILON);
    }
    assert_eq!(g.ticks[0].a.x, 0.0);
    assert_eq!(g.ticks[1].a.x, 100.0);
}

#[test]
fn label_sits_off_the_midpoint() {
    let m = Measurement { start: pt(0.0, 0.0), end: pt(100.0, 0.0), finalized: true };
    let g = ruler_geometry(&m, &GridConfig::default(), 2.0);
    assert!((g.label_at.x - 50.0).abs() < EPSILON);
    assert!((g.label_at.y.abs() - 8.0).abs() < EPSILON);
    assert_eq!(g.label, "5.0 ft");
}

#[test]
fn zero_length_ruler_has_finite_geometry() {
    let m = Measurement::begin(pt(3.0, 3.0));
    let g = ruler_geometry(&m, &GridConfig::default(), 1.0);
    assert!(g.ticks.iter().all(|t| t.a.x.is_finite() && t.a.y.is_finite()));
    assert_eq!(g.label, "0.0 ft");
}
