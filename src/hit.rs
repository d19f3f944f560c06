#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{HANDLE_RADIUS_PX, MIN_TOKEN_SIZE, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{MapDocument, Token, TokenId};

/// Which part of a token was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// Handles in the order returned by [`resize_handle_positions`].
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];

    /// Unit offset of the handle from the box center, in `-1..=1` per axis.
    fn unit_offset(self) -> (f64, f64) {
        match self {
            Self::N => (0.0, -1.0),
            Self::Ne => (1.0, -1.0),
            Self::E => (1.0, 0.0),
            Self::Se => (1.0, 1.0),
            Self::S => (0.0, 1.0),
            Self::Sw => (-1.0, 1.0),
            Self::W => (-1.0, 0.0),
            Self::Nw => (-1.0, -1.0),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub token_id: TokenId,
    pub part: HitPart,
}

/// Position, size and rotation of a token, separate from its identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl TokenGeometry {
    #[must_use]
    pub fn of(token: &Token) -> Self {
        Self { x: token.x, y: token.y, width: token.width, height: token.height, rotation: token.rotation }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Test which token (if any) is under `world_pt`.
///
/// Handles of the selected token win over bodies; bodies are tested top-most
/// first. Tokens for which `hittable` returns false are skipped.
#[must_use]
pub fn hit_test<F>(
    world_pt: Point,
    doc: &MapDocument,
    camera: &Camera,
    selected_id: Option<TokenId>,
    hittable: F,
) -> Option<Hit>
where
    F: Fn(&Token) -> bool,
{
    if let Some(token) = selected_id.and_then(|id| doc.token(&id)) {
        if hittable(token) {
            if let Some(part) = handle_at(world_pt, &TokenGeometry::of(token), camera.zoom) {
                return Some(Hit { token_id: token.id, part });
            }
        }
    }

    doc.sorted_tokens()
        .into_iter()
        .rev()
        .filter(|t| hittable(t))
        .find(|t| point_in_token(world_pt, &TokenGeometry::of(t)))
        .map(|t| Hit { token_id: t.id, part: HitPart::Body })
}

fn handle_at(world_pt: Point, geom: &TokenGeometry, zoom: f64) -> Option<HitPart> {
    let slop = HANDLE_RADIUS_PX / zoom;
    if rotate_handle_position(geom, zoom).distance(world_pt) <= slop {
        return Some(HitPart::RotateHandle);
    }
    resize_handle_positions(geom)
        .into_iter()
        .zip(ResizeAnchor::ALL)
        .find(|(pos, _)| pos.distance(world_pt) <= slop)
        .map(|(_, anchor)| HitPart::ResizeHandle(anchor))
}

/// Whether `world_pt` lies inside the (rotated) token box.
#[must_use]
pub fn point_in_token(world_pt: Point, geom: &TokenGeometry) -> bool {
    let local = to_local(world_pt, geom.center(), geom.rotation);
    local.x.abs() <= geom.width / 2.0 && local.y.abs() <= geom.height / 2.0
}

/// World positions of the eight resize handles, in [`ResizeAnchor::ALL`] order.
#[must_use]
pub fn resize_handle_positions(geom: &TokenGeometry) -> [Point; 8] {
    let center = geom.center();
    ResizeAnchor::ALL.map(|anchor| {
        let (ux, uy) = anchor.unit_offset();
        let local = Point::new(ux * geom.width / 2.0, uy * geom.height / 2.0);
        from_local(local, center, geom.rotation)
    })
}

/// World position of the rotate handle, a fixed screen distance above the N edge.
#[must_use]
pub fn rotate_handle_position(geom: &TokenGeometry, zoom: f64) -> Point {
    let local = Point::new(0.0, -geom.height / 2.0 - ROTATE_HANDLE_OFFSET_PX / zoom);
    from_local(local, geom.center(), geom.rotation)
}

/// New geometry after dragging `anchor` of `orig` to `world_pt`.
///
/// The opposite edge stays fixed; sizes never drop below [`MIN_TOKEN_SIZE`].
#[must_use]
pub fn resize_geometry(orig: &TokenGeometry, anchor: ResizeAnchor, world_pt: Point) -> TokenGeometry {
    let center = orig.center();
    let p = to_local(world_pt, center, orig.rotation);
    let (ux, uy) = anchor.unit_offset();

    let mut left = -orig.width / 2.0;
    let mut right = orig.width / 2.0;
    let mut top = -orig.height / 2.0;
    let mut bottom = orig.height / 2.0;

    if ux > 0.0 {
        right = p.x.max(left + MIN_TOKEN_SIZE);
    } else if ux < 0.0 {
        left = p.x.min(right - MIN_TOKEN_SIZE);
    }
    if uy > 0.0 {
        bottom = p.y.max(top + MIN_TOKEN_SIZE);
    } else if uy < 0.0 {
        top = p.y.min(bottom - MIN_TOKEN_SIZE);
    }

    let width = right - left;
    let height = bottom - top;
    let new_center = from_local(Point::new((left + right) / 2.0, (top + bottom) / 2.0), center, orig.rotation);
    TokenGeometry {
        x: new_center.x - width / 2.0,
        y: new_center.y - height / 2.0,
        width,
        height,
        rotation: orig.rotation,
    }
}

/// Rotation in degrees `[0, 360)` that points the rotate handle at `world_pt`.
#[must_use]
pub fn rotation_toward(center: Point, world_pt: Point) -> f64 {
    let deg = (world_pt.y - center.y).atan2(world_pt.x - center.x).to_degrees() + 90.0;
    deg.rem_euclid(360.0)
}

fn to_local(world_pt: Point, center: Point, rotation_deg: f64) -> Point {
    let (sin, cos) = (-rotation_deg.to_radians()).sin_cos();
    let dx = world_pt.x - center.x;
    let dy = world_pt.y - center.y;
    Point::new(dx * cos - dy * sin, dx * sin + dy * cos)
}

fn from_local(local: Point, center: Point, rotation_deg: f64) -> Point {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    Point::new(
        center.x + local.x * cos - local.y * sin,
        center.y + local.x * sin + local.y * cos,
    )
}
