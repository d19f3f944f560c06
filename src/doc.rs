//! Document model: strokes, tokens, grid configuration and the map store.
//!
//! This module defines the data that makes up one map (`MapDocument`): two
//! ordered stroke lists (ink and fog), the token layer, and the grid
//! configuration. Everything here is stored in world space and is the exact
//! shape written to the embedded map-data block.
//!
//! The input engine mutates a `MapDocument` through the methods below; the
//! renderer reads it through `sorted_tokens` and the stroke lists; the save
//! bridge serializes a clone of it.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{DEFAULT_PIN_COLOR, DEFAULT_PIN_Z, DEFAULT_TOKEN_Z, IMAGE_TOKEN_SIZE, PIN_SIZE};

/// Unique identifier for a token.
pub type TokenId = Uuid;

// =============================================================
// Strokes
// =============================================================

/// What a stroke does to the surface it is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeTool {
    /// Normal paint on the ink layer.
    #[default]
    #[serde(alias = "brush")]
    Ink,
    /// Subtractive paint on the ink layer.
    Erase,
    /// Cuts a hole in the fog.
    FogReveal,
    /// Re-applies fog.
    FogShroud,
}

impl StrokeTool {
    /// Whether strokes made with this tool live on the fog surface.
    #[must_use]
    pub fn is_fog(self) -> bool {
        matches!(self, Self::FogReveal | Self::FogShroud)
    }

    /// Wire name, as written in the map block.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ink => "ink",
            Self::Erase => "erase",
            Self::FogReveal => "fog-reveal",
            Self::FogShroud => "fog-shroud",
        }
    }
}

/// Geometry of a stroke's point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeShape {
    /// A polyline that grows by one point per pointer-move sample.
    #[default]
    Freehand,
    /// Two corners, always exactly four coordinates.
    Rectangle,
}

fn default_stroke_color() -> String {
    "#000000".to_owned()
}

fn default_stroke_width() -> f64 {
    5.0
}

/// A single drawing record on the ink or fog surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Flattened `x, y` pairs in world coordinates.
    pub points: Vec<f64>,
    /// CSS color string.
    #[serde(default = "default_stroke_color", alias = "stroke")]
    pub color: String,
    /// Line width in world units.
    #[serde(default = "default_stroke_width", alias = "strokeWidth")]
    pub width: f64,
    #[serde(default)]
    pub tool: StrokeTool,
    #[serde(default)]
    pub shape: StrokeShape,
}

impl Stroke {
    /// Number of `(x, y)` pairs.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len() / 2
    }

    /// Iterate the stroke's points.
    pub fn iter_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.chunks_exact(2).map(|c| Point::new(c[0], c[1]))
    }

    /// For rectangle strokes, the normalized rectangle between the two corners.
    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        if self.shape != StrokeShape::Rectangle {
            return None;
        }
        match self.points.as_slice() {
            [x0, y0, x1, y1] => Some(Rect::from_corners(Point::new(*x0, *y0), Point::new(*x1, *y1))),
            _ => None,
        }
    }

    /// Rectangles made by erase and fog tools cover their whole area; ink
    /// rectangles are outlines.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.shape == StrokeShape::Rectangle && self.tool != StrokeTool::Ink
    }
}

// =============================================================
// Tokens
// =============================================================

/// What a token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// An image resolved by path.
    Image,
    /// A map pin, usually linked to a document entry.
    Pin,
}

/// Named z-order ranges that define paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ZLayer {
    /// Grid and background, 0 to 9.
    Base,
    /// Ink and drawings, 10 to 29.
    Surface,
    /// Tokens and assets, 30 to 59.
    Objects,
    /// Pins and notes, 60 to 79.
    Markers,
    /// Fog of war and effects, 90 to 99.
    Fog,
    /// Cursors and gizmos, 100.
    Interface,
}

impl ZLayer {
    pub const ALL: [ZLayer; 6] = [
        ZLayer::Base,
        ZLayer::Surface,
        ZLayer::Objects,
        ZLayer::Markers,
        ZLayer::Fog,
        ZLayer::Interface,
    ];

    /// Inclusive `(min, max)` z-order range of the bucket.
    #[must_use]
    pub fn range(self) -> (i64, i64) {
        match self {
            Self::Base => (0, 9),
            Self::Surface => (10, 29),
            Self::Objects => (30, 59),
            Self::Markers => (60, 79),
            Self::Fog => (90, 99),
            Self::Interface => (100, 100),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Surface => "surface",
            Self::Objects => "objects",
            Self::Markers => "markers",
            Self::Fog => "fog",
            Self::Interface => "ui",
        }
    }

    /// The bucket containing `z`, if any. 80 to 89 is unassigned.
    #[must_use]
    pub fn of(z: i64) -> Option<ZLayer> {
        Self::ALL.into_iter().find(|layer| {
            let (min, max) = layer.range();
            (min..=max).contains(&z)
        })
    }

    /// Default z-order for tokens of `kind`.
    #[must_use]
    pub fn default_z(kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Image => DEFAULT_TOKEN_Z,
            TokenKind::Pin => DEFAULT_PIN_Z,
        }
    }
}

/// A placed entity on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: TokenId,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    pub kind: TokenKind,
    /// Paint order; see [`ZLayer`].
    pub z_order: i64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    #[serde(default)]
    pub rotation: f64,
    /// Image path for image tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
}

impl Token {
    /// Unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }
}

/// Everything needed to place a new token; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDraft {
    pub kind: TokenKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    /// Explicit z-order; `None` uses the kind's default bucket.
    pub z_order: Option<i64>,
    pub src: Option<String>,
    pub linked_entry_id: Option<String>,
    pub color: Option<String>,
    pub label: Option<String>,
    pub blurb: Option<String>,
}

impl TokenDraft {
    /// An image token of the default size centered on `center`.
    #[must_use]
    pub fn image(src: impl Into<String>, center: Point) -> Self {
        Self::image_sized(src, center, IMAGE_TOKEN_SIZE, IMAGE_TOKEN_SIZE)
    }

    /// An image token of the given size centered on `center`.
    #[must_use]
    pub fn image_sized(src: impl Into<String>, center: Point, width: f64, height: f64) -> Self {
        Self {
            kind: TokenKind::Image,
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
            rotation: 0.0,
            z_order: None,
            src: Some(src.into()),
            linked_entry_id: None,
            color: None,
            label: None,
            blurb: None,
        }
    }

    /// A pin linked to a document entry, centered on `center`.
    #[must_use]
    pub fn pin(entry_id: impl Into<String>, title: impl Into<String>, center: Point) -> Self {
        Self {
            kind: TokenKind::Pin,
            x: center.x - PIN_SIZE / 2.0,
            y: center.y - PIN_SIZE / 2.0,
            width: PIN_SIZE,
            height: PIN_SIZE,
            rotation: 0.0,
            z_order: None,
            src: None,
            linked_entry_id: Some(entry_id.into()),
            color: Some(DEFAULT_PIN_COLOR.to_owned()),
            label: Some(title.into()),
            blurb: None,
        }
    }
}

/// Sparse update for a token. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
}

impl TokenPatch {
    /// A patch that only moves a token.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// Whether applying this patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================
// Grid
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    None,
    #[default]
    Square,
    Hex,
}

/// Real-world unit one grid cell represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    #[default]
    Ft,
    M,
    Km,
    Mi,
}

impl UnitType {
    #[must_use]
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Ft => "ft",
            Self::M => "m",
            Self::Km => "km",
            Self::Mi => "mi",
        }
    }
}

/// Grid configuration. Replaced wholesale on edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(rename = "type")]
    pub grid_type: GridType,
    /// Multiplier on the base cell size.
    pub scale: f64,
    /// How many `unit_type` units one cell spans.
    pub unit_number: u32,
    pub unit_type: UnitType,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { grid_type: GridType::Square, scale: 1.0, unit_number: 5, unit_type: UnitType::Ft }
    }
}

// =============================================================
// MapDocument
// =============================================================

/// One map: the single in-memory source of truth for a map session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    /// Ink layer strokes, in paint order.
    #[serde(default, alias = "lines")]
    pub strokes: Vec<Stroke>,
    /// Fog layer strokes, in paint order.
    #[serde(default)]
    pub fog_strokes: Vec<Stroke>,
    /// Tokens in insertion order.
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub grid: GridConfig,
}

impl MapDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished stroke to the list its tool belongs to.
    pub fn commit_stroke(&mut self, stroke: Stroke) {
        if stroke.tool.is_fog() {
            self.fog_strokes.push(stroke);
        } else {
            self.strokes.push(stroke);
        }
    }

    /// Place a new token and return a copy of it.
    pub fn add_token(&mut self, draft: TokenDraft) -> Token {
        let token = Token {
            id: self.fresh_id(),
            x: draft.x,
            y: draft.y,
            kind: draft.kind,
            z_order: draft.z_order.unwrap_or_else(|| ZLayer::default_z(draft.kind)),
            width: draft.width,
            height: draft.height,
            rotation: draft.rotation,
            src: draft.src,
            linked_entry_id: draft.linked_entry_id,
            color: draft.color,
            label: draft.label,
            blurb: draft.blurb,
        };
        self.tokens.push(token.clone());
        token
    }

    fn fresh_id(&self) -> TokenId {
        loop {
            let id = Uuid::new_v4();
            if self.token(&id).is_none() {
                return id;
            }
        }
    }

    /// Apply a partial update. Returns false if the token doesn't exist.
    pub fn update_token(&mut self, id: &TokenId, patch: &TokenPatch) -> bool {
        let Some(token) = self.tokens.iter_mut().find(|t| t.id == *id) else {
            return false;
        };
        if let Some(x) = patch.x {
            token.x = x;
        }
        if let Some(y) = patch.y {
            token.y = y;
        }
        if let Some(w) = patch.width {
            token.width = w;
        }
        if let Some(h) = patch.height {
            token.height = h;
        }
        if let Some(r) = patch.rotation {
            token.rotation = r;
        }
        if let Some(z) = patch.z_order {
            token.z_order = z;
        }
        if let Some(ref src) = patch.src {
            token.src = Some(src.clone());
        }
        if let Some(ref entry) = patch.linked_entry_id {
            token.linked_entry_id = Some(entry.clone());
        }
        if let Some(ref color) = patch.color {
            token.color = Some(color.clone());
        }
        if let Some(ref label) = patch.label {
            token.label = Some(label.clone());
        }
        if let Some(ref blurb) = patch.blurb {
            token.blurb = Some(blurb.clone());
        }
        true
    }

    /// Remove a token by id, returning it if it was present.
    pub fn delete_token(&mut self, id: &TokenId) -> Option<Token> {
        let idx = self.tokens.iter().position(|t| t.id == *id)?;
        Some(self.tokens.remove(idx))
    }

    #[must_use]
    pub fn token(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == *id)
    }

    /// Tokens in paint order: ascending `z_order`, ties in insertion order.
    #[must_use]
    pub fn sorted_tokens(&self) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self.tokens.iter().collect();
        tokens.sort_by_key(|t| t.z_order);
        tokens
    }

    /// Returns `true` if the map has no strokes and no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.fog_strokes.is_empty() && self.tokens.is_empty()
    }
}
