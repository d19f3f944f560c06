//! Input model for the map canvas.
//!
//! [`Tool`] and [`UiState`] describe what the user has armed: the active
//! tool, brush, stamp and selection. [`InputState`] is the gesture in flight
//! between pointer-down and pointer-up. A stroke gesture owns its
//! [`StrokeBuilder`], so the shape chosen at pointer-down holds for the
//! whole stroke even if the brush settings change mid-drag.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{StrokeTool, TokenId};
use crate::hit::{ResizeAnchor, TokenGeometry};
use crate::surface::{BrushSettings, StrokeBuilder};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Select, move and transform tokens.
    Select,
    /// Drag the view around.
    #[default]
    Pan,
    /// Two-click ruler.
    Measure,
    /// Ink brush.
    Brush,
    /// Ink eraser.
    Erase,
    /// Ink rectangles (walls of a room).
    Room,
    /// Cut holes in the fog.
    FogReveal,
    /// Paint fog back.
    FogShroud,
    /// Place the active stamp as an image token.
    Stamp,
}

impl Tool {
    /// The stroke kind this tool draws, if it is a drawing tool.
    #[must_use]
    pub fn stroke_tool(self) -> Option<StrokeTool> {
        match self {
            Self::Brush | Self::Room => Some(StrokeTool::Ink),
            Self::Erase => Some(StrokeTool::Erase),
            Self::FogReveal => Some(StrokeTool::FogReveal),
            Self::FogShroud => Some(StrokeTool::FogShroud),
            Self::Select | Self::Pan | Self::Measure | Self::Stamp => None,
        }
    }

    /// Whether this tool draws strokes.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        self.stroke_tool().is_some()
    }

    /// CSS cursor shown while the tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Pan => "grab",
            Self::Brush | Self::Erase | Self::Room | Self::FogReveal | Self::FogShroud => "none",
            Self::Measure | Self::Stamp => "crosshair",
            Self::Select => "default",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Something dropped onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    /// An image file; `path` is resolved by the host.
    ImageFile { path: String },
    /// A link to a document entry.
    EntryLink { entry_id: String, title: String },
}

/// A predefined image placed by the stamp tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The id of the currently selected token, if any.
    pub selected_id: Option<TokenId>,
    /// Toolbar brush parameters.
    pub brush: BrushSettings,
    /// Image placed by the stamp tool.
    pub stamp: Option<Stamp>,
    /// Last pointer position in world space, `None` once the pointer leaves.
    pub pointer_world: Option<Point>,
    /// Last pointer position in screen space.
    pub pointer_screen: Option<Point>,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the view (pan tool or middle button).
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// The user is drawing a stroke on the ink or fog surface.
    Drawing {
        /// The stroke under construction.
        builder: StrokeBuilder,
    },
    /// The user is moving a token. Only position changes.
    DraggingToken {
        id: TokenId,
        /// World-space pointer position at the previous event.
        last_world: Point,
        /// Token x at the start of the drag.
        orig_x: f64,
        /// Token y at the start of the drag.
        orig_y: f64,
    },
    /// The user is dragging one of a token's resize handles.
    ResizingToken {
        id: TokenId,
        anchor: ResizeAnchor,
        /// Geometry at the start of the gesture.
        orig: TokenGeometry,
        /// Geometry that will be committed on release.
        preview: TokenGeometry,
    },
    /// The user is dragging a token's rotate handle.
    RotatingToken {
        id: TokenId,
        /// Geometry at the start of the gesture; its center is the pivot.
        orig: TokenGeometry,
        /// Geometry that will be committed on release.
        preview: TokenGeometry,
    },
}

impl InputState {
    /// Provisional geometry for a token mid-transform, if any.
    #[must_use]
    pub fn transform_preview(&self, token_id: &TokenId) -> Option<TokenGeometry> {
        match self {
            Self::ResizingToken { id, preview, .. } | Self::RotatingToken { id, preview, .. } if id == token_id => {
                Some(*preview)
            }
            _ => None,
        }
    }
}
