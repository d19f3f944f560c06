//! Shared numeric constants for the map engine.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// Multiplier applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

// ── World ───────────────────────────────────────────────────────

/// Half extent of the drawable world; the fog sheet and grid span ±this value.
pub const WORLD_HALF_EXTENT: f64 = 5000.0;

// ── Z-order buckets ─────────────────────────────────────────────

/// Default z-order for image tokens (start of the objects bucket).
pub const DEFAULT_TOKEN_Z: i64 = 30;

/// Default z-order for pins (start of the markers bucket).
pub const DEFAULT_PIN_Z: i64 = 60;

/// First z-order value that paints above the fog layer.
pub const FOG_Z_MIN: i64 = 90;

// ── Tokens ──────────────────────────────────────────────────────

/// Edge length of a dropped image token, in world units.
pub const IMAGE_TOKEN_SIZE: f64 = 100.0;

/// Edge length of a dropped pin, in world units.
pub const PIN_SIZE: f64 = 20.0;

/// Color given to new pins.
pub const DEFAULT_PIN_COLOR: &str = "#ef4444";

/// Colors offered by the pin context menu.
pub const PIN_PALETTE: [&str; 8] = [
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#a855f7", "#ec4899", "#64748b",
];

/// Minimum token edge after a resize, in world units.
pub const MIN_TOKEN_SIZE: f64 = 5.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for transform handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the bounding box edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Grid ────────────────────────────────────────────────────────

/// Square grid line spacing at grid scale 1, in world units.
pub const GRID_BASE_SPACING: f64 = 20.0;

/// Cells narrower than this on screen are not drawn.
pub const MIN_GRID_CELL_PX: f64 = 4.0;

/// Half length of each arm of the origin crosshair, in world units.
pub const CROSSHAIR_HALF: f64 = 50.0;

// ── Measurement ─────────────────────────────────────────────────

/// Pixels per grid unit square at grid scale 1, used by the ruler.
pub const MEASURE_PX_PER_UNIT: f64 = 100.0;

/// Half length of the ruler's end ticks, in screen pixels.
pub const MEASURE_TICK_PX: f64 = 8.0;

/// Offset of the ruler label from the line, in screen pixels.
pub const MEASURE_LABEL_OFFSET_PX: f64 = 16.0;

// ── Persistence ─────────────────────────────────────────────────

/// Info string of the fenced code block that holds map data.
pub const MAP_BLOCK_TAG: &str = "json:map-data";

/// Default trailing debounce window for saves, in milliseconds.
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1000;

/// Default number of save attempts before giving up.
pub const DEFAULT_SAVE_RETRIES: usize = 3;

/// Default base delay between save attempts, in milliseconds.
pub const DEFAULT_SAVE_RETRY_BASE_MS: u64 = 200;
