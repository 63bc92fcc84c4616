//! Shared numeric and color constants for the viewer crate.

// ── Connection ──────────────────────────────────────────────────

/// Endpoint used when no configuration overrides it.
pub const DEFAULT_URL: &str = "ws://localhost:9002";

/// Delay between reconnect attempts, in milliseconds.
pub const DEFAULT_RECONNECT_DELAY_MS: u32 = 3000;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest permitted zoom, in pixels per world unit.
pub const DEFAULT_MIN_SCALE: f64 = 0.1;

/// Largest permitted zoom, in pixels per world unit.
pub const DEFAULT_MAX_SCALE: f64 = 100.0;

/// Fractional zoom change per wheel pixel.
pub const DEFAULT_ZOOM_SENSITIVITY: f64 = 0.001;

/// The reset view shows roughly this many world units across the shorter side.
pub const DEFAULT_VIEW_SCALE_DIVISOR: f64 = 40.0;

// ── Background ──────────────────────────────────────────────────

pub const BACKGROUND_COLOR: &str = "#1e1e1e";

/// Grid extends this far from the origin in every direction, in world units.
pub const GRID_HALF_EXTENT: f64 = 1000.0;

/// Spacing between grid lines, in world units.
pub const GRID_STEP: f64 = 5.0;

pub const GRID_COLOR: &str = "#333";
pub const GRID_LINE_PX: f64 = 1.0;
pub const AXIS_COLOR: &str = "#555";
pub const AXIS_LINE_PX: f64 = 2.0;

// ── Entities (world units) ──────────────────────────────────────

pub const MONSTER_RADIUS: f64 = 0.5;
pub const MONSTER_COLOR: &str = "#f44336";

pub const PROJECTILE_RADIUS: f64 = 0.2;
pub const PROJECTILE_COLOR: &str = "#2196f3";

pub const PLAYER_RADIUS: f64 = 0.5;
pub const PLAYER_COLOR: &str = "#4caf50";
pub const FOLLOW_TARGET_COLOR: &str = "#ffeb3b";

/// Facing triangle: tip distance from the player center, in world units.
pub const FACING_TIP: f64 = 0.9;

/// Facing triangle: half-height of the base, in world units.
pub const FACING_HALF_WIDTH: f64 = 0.25;

pub const FACING_COLOR: &str = "#ffffff";

// ── Labels (screen pixels) ──────────────────────────────────────

pub const LABEL_COLOR: &str = "white";
pub const PLAYER_LABEL_FONT: &str = "14px Arial";
pub const PLAYER_LABEL_RISE_PX: f64 = 20.0;
pub const MONSTER_LABEL_FONT: &str = "12px Arial";
pub const MONSTER_LABEL_RISE_PX: f64 = 15.0;

/// Monster ids are only legible past this zoom.
pub const MONSTER_LABEL_MIN_SCALE: f64 = 10.0;

pub const WAITING_TEXT: &str = "Waiting for data...";
pub const WAITING_FONT: &str = "16px Arial";
pub const WAITING_COLOR: &str = "#888";

// ── Cursor ──────────────────────────────────────────────────────

pub const CURSOR_IDLE: &str = "grab";
pub const CURSOR_DRAGGING: &str = "grabbing";
