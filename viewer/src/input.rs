//! Input model: wheel deltas, the drag gesture state, and layer toggles.
//!
//! `InputState` tracks the active gesture between pointer-down and pointer-up
//! so the controller can turn absolute pointer positions into pan deltas.
//! `LayerToggles` mirrors the host's visibility checkboxes and is read by the
//! renderer once per tick.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;

/// Vertical scroll of one wheel event, in pixels. Positive scrolls down and
/// zooms out.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dy: f64,
}

/// Drag gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// Pointer is up.
    #[default]
    Idle,
    /// Pointer is down and every move pans the camera.
    Panning {
        /// Last pointer position seen during this drag.
        last_screen: Point,
    },
}

impl InputState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }
}

/// Which layers the renderer draws this tick.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerToggles {
    pub grid: bool,
    pub monsters: bool,
    pub projectiles: bool,
    pub players: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self { grid: true, monsters: true, projectiles: true, players: true }
    }
}
