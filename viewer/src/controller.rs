//! Camera controller: pan, zoom, follow-entity tracking, and view reset.
//!
//! The controller is the only writer of [`Camera`]. Pointer and wheel input
//! mutate it between ticks; [`CameraController::update`] runs once per tick
//! before rendering and, in follow mode, re-centers the camera on the tracked
//! player. Zoom only rescales; the offset is untouched, so the view zooms about
//! the canvas center of the default view and never toward the cursor.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use frames::{EntityId, Frame, Player};

use crate::camera::{Camera, Point, Viewport};
use crate::config::ViewerConfig;
use crate::input::InputState;
use crate::store::StateStore;

#[derive(Debug, Clone)]
pub struct CameraController {
    camera: Camera,
    viewport: Viewport,
    input: InputState,
    follow: bool,
    follow_target: Option<EntityId>,
    min_scale: f64,
    max_scale: f64,
    zoom_sensitivity: f64,
    view_scale_divisor: f64,
}

impl CameraController {
    /// Create a controller showing the default view for `viewport`.
    #[must_use]
    pub fn new(config: &ViewerConfig, viewport: Viewport) -> Self {
        let mut controller = Self {
            camera: Camera::default(),
            viewport,
            input: InputState::Idle,
            follow: false,
            follow_target: None,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_sensitivity: config.zoom_sensitivity,
            view_scale_divisor: config.view_scale_divisor,
        };
        controller.apply_default_view();
        controller
    }

    // --- Queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn input(&self) -> InputState {
        self.input
    }

    #[must_use]
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// The player id follow mode tracks, once one has been resolved.
    #[must_use]
    pub fn follow_target(&self) -> Option<&EntityId> {
        self.follow_target.as_ref()
    }

    /// The player drawn as the follow target. The tracked id outlives follow
    /// mode so re-enabling it resumes the same player, but it is only
    /// highlighted while follow is on.
    #[must_use]
    pub fn highlighted_target(&self) -> Option<&EntityId> {
        if self.follow { self.follow_target.as_ref() } else { None }
    }

    // --- Mutations ---

    /// Record a resized canvas. The camera itself is left alone.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_follow(&mut self, enabled: bool) {
        self.follow = enabled;
    }

    /// Track a specific player when follow mode is on.
    pub fn set_follow_target(&mut self, target: Option<EntityId>) {
        self.follow_target = target;
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.camera.offset_x += dx;
        self.camera.offset_y += dy;
    }

    /// Start a drag at `screen`. Returns `true` if this switched follow mode off.
    pub fn begin_drag(&mut self, screen: Point) -> bool {
        self.input = InputState::Panning { last_screen: screen };
        let was_following = self.follow;
        self.follow = false;
        was_following
    }

    /// Continue the active drag. Returns `true` if the view moved.
    pub fn drag_to(&mut self, screen: Point) -> bool {
        let InputState::Panning { last_screen } = self.input else {
            return false;
        };
        self.pan(screen.x - last_screen.x, screen.y - last_screen.y);
        self.input = InputState::Panning { last_screen: screen };
        true
    }

    /// Finish the active drag. Returns `true` if a drag was in progress.
    pub fn end_drag(&mut self) -> bool {
        let was_dragging = self.input.is_dragging();
        self.input = InputState::Idle;
        was_dragging
    }

    /// Multiplicative zoom: positive `wheel_delta` (scroll down) zooms out.
    pub fn zoom(&mut self, wheel_delta: f64) {
        let factor = 1.0 + (-wheel_delta * self.zoom_sensitivity);
        let scaled = self.camera.scale * factor;
        if scaled.is_nan() {
            return;
        }
        self.camera.scale = scaled.clamp(self.min_scale, self.max_scale);
    }

    /// Per-tick follow update. A no-op unless follow mode is on and the frame
    /// has players.
    pub fn update(&mut self, frame: Option<&Frame>) {
        if !self.follow {
            return;
        }
        let Some(target) = frame.and_then(|f| self.resolve_target(f.players())) else {
            return;
        };
        let world = Point::new(target.x, target.y);
        self.follow_target = Some(target.id.clone());

        let offset = self.camera.offset_placing(world, self.viewport.center());
        self.camera.offset_x = offset.x;
        self.camera.offset_y = offset.y;
    }

    /// Restore the default view, leave follow mode, and return the store to
    /// room auto-selection. Returns `true` if follow mode was switched off.
    pub fn reset_view(&mut self, store: &mut StateStore) -> bool {
        self.apply_default_view();
        let was_following = self.follow;
        self.follow = false;
        store.reset_selection();
        was_following
    }

    // --- Helpers ---

    /// Prefer the tracked player; fall back to the first one in wire order.
    fn resolve_target<'a>(&self, players: &'a [Player]) -> Option<&'a Player> {
        self.follow_target
            .as_ref()
            .and_then(|id| players.iter().find(|p| &p.id == id))
            .or_else(|| players.first())
    }

    fn apply_default_view(&mut self) {
        let scale = self.viewport.min_side() / self.view_scale_divisor;
        self.camera.scale = if scale.is_nan() {
            self.min_scale
        } else {
            scale.clamp(self.min_scale, self.max_scale)
        };
        let center = self.viewport.center();
        self.camera.offset_x = center.x;
        self.camera.offset_y = center.y;
    }
}
