use frames::Inbound;

use crate::camera::{Camera, Point, Viewport};
use crate::config::ViewerConfig;
use crate::connection::{ConnectionManager, ConnectionState, Effect, TransportCommand, TransportEvent};
use crate::consts::{CURSOR_DRAGGING, CURSOR_IDLE};
use crate::controller::CameraController;
use crate::fps::FpsMeter;
use crate::input::{LayerToggles, WheelDelta};
use crate::render::{self, Surface};
use crate::store::{FrameStats, StateStore};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine entry points for the host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Socket or timer I/O to perform.
    Transport(TransportCommand),
    /// Update the connection-status display.
    ConnectionChanged(ConnectionState),
    /// Update the tick / player / monster / room display.
    StatsChanged(FrameStats),
    /// Update the frames-per-second display.
    FpsChanged(u32),
    /// Update the follow-mode indicator.
    FollowChanged(bool),
    SetCursor(&'static str),
}

/// The application context: every component of the viewer, owned once.
///
/// All logic lives here so it can be tested without a browser or a socket.
/// Hosts call one entry point per event and apply the returned actions; no
/// entry point re-enters another, so events are handled strictly one at a time.
#[derive(Debug)]
pub struct EngineCore {
    pub connection: ConnectionManager,
    pub store: StateStore,
    pub controller: CameraController,
    pub layers: LayerToggles,
    fps: FpsMeter,
}

impl EngineCore {
    /// Build the engine for a validated config and the initial canvas size.
    #[must_use]
    pub fn new(config: &ViewerConfig, viewport: Viewport) -> Self {
        Self {
            connection: ConnectionManager::new(config.url.clone(), config.reconnect_delay_ms),
            store: StateStore::new(),
            controller: CameraController::new(config, viewport),
            layers: LayerToggles::default(),
            fps: FpsMeter::new(),
        }
    }

    // --- Transport ---

    /// Open the socket unless one is already open, pending, or scheduled.
    pub fn connect(&mut self) -> Vec<Action> {
        let effects = self.connection.connect();
        self.apply_effects(effects)
    }

    /// Handle one socket or timer event.
    pub fn on_transport(&mut self, event: TransportEvent) -> Vec<Action> {
        let effects = self.connection.handle(event);
        self.apply_effects(effects)
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) -> Vec<Action> {
        let mut actions = Vec::new();
        for effect in effects {
            match effect {
                Effect::Command(cmd) => actions.push(Action::Transport(cmd)),
                Effect::StateChanged(state) => actions.push(Action::ConnectionChanged(state)),
                Effect::Inbound(Inbound::Reset { room_id }) => {
                    if let Some(stats) = self.store.apply_reset(room_id.as_ref()) {
                        actions.push(Action::StatsChanged(stats));
                    }
                }
                Effect::Inbound(Inbound::Frame(frame)) => {
                    if let Some(stats) = self.store.apply_frame(frame) {
                        actions.push(Action::StatsChanged(stats));
                    }
                }
            }
        }
        actions
    }

    // --- Input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Action> {
        let mut actions = vec![Action::SetCursor(CURSOR_DRAGGING)];
        if self.controller.begin_drag(screen_pt) {
            actions.push(Action::FollowChanged(false));
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.controller.drag_to(screen_pt);
        Vec::new()
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point) -> Vec<Action> {
        if self.controller.end_drag() {
            vec![Action::SetCursor(CURSOR_IDLE)]
        } else {
            Vec::new()
        }
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        self.controller.zoom(delta.dy);
        Vec::new()
    }

    // --- View ---

    /// Record a resized canvas.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.controller.set_viewport(viewport);
    }

    pub fn set_layers(&mut self, layers: LayerToggles) {
        self.layers = layers;
    }

    pub fn set_follow(&mut self, enabled: bool) {
        self.controller.set_follow(enabled);
    }

    /// Default zoom and position, follow off, room auto-selection restored.
    pub fn reset_view(&mut self) -> Vec<Action> {
        if self.controller.reset_view(&mut self.store) {
            vec![Action::FollowChanged(false)]
        } else {
            Vec::new()
        }
    }

    // --- Tick ---

    /// Run one animation tick: FPS accounting, follow update, then draw.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any surface call fails while drawing.
    pub fn tick<S: Surface>(&mut self, ctx: &S, timestamp_ms: f64) -> Result<Vec<Action>, S::Error> {
        let mut actions = Vec::new();
        if let Some(fps) = self.fps.tick(timestamp_ms) {
            actions.push(Action::FpsChanged(fps));
        }

        self.controller.update(self.store.current_frame());
        render::draw(
            ctx,
            self.store.current_frame(),
            &self.controller.camera(),
            self.controller.highlighted_target(),
            &self.layers,
            self.controller.viewport(),
        )?;
        Ok(actions)
    }

    // --- Queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.controller.camera()
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }
}
