#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::convert::Infallible;

use frames::{EntityId, RoomId};

use super::*;
use crate::consts::{FOLLOW_TARGET_COLOR, PLAYER_COLOR, WAITING_TEXT};

// =============================================================
// Helpers
// =============================================================

/// Surface that keeps the text it draws and every fill colour it selects.
#[derive(Default)]
struct RecordingSink {
    texts: RefCell<Vec<String>>,
    fills: RefCell<Vec<String>>,
}

impl Surface for RecordingSink {
    type Error = Infallible;

    fn reset_transform(&self) -> Result<(), Infallible> {
        Ok(())
    }
    fn save(&self) {}
    fn restore(&self) {}
    fn translate(&self, _x: f64, _y: f64) -> Result<(), Infallible> {
        Ok(())
    }
    fn scale(&self, _x: f64, _y: f64) -> Result<(), Infallible> {
        Ok(())
    }
    fn set_fill_style(&self, color: &str) {
        self.fills.borrow_mut().push(color.to_owned());
    }
    fn set_stroke_style(&self, _color: &str) {}
    fn set_line_width(&self, _width: f64) {}
    fn fill_rect(&self, _x: f64, _y: f64, _width: f64, _height: f64) {}
    fn begin_path(&self) {}
    fn move_to(&self, _x: f64, _y: f64) {}
    fn line_to(&self, _x: f64, _y: f64) {}
    fn close_path(&self) {}
    fn arc(&self, _x: f64, _y: f64, _radius: f64, _start: f64, _end: f64) -> Result<(), Infallible> {
        Ok(())
    }
    fn fill(&self) {}
    fn stroke(&self) {}
    fn set_font(&self, _font: &str) {}
    fn set_text_align(&self, _align: &str) {}
    fn set_text_baseline(&self, _baseline: &str) {}
    fn fill_text(&self, text: &str, _x: f64, _y: f64) -> Result<(), Infallible> {
        self.texts.borrow_mut().push(text.to_owned());
        Ok(())
    }
}

fn engine() -> EngineCore {
    EngineCore::new(&ViewerConfig::default(), Viewport::new(800.0, 600.0))
}

/// An engine whose socket is open.
fn connected_engine() -> EngineCore {
    let mut core = engine();
    core.connect();
    core.on_transport(TransportEvent::Opened);
    core
}

fn message(core: &mut EngineCore, text: &str) -> Vec<Action> {
    core.on_transport(TransportEvent::Message(text.to_owned()))
}

fn stats(actions: &[Action]) -> Vec<FrameStats> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::StatsChanged(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn room(id: &str) -> Option<RoomId> {
    Some(RoomId::new(id))
}

// =============================================================
// Transport
// =============================================================

#[test]
fn connect_opens_socket_and_reports_connecting() {
    let mut core = engine();
    let actions = core.connect();
    assert_eq!(
        actions,
        vec![
            Action::ConnectionChanged(ConnectionState::Connecting),
            Action::Transport(TransportCommand::Open { url: "ws://localhost:9002".into() }),
        ]
    );
}

#[test]
fn open_reports_connected() {
    let mut core = engine();
    core.connect();
    let actions = core.on_transport(TransportEvent::Opened);
    assert_eq!(actions, vec![Action::ConnectionChanged(ConnectionState::Connected)]);
    assert!(core.connection_state().is_connected());
}

#[test]
fn close_reports_disconnected_and_schedules_reconnect() {
    let mut core = connected_engine();
    let actions = core.on_transport(TransportEvent::Closed);
    assert_eq!(
        actions,
        vec![
            Action::ConnectionChanged(ConnectionState::Disconnected),
            Action::Transport(TransportCommand::ScheduleReconnect { delay_ms: 3000 }),
        ]
    );
}

#[test]
fn malformed_message_changes_nothing() {
    let mut core = connected_engine();
    assert!(message(&mut core, "not json {").is_empty());
    assert!(core.store.current_frame().is_none());
    assert!(core.connection_state().is_connected());
}

// =============================================================
// Frames and resets
// =============================================================

#[test]
fn reset_shaped_array_keeps_selected_frame() {
    let mut core = connected_engine();
    message(&mut core, r#"{"t":4,"rid":"A","p":[{"id":1,"x":0,"y":0}]}"#);

    assert!(stats(&message(&mut core, r#"[true, "A"]"#)).is_empty());
    let current = core.store.current_frame().unwrap();
    assert_eq!(current.tick, 4);
    assert_eq!(current.players().len(), 1);
}

#[test]
fn frame_then_reset_updates_stats() {
    let mut core = connected_engine();

    let actions = message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0}],"m":[]}"#);
    assert_eq!(stats(&actions), vec![FrameStats { tick: 1, players: 1, monsters: 0, room_id: room("A") }]);

    let actions = message(&mut core, r#"{"reset":true,"roomId":"A"}"#);
    assert_eq!(stats(&actions), vec![FrameStats { tick: 0, players: 0, monsters: 0, room_id: room("A") }]);
}

#[test]
fn frames_from_other_rooms_are_ignored() {
    let mut core = connected_engine();
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0}]}"#);

    let actions = message(&mut core, r#"{"t":9,"rid":"B","p":[{"id":2,"x":5,"y":5}]}"#);
    assert!(stats(&actions).is_empty());
    assert_eq!(core.store.current_frame().map(|f| f.tick), Some(1));
}

#[test]
fn reset_for_other_room_is_ignored() {
    let mut core = connected_engine();
    message(&mut core, r#"{"t":4,"rid":"A","p":[{"id":1,"x":0,"y":0}]}"#);

    assert!(message(&mut core, r#"{"reset":true,"roomId":"B"}"#).is_empty());
    assert_eq!(core.store.current_frame().map(|f| f.tick), Some(4));
}

#[test]
fn reset_view_returns_to_room_auto_selection() {
    let mut core = connected_engine();
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0}]}"#);
    core.reset_view();

    let actions = message(&mut core, r#"{"t":2,"rid":"B","p":[{"id":2,"x":0,"y":0}]}"#);
    assert_eq!(stats(&actions)[0].room_id, room("B"));
}

// =============================================================
// Input
// =============================================================

#[test]
fn drag_pans_and_sets_cursor() {
    let mut core = engine();
    let before = core.camera();

    let down = core.on_pointer_down(Point::new(100.0, 100.0));
    assert_eq!(down, vec![Action::SetCursor(CURSOR_DRAGGING)]);
    assert!(core.on_pointer_move(Point::new(130.0, 90.0)).is_empty());
    let up = core.on_pointer_up(Point::new(130.0, 90.0));
    assert_eq!(up, vec![Action::SetCursor(CURSOR_IDLE)]);

    let after = core.camera();
    assert_eq!(after.offset_x, before.offset_x + 30.0);
    assert_eq!(after.offset_y, before.offset_y - 10.0);
    assert_eq!(after.scale, before.scale);
}

#[test]
fn move_without_drag_does_not_pan() {
    let mut core = engine();
    let before = core.camera();
    core.on_pointer_move(Point::new(500.0, 500.0));
    assert_eq!(core.camera(), before);
    assert!(core.on_pointer_up(Point::new(500.0, 500.0)).is_empty());
}

#[test]
fn drag_switches_follow_off() {
    let mut core = engine();
    core.set_follow(true);
    let actions = core.on_pointer_down(Point::new(0.0, 0.0));
    assert!(actions.contains(&Action::FollowChanged(false)));
    assert!(!core.controller.is_following());
}

#[test]
fn wheel_down_zooms_out() {
    let mut core = engine();
    let before = core.camera().scale;
    core.on_wheel(WheelDelta { dy: 100.0 });
    assert!(core.camera().scale < before);
}

#[test]
fn reset_view_reports_follow_off_only_when_following() {
    let mut core = engine();
    assert!(core.reset_view().is_empty());
    core.set_follow(true);
    assert_eq!(core.reset_view(), vec![Action::FollowChanged(false)]);
}

#[test]
fn resize_keeps_offset() {
    let mut core = engine();
    let before = core.camera();
    core.set_viewport(Viewport::new(1024.0, 768.0));
    assert_eq!(core.camera(), before);
    assert_eq!(core.controller.viewport(), Viewport::new(1024.0, 768.0));
}

// =============================================================
// Tick
// =============================================================

#[test]
fn tick_without_frame_draws_waiting_message() {
    let mut core = engine();
    let sink = RecordingSink::default();
    core.tick(&sink, 0.0).unwrap();
    assert_eq!(sink.texts.borrow().as_slice(), [WAITING_TEXT]);
}

#[test]
fn tick_draws_player_labels() {
    let mut core = connected_engine();
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0},{"id":2,"x":3,"y":4}]}"#);
    let sink = RecordingSink::default();
    core.tick(&sink, 0.0).unwrap();
    assert_eq!(sink.texts.borrow().as_slice(), ["P1", "P2"]);
}

#[test]
fn hidden_players_layer_draws_no_labels() {
    let mut core = connected_engine();
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0}]}"#);
    core.set_layers(LayerToggles { players: false, ..LayerToggles::default() });
    let sink = RecordingSink::default();
    core.tick(&sink, 0.0).unwrap();
    assert!(sink.texts.borrow().is_empty());
}

#[test]
fn tick_follows_first_player() {
    let mut core = connected_engine();
    core.set_follow(true);
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":7,"x":10,"y":-4}]}"#);
    core.tick(&RecordingSink::default(), 0.0).unwrap();

    let screen = core.camera().world_to_screen(Point::new(10.0, -4.0));
    assert!((screen.x - 400.0).abs() < 1e-9);
    assert!((screen.y - 300.0).abs() < 1e-9);
    assert_eq!(core.controller.follow_target(), Some(&EntityId::Int(7)));
}

#[test]
fn tick_keeps_following_tracked_player_as_it_moves() {
    let mut core = connected_engine();
    core.set_follow(true);
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0},{"id":2,"x":5,"y":5}]}"#);
    core.tick(&RecordingSink::default(), 0.0).unwrap();
    assert_eq!(core.controller.follow_target(), Some(&EntityId::Int(1)));

    // The tracked player is no longer first in wire order.
    message(&mut core, r#"{"t":2,"rid":"A","p":[{"id":2,"x":5,"y":5},{"id":1,"x":8,"y":2}]}"#);
    core.tick(&RecordingSink::default(), 16.0).unwrap();
    let screen = core.camera().world_to_screen(Point::new(8.0, 2.0));
    assert!((screen.x - 400.0).abs() < 1e-9);
    assert!((screen.y - 300.0).abs() < 1e-9);
}

#[test]
fn follow_highlight_ends_with_follow_mode() {
    let mut core = connected_engine();
    core.set_follow(true);
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0}]}"#);
    let sink = RecordingSink::default();
    core.tick(&sink, 0.0).unwrap();
    assert!(sink.fills.borrow().iter().any(|c| c == FOLLOW_TARGET_COLOR));

    core.on_pointer_down(Point::new(10.0, 10.0));
    core.on_pointer_up(Point::new(20.0, 20.0));
    let sink = RecordingSink::default();
    core.tick(&sink, 16.0).unwrap();

    let fills = sink.fills.borrow();
    assert!(fills.iter().any(|c| c == PLAYER_COLOR));
    assert!(!fills.iter().any(|c| c == FOLLOW_TARGET_COLOR));
    // The tracked id survives for when follow is switched back on.
    assert_eq!(core.controller.follow_target(), Some(&EntityId::Int(1)));
}

#[test]
fn reset_view_clears_follow_highlight() {
    let mut core = connected_engine();
    core.set_follow(true);
    message(&mut core, r#"{"t":1,"rid":"A","p":[{"id":1,"x":0,"y":0}]}"#);
    core.tick(&RecordingSink::default(), 0.0).unwrap();

    core.reset_view();
    let sink = RecordingSink::default();
    core.tick(&sink, 16.0).unwrap();
    assert!(!sink.fills.borrow().iter().any(|c| c == FOLLOW_TARGET_COLOR));
}

#[test]
fn tick_reports_fps_once_per_second() {
    let mut core = engine();
    let sink = RecordingSink::default();
    assert!(core.tick(&sink, 1000.0).unwrap().contains(&Action::FpsChanged(0)));
    assert!(core.tick(&sink, 1500.0).unwrap().is_empty());
    assert_eq!(core.tick(&sink, 2000.0).unwrap(), vec![Action::FpsChanged(2)]);
}
