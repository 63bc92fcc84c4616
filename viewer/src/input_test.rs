use super::*;

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
    assert!(!InputState::default().is_dragging());
}

#[test]
fn panning_is_dragging() {
    let state = InputState::Panning { last_screen: Point::new(1.0, 2.0) };
    assert!(state.is_dragging());
}

#[test]
fn layer_toggles_default_all_visible() {
    let layers = LayerToggles::default();
    assert!(layers.grid);
    assert!(layers.monsters);
    assert!(layers.projectiles);
    assert!(layers.players);
}

#[test]
fn layer_toggles_update_individually() {
    let layers = LayerToggles { monsters: false, ..LayerToggles::default() };
    assert!(!layers.monsters);
    assert!(layers.players);
    assert_ne!(layers, LayerToggles::default());
}

#[test]
fn wheel_delta_debug_format() {
    let s = format!("{:?}", WheelDelta { dy: -120.0 });
    assert!(s.contains("WheelDelta"));
}
