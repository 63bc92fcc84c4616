//! Browser host for the viewer.
//!
//! Binds one [`EngineCore`] to a canvas element, a `WebSocket`, a reconnect
//! interval, the page's controls, and a `requestAnimationFrame` loop, then
//! applies the returned [`Action`]s to the DOM.
//!
//! Every page element other than the canvas is optional. A missing display
//! element is skipped; a missing toggle keeps its default value.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    BinaryType, CanvasRenderingContext2d, CloseEvent, Document, Event, EventTarget, HtmlCanvasElement,
    HtmlInputElement, MessageEvent, MouseEvent, WebSocket, WheelEvent, Window,
};

use crate::camera::{Point, Viewport};
use crate::config::{ConfigError, ViewerConfig};
use crate::connection::{ConnectionState, TransportCommand, TransportEvent};
use crate::consts::CURSOR_IDLE;
use crate::engine::{Action, EngineCore};
use crate::input::{LayerToggles, WheelDelta};
use crate::store::FrameStats;

const STATUS_ID: &str = "connection-status";
const TICK_ID: &str = "tick";
const PLAYER_COUNT_ID: &str = "player-count";
const MONSTER_COUNT_ID: &str = "monster-count";
const ROOM_ID: &str = "room-id";
const FPS_ID: &str = "fps";
const GRID_TOGGLE_ID: &str = "chk-grid";
const MONSTERS_TOGGLE_ID: &str = "chk-monsters";
const PLAYERS_TOGGLE_ID: &str = "chk-players";
const PROJECTILES_TOGGLE_ID: &str = "chk-projectiles";
const FOLLOW_TOGGLE_ID: &str = "chk-follow";
const RESET_VIEW_ID: &str = "btn-reset-view";

/// Failures that stop the viewer from starting.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("no browser window or document")]
    NoWindow,
    #[error("no element with id `{0}`")]
    MissingElement(String),
    #[error("element `{0}` is not a canvas")]
    NotACanvas(String),
    #[error("canvas has no 2d context")]
    NoContext,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("browser call failed: {0:?}")]
    Js(JsValue),
}

impl From<HostError> for JsValue {
    fn from(err: HostError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Start the viewer on the canvas with id `canvas_id`.
///
/// `config_json` is an optional, possibly partial, JSON [`ViewerConfig`].
///
/// # Errors
///
/// Returns a string error if the config is invalid or the canvas is missing.
#[wasm_bindgen]
pub fn start(canvas_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        log::warn!("console logger not installed: {e}");
    }
    boot(canvas_id, config_json.as_deref()).map_err(JsValue::from)
}

fn boot(canvas_id: &str, config_json: Option<&str>) -> Result<(), HostError> {
    let config = match config_json {
        Some(text) => ViewerConfig::from_json(text)?,
        None => ViewerConfig::default(),
    };

    let window = web_sys::window().ok_or(HostError::NoWindow)?;
    let document = window.document().ok_or(HostError::NoWindow)?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| HostError::MissingElement(canvas_id.to_owned()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| HostError::NotACanvas(canvas_id.to_owned()))?;
    let ctx = canvas
        .get_context("2d")
        .map_err(HostError::Js)?
        .ok_or(HostError::NoContext)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| HostError::NoContext)?;

    let viewport = fit_canvas(&canvas);
    let mut host = Host {
        core: EngineCore::new(&config, viewport),
        window,
        document,
        canvas,
        ctx,
        socket: None,
        generation: 0,
        handlers: None,
        retired: Vec::new(),
        timer: None,
    };
    let layers = host.layers();
    host.core.set_layers(layers);
    let follow = host.checked(FOLLOW_TOGGLE_ID, false);
    host.core.set_follow(follow);
    host.show_connection(ConnectionState::Disconnected);
    host.set_cursor(CURSOR_IDLE);

    let host = Rc::new(RefCell::new(host));
    bind_controls(&host)?;
    log::info!("viewer started on #{canvas_id}, streaming from {}", config.url);
    dispatch(&host, EngineCore::connect);
    start_animation(&host)
}

// =============================================================
// Host state
// =============================================================

/// Socket callbacks; kept alive as long as the socket can call them.
struct SocketHandlers {
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

struct ReconnectTimer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

struct Host {
    core: EngineCore,
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    socket: Option<WebSocket>,
    /// Bumped per socket; events tagged with an older value are ignored.
    generation: u64,
    handlers: Option<SocketHandlers>,
    /// Handlers of closed sockets. One of them may still be on the stack, so
    /// they are freed when the next socket opens.
    retired: Vec<SocketHandlers>,
    timer: Option<ReconnectTimer>,
}

type Shared = Rc<RefCell<Host>>;

impl Host {
    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        match self.document.get_element_by_id(id)?.dyn_into::<HtmlInputElement>() {
            Ok(input) => Some(input),
            Err(_) => None,
        }
    }

    fn checked(&self, id: &str, default: bool) -> bool {
        self.input(id).map_or(default, |input| input.checked())
    }

    fn layers(&self) -> LayerToggles {
        let defaults = LayerToggles::default();
        LayerToggles {
            grid: self.checked(GRID_TOGGLE_ID, defaults.grid),
            monsters: self.checked(MONSTERS_TOGGLE_ID, defaults.monsters),
            projectiles: self.checked(PROJECTILES_TOGGLE_ID, defaults.projectiles),
            players: self.checked(PLAYERS_TOGGLE_ID, defaults.players),
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_checked(&self, id: &str, checked: bool) {
        if let Some(input) = self.input(id) {
            input.set_checked(checked);
        }
    }

    fn set_cursor(&self, cursor: &str) {
        if let Err(e) = self.canvas.style().set_property("cursor", cursor) {
            log::warn!("failed to set cursor: {e:?}");
        }
    }

    fn show_connection(&self, state: ConnectionState) {
        let (label, class) = match state {
            ConnectionState::Connected => ("Connected", "connected"),
            ConnectionState::Connecting => ("Connecting...", "connecting"),
            ConnectionState::Disconnected => ("Disconnected", "disconnected"),
        };
        if let Some(el) = self.document.get_element_by_id(STATUS_ID) {
            el.set_text_content(Some(label));
            el.set_class_name(class);
        }
    }

    fn show_stats(&self, stats: &FrameStats) {
        self.set_text(TICK_ID, &stats.tick.to_string());
        self.set_text(PLAYER_COUNT_ID, &stats.players.to_string());
        self.set_text(MONSTER_COUNT_ID, &stats.monsters.to_string());
        let room = stats.room_id.as_ref().map_or_else(|| "-".to_owned(), ToString::to_string);
        self.set_text(ROOM_ID, &room);
    }
}

/// Size the canvas backing store to its CSS box and report the result.
fn fit_canvas(canvas: &HtmlCanvasElement) -> Viewport {
    let width = u32::try_from(canvas.client_width()).unwrap_or(0);
    let height = u32::try_from(canvas.client_height()).unwrap_or(0);
    if width > 0 && height > 0 {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    Viewport::new(f64::from(canvas.width()), f64::from(canvas.height()))
}

// =============================================================
// Action dispatch
// =============================================================

/// Run one engine entry point, then apply its actions with the host unborrowed.
fn dispatch(host: &Shared, f: impl FnOnce(&mut EngineCore) -> Vec<Action>) {
    let actions = f(&mut host.borrow_mut().core);
    for action in actions {
        apply(host, action);
    }
}

fn apply(host: &Shared, action: Action) {
    match action {
        Action::Transport(cmd) => run_command(host, cmd),
        Action::ConnectionChanged(state) => host.borrow().show_connection(state),
        Action::StatsChanged(stats) => host.borrow().show_stats(&stats),
        Action::FpsChanged(fps) => host.borrow().set_text(FPS_ID, &fps.to_string()),
        Action::FollowChanged(on) => host.borrow().set_checked(FOLLOW_TOGGLE_ID, on),
        Action::SetCursor(cursor) => host.borrow().set_cursor(cursor),
    }
}

// =============================================================
// Transport
// =============================================================

fn run_command(host: &Shared, cmd: TransportCommand) {
    match cmd {
        TransportCommand::Open { url } => open_socket(host, &url),
        TransportCommand::Close => close_socket(host),
        TransportCommand::ScheduleReconnect { delay_ms } => schedule_reconnect(host, delay_ms),
        TransportCommand::CancelReconnect => cancel_reconnect(host),
    }
}

fn open_socket(host: &Shared, url: &str) {
    let ws = match WebSocket::new(url) {
        Ok(ws) => ws,
        Err(e) => {
            log::error!("cannot open socket to {url}: {e:?}");
            // Report the failed open as a close so the reconnect timer takes over.
            dispatch(host, |core| core.on_transport(TransportEvent::Closed));
            return;
        }
    };
    ws.set_binary_type(BinaryType::Arraybuffer);

    let generation = {
        let mut h = host.borrow_mut();
        h.generation += 1;
        h.retired.clear();
        h.generation
    };

    let h = Rc::clone(host);
    let on_open = Closure::wrap(Box::new(move || {
        on_socket_event(&h, generation, TransportEvent::Opened);
    }) as Box<dyn FnMut()>);

    let h = Rc::clone(host);
    let on_message = Closure::wrap(Box::new(move |e: MessageEvent| match e.data().as_string() {
        Some(text) => on_socket_event(&h, generation, TransportEvent::Message(text)),
        None => log::warn!("dropping binary message"),
    }) as Box<dyn FnMut(MessageEvent)>);

    let h = Rc::clone(host);
    let on_error = Closure::wrap(Box::new(move |e: Event| {
        on_socket_event(&h, generation, TransportEvent::Error(format!("{} event", e.type_())));
    }) as Box<dyn FnMut(Event)>);

    let h = Rc::clone(host);
    let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
        log::info!("socket closed with code {}", e.code());
        on_socket_event(&h, generation, TransportEvent::Closed);
    }) as Box<dyn FnMut(CloseEvent)>);

    ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    let mut h = host.borrow_mut();
    h.socket = Some(ws);
    h.handlers = Some(SocketHandlers {
        _on_open: on_open,
        _on_message: on_message,
        _on_error: on_error,
        _on_close: on_close,
    });
}

fn on_socket_event(host: &Shared, generation: u64, event: TransportEvent) {
    if host.borrow().generation != generation {
        log::debug!("ignoring {event:?} from a retired socket");
        return;
    }
    if event == TransportEvent::Closed {
        retire_socket(host);
    }
    dispatch(host, |core| core.on_transport(event));
}

fn retire_socket(host: &Shared) {
    let mut h = host.borrow_mut();
    if let Some(ws) = h.socket.take() {
        ws.set_onopen(None);
        ws.set_onmessage(None);
        ws.set_onerror(None);
        ws.set_onclose(None);
    }
    if let Some(handlers) = h.handlers.take() {
        h.retired.push(handlers);
    }
}

fn close_socket(host: &Shared) {
    let socket = host.borrow().socket.clone();
    if let Some(ws) = socket {
        if let Err(e) = ws.close() {
            log::warn!("failed to close socket: {e:?}");
        }
    }
}

fn schedule_reconnect(host: &Shared, delay_ms: u32) {
    cancel_reconnect(host);

    let h = Rc::clone(host);
    let callback = Closure::wrap(Box::new(move || {
        dispatch(&h, |core| core.on_transport(TransportEvent::ReconnectTimerFired));
    }) as Box<dyn FnMut()>);

    let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    let window = host.borrow().window.clone();
    match window.set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), timeout) {
        Ok(handle) => host.borrow_mut().timer = Some(ReconnectTimer { handle, _callback: callback }),
        Err(e) => {
            let reason = format!("{e:?}");
            dispatch(host, |core| core.on_transport(TransportEvent::ReconnectTimerFailed(reason)));
        }
    }
}

fn cancel_reconnect(host: &Shared) {
    let mut h = host.borrow_mut();
    if let Some(timer) = h.timer.take() {
        h.window.clear_interval_with_handle(timer.handle);
    }
}

// =============================================================
// Input
// =============================================================

/// Pointer position in client coordinates. Only drag deltas are used, so the
/// origin does not matter as long as every pointer event uses the same one.
fn pointer(e: &MouseEvent) -> Point {
    Point::new(f64::from(e.client_x()), f64::from(e.client_y()))
}

/// Attach `handler` for `event` on `target` for the lifetime of the page.
fn listen<E: JsCast + 'static>(
    target: &EventTarget,
    event: &str,
    host: &Shared,
    handler: fn(&Shared, E),
) -> Result<(), HostError> {
    let h = Rc::clone(host);
    let name = event.to_owned();
    let callback = Closure::wrap(Box::new(move |e: Event| match e.dyn_into::<E>() {
        Ok(e) => handler(&h, e),
        Err(_) => log::warn!("unexpected event type for `{name}`"),
    }) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        .map_err(HostError::Js)?;
    callback.forget();
    Ok(())
}

fn bind_controls(host: &Shared) -> Result<(), HostError> {
    let (window, document, canvas) = {
        let h = host.borrow();
        (h.window.clone(), h.document.clone(), h.canvas.clone())
    };

    listen(&canvas, "mousedown", host, |host, e: MouseEvent| {
        dispatch(host, |core| core.on_pointer_down(pointer(&e)));
    })?;
    // A drag that started on the canvas keeps panning and ends anywhere.
    listen(&window, "mousemove", host, |host, e: MouseEvent| {
        dispatch(host, |core| core.on_pointer_move(pointer(&e)));
    })?;
    listen(&window, "mouseup", host, |host, e: MouseEvent| {
        dispatch(host, |core| core.on_pointer_up(pointer(&e)));
    })?;
    listen(&canvas, "wheel", host, |host, e: WheelEvent| {
        e.prevent_default();
        let delta = WheelDelta { dy: e.delta_y() };
        dispatch(host, |core| core.on_wheel(delta));
    })?;

    listen(&window, "resize", host, |host, _: Event| {
        let mut h = host.borrow_mut();
        let viewport = fit_canvas(&h.canvas);
        h.core.set_viewport(viewport);
    })?;

    for id in [GRID_TOGGLE_ID, MONSTERS_TOGGLE_ID, PLAYERS_TOGGLE_ID, PROJECTILES_TOGGLE_ID] {
        if let Some(input) = document.get_element_by_id(id) {
            listen(&input, "change", host, |host, _: Event| {
                let mut h = host.borrow_mut();
                let layers = h.layers();
                h.core.set_layers(layers);
            })?;
        }
    }
    if let Some(input) = document.get_element_by_id(FOLLOW_TOGGLE_ID) {
        listen(&input, "change", host, |host, _: Event| {
            let mut h = host.borrow_mut();
            let follow = h.checked(FOLLOW_TOGGLE_ID, false);
            h.core.set_follow(follow);
        })?;
    }
    if let Some(button) = document.get_element_by_id(RESET_VIEW_ID) {
        listen(&button, "click", host, |host, _: Event| dispatch(host, EngineCore::reset_view))?;
    }
    Ok(())
}

// =============================================================
// Animation
// =============================================================

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_animation(host: &Shared) -> Result<(), HostError> {
    let slot: FrameCallback = Rc::new(RefCell::new(None));
    let slot_for_cb = Rc::clone(&slot);
    let h = Rc::clone(host);
    *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        tick(&h, ts);
        let window = h.borrow().window.clone();
        if let Some(cb) = slot_for_cb.borrow().as_ref() {
            if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log::error!("animation loop stopped: {e:?}");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let window = host.borrow().window.clone();
    if let Some(cb) = slot.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref()).map_err(HostError::Js)?;
    }
    Ok(())
}

fn tick(host: &Shared, timestamp_ms: f64) {
    let result = {
        let mut h = host.borrow_mut();
        let Host { core, ctx, .. } = &mut *h;
        core.tick(&*ctx, timestamp_ms)
    };
    match result {
        Ok(actions) => {
            for action in actions {
                apply(host, action);
            }
        }
        Err(e) => log::error!("draw failed: {e:?}"),
    }
}
