//! Connection lifecycle state machine for the state-stream socket.
//!
//! [`ConnectionManager`] performs no I/O. Hosts feed it [`TransportEvent`]s and
//! execute the [`Effect`]s it returns: opening and closing the socket, arming
//! and cancelling the reconnect timer, updating the status display, and
//! forwarding decoded messages to the state store. Keeping the socket and the
//! timer in the host means the browser and the native CLI share one policy.
//!
//! Guarantees:
//! - at most one socket handle is live at a time
//! - at most one reconnect timer is armed at a time
//! - a decode failure never changes [`ConnectionState`]

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

use frames::{Inbound, decode_message};

/// Socket lifecycle as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    #[must_use]
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

/// Something that happened on the socket or its timer.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The pending socket finished its handshake.
    Opened,
    /// A text message arrived.
    Message(String),
    /// The socket reported an error. A `Closed` event is expected to follow.
    Error(String),
    /// The socket closed, whether cleanly, remotely, or after an error.
    Closed,
    /// The reconnect timer elapsed.
    ReconnectTimerFired,
    /// The host could not arm the reconnect timer it was asked for.
    ReconnectTimerFailed(String),
}

/// I/O the host must perform on behalf of the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Open a socket to `url`; report `Opened`/`Closed` when it settles.
    Open { url: String },
    /// Close the live socket; report `Closed` when done.
    Close,
    /// Arm a repeating timer that fires every `delay_ms` until cancelled.
    ScheduleReconnect { delay_ms: u32 },
    /// Disarm the reconnect timer.
    CancelReconnect,
}

/// Output of the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Command(TransportCommand),
    StateChanged(ConnectionState),
    Inbound(Inbound),
}

/// Owns the connection state, the socket handle flag, and reconnect policy.
#[derive(Debug)]
pub struct ConnectionManager {
    url: String,
    reconnect_delay_ms: u32,
    state: ConnectionState,
    socket_live: bool,
    reconnect_pending: bool,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(url: impl Into<String>, reconnect_delay_ms: u32) -> Self {
        Self {
            url: url.into(),
            reconnect_delay_ms,
            state: ConnectionState::Disconnected,
            socket_live: false,
            reconnect_pending: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the reconnect timer is currently armed.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Start connecting. No-op while a socket is open or pending, or while the
    /// reconnect timer is armed (it will connect on its next tick).
    pub fn connect(&mut self) -> Vec<Effect> {
        if self.reconnect_pending {
            return Vec::new();
        }
        self.open_socket()
    }

    /// Dispatch one transport event.
    pub fn handle(&mut self, event: TransportEvent) -> Vec<Effect> {
        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Message(text) => Self::on_message(&text),
            TransportEvent::Error(reason) => {
                log::error!("socket error: {reason}");
                if self.socket_live {
                    vec![Effect::Command(TransportCommand::Close)]
                } else {
                    Vec::new()
                }
            }
            TransportEvent::Closed => self.on_close(),
            TransportEvent::ReconnectTimerFired => self.open_socket(),
            TransportEvent::ReconnectTimerFailed(reason) => self.on_timer_failed(&reason),
        }
    }

    fn open_socket(&mut self) -> Vec<Effect> {
        if self.socket_live {
            return Vec::new();
        }
        log::info!("connecting to {}", self.url);
        self.socket_live = true;
        let mut effects = self.transition(ConnectionState::Connecting);
        effects.push(Effect::Command(TransportCommand::Open { url: self.url.clone() }));
        effects
    }

    fn on_open(&mut self) -> Vec<Effect> {
        if !self.socket_live {
            log::warn!("ignoring open for a socket that was already dropped");
            return Vec::new();
        }
        log::info!("connected to {}", self.url);
        let mut effects = self.transition(ConnectionState::Connected);
        if self.reconnect_pending {
            self.reconnect_pending = false;
            effects.push(Effect::Command(TransportCommand::CancelReconnect));
        }
        effects
    }

    fn on_close(&mut self) -> Vec<Effect> {
        self.socket_live = false;
        let mut effects = self.transition(ConnectionState::Disconnected);
        if !self.reconnect_pending {
            log::warn!("disconnected, reconnecting every {}ms", self.reconnect_delay_ms);
            self.reconnect_pending = true;
            effects.push(Effect::Command(TransportCommand::ScheduleReconnect {
                delay_ms: self.reconnect_delay_ms,
            }));
        }
        effects
    }

    /// No timer is armed after all. Retry now; the next close arms a new one.
    fn on_timer_failed(&mut self, reason: &str) -> Vec<Effect> {
        log::error!("reconnect timer failed: {reason}");
        self.reconnect_pending = false;
        self.open_socket()
    }

    fn on_message(text: &str) -> Vec<Effect> {
        match decode_message(text) {
            Ok(inbound) => vec![Effect::Inbound(inbound)],
            Err(e) => {
                log::warn!("dropping undecodable message: {e}");
                Vec::new()
            }
        }
    }

    fn transition(&mut self, next: ConnectionState) -> Vec<Effect> {
        if self.state == next {
            return Vec::new();
        }
        self.state = next;
        vec![Effect::StateChanged(next)]
    }
}
