//! Native host for [`EngineCore`]: a tokio socket task, a reconnect interval,
//! and one event queue feeding the engine in arrival order.
//!
//! Socket and timer tasks never touch the engine. They post [`Queued`] events
//! tagged with the generation they were started under; the session loop drops
//! events from sockets or timers that have since been replaced.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::future::Future;
use std::time::Duration;

use frames::RoomId;
use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use viewer::camera::Viewport;
use viewer::config::ViewerConfig;
use viewer::connection::{TransportCommand, TransportEvent};
use viewer::engine::{Action, EngineCore};
use viewer::store::FrameStats;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session event queue closed")]
    QueueClosed,
}

/// What a finished session observed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Sockets opened (including the first).
    pub attempts: u64,
    /// Sockets that completed their handshake.
    pub connects: u64,
    /// Accepted frames and resets.
    pub updates: u64,
    pub last_stats: Option<FrameStats>,
}

#[derive(Debug)]
enum Queued {
    Socket { generation: u64, event: TransportEvent },
    Timer { generation: u64 },
}

struct SocketHandle {
    close: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

pub struct Session {
    core: EngineCore,
    tx: mpsc::UnboundedSender<Queued>,
    rx: mpsc::UnboundedReceiver<Queued>,
    socket_generation: u64,
    socket: Option<SocketHandle>,
    timer_generation: u64,
    timer: Option<JoinHandle<()>>,
    report: SessionReport,
}

impl Session {
    #[must_use]
    pub fn new(config: &ViewerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            core: EngineCore::new(config, Viewport::default()),
            tx,
            rx,
            socket_generation: 0,
            socket: None,
            timer_generation: 0,
            timer: None,
            report: SessionReport::default(),
        }
    }

    /// Connect and process events until `exit_after` updates were accepted or
    /// `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::QueueClosed`] if the event queue stops
    /// delivering, which only happens if every sender was dropped.
    pub async fn run_until<F>(mut self, exit_after: Option<u64>, shutdown: F) -> Result<SessionReport, SessionError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let actions = self.core.connect();
        self.apply(actions);

        while !exit_after.is_some_and(|n| self.report.updates >= n) {
            let queued = tokio::select! {
                queued = self.rx.recv() => queued.ok_or(SessionError::QueueClosed)?,
                () = &mut shutdown => break,
            };
            let event = match queued {
                Queued::Socket { generation, event } if generation == self.socket_generation => {
                    if event == TransportEvent::Closed {
                        self.socket = None;
                    }
                    event
                }
                Queued::Timer { generation } if generation == self.timer_generation && self.timer.is_some() => {
                    TransportEvent::ReconnectTimerFired
                }
                stale => {
                    tracing::debug!(?stale, "dropping event from a replaced socket or timer");
                    continue;
                }
            };
            let actions = self.core.on_transport(event);
            self.apply(actions);
        }

        Ok(std::mem::take(&mut self.report))
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Transport(cmd) => self.run_command(cmd),
                Action::ConnectionChanged(state) => {
                    tracing::info!(?state, "connection");
                    if state.is_connected() {
                        self.report.connects += 1;
                    }
                }
                Action::StatsChanged(stats) => {
                    tracing::info!(
                        tick = stats.tick,
                        players = stats.players,
                        monsters = stats.monsters,
                        room = stats.room_id.as_ref().map_or("-", RoomId::as_str),
                        "frame"
                    );
                    self.report.updates += 1;
                    self.report.last_stats = Some(stats);
                }
                Action::FpsChanged(_) | Action::FollowChanged(_) | Action::SetCursor(_) => {}
            }
        }
    }

    fn run_command(&mut self, cmd: TransportCommand) {
        match cmd {
            TransportCommand::Open { url } => self.open_socket(url),
            TransportCommand::Close => self.close_socket(),
            TransportCommand::ScheduleReconnect { delay_ms } => self.schedule_reconnect(delay_ms),
            TransportCommand::CancelReconnect => self.cancel_reconnect(),
        }
    }

    fn open_socket(&mut self, url: String) {
        if let Some(old) = self.socket.take() {
            old.task.abort();
        }
        self.socket_generation += 1;
        self.report.attempts += 1;

        let (close_tx, close_rx) = oneshot::channel();
        let task = tokio::spawn(run_socket(url, self.socket_generation, self.tx.clone(), close_rx));
        self.socket = Some(SocketHandle { close: Some(close_tx), task });
    }

    fn close_socket(&mut self) {
        let Some(close) = self.socket.as_mut().and_then(|s| s.close.take()) else {
            return;
        };
        if close.send(()).is_err() {
            tracing::debug!("socket task already finished");
        }
    }

    fn schedule_reconnect(&mut self, delay_ms: u32) {
        self.cancel_reconnect();
        self.timer_generation += 1;

        let generation = self.timer_generation;
        let tx = self.tx.clone();
        let period = Duration::from_millis(u64::from(delay_ms));
        self.timer = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(Queued::Timer { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel_reconnect(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(socket) = self.socket.take() {
            socket.task.abort();
        }
        self.cancel_reconnect();
    }
}

/// Own one socket from connect to close, reporting each step on `tx`.
///
/// Always posts exactly one `Closed` as its last event.
async fn run_socket(
    url: String,
    generation: u64,
    tx: mpsc::UnboundedSender<Queued>,
    mut close: oneshot::Receiver<()>,
) {
    let post = |event: TransportEvent| {
        if tx.send(Queued::Socket { generation, event }).is_err() {
            tracing::debug!("session gone, dropping socket event");
        }
    };

    let connected = tokio::select! {
        result = connect_async(url.as_str()) => result,
        _ = &mut close => {
            post(TransportEvent::Closed);
            return;
        }
    };
    let mut stream = match connected {
        Ok((stream, _response)) => stream,
        Err(e) => {
            post(TransportEvent::Error(e.to_string()));
            post(TransportEvent::Closed);
            return;
        }
    };

    post(TransportEvent::Opened);
    loop {
        tokio::select! {
            next = stream.next() => match next {
                Some(Ok(Message::Text(text))) => post(TransportEvent::Message(text.as_str().to_owned())),
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::warn!(len = bytes.len(), "dropping binary message");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    post(TransportEvent::Error(e.to_string()));
                    break;
                }
            },
            _ = &mut close => {
                if let Err(e) = stream.close(None).await {
                    tracing::debug!(error = %e, "close handshake failed");
                }
                break;
            }
        }
    }
    post(TransportEvent::Closed);
}
