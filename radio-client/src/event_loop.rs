//! Event loop coordination: lifecycle state machine and reconnection logic.
//!
//! All user commands and all session reports funnel into one task, so every
//! transition and every observer notification happens on a single writer,
//! in order. Session tasks never touch the lifecycle directly.

use crate::{
    config::ClientConfig,
    endpoint::Endpoint,
    messages::{ConnectionState, Lifecycle},
    observer::Observers,
    reconnect::{ReconnectPolicy, Retry},
    transport::{self, CloseReason, Outbound, SessionEvent, SessionSettings},
};
use parking_lot::RwLock;
use radio_protocol::codec;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Commands from [`ConnectionManager`](crate::ConnectionManager) handles.
#[derive(Debug)]
pub(crate) enum Command {
    Connect(Endpoint),
    Disconnect,
    Send(String),
}

/// The live transport, if any.
struct Session {
    generation: u64,
    outbound: flume::Sender<Outbound>,
}

pub(crate) struct EventLoop {
    settings: SessionSettings,
    policy: ReconnectPolicy,
    request_status_on_open: bool,
    endpoint: Option<Endpoint>,
    lifecycle: Lifecycle,
    shared_lifecycle: Arc<RwLock<Lifecycle>>,
    observers: Arc<Observers>,
    reconnect: bool,
    /// `connect()` arrived while a requested close was still in flight.
    redial_after_close: bool,
    failures: u32,
    generation: u64,
    session: Option<Session>,
    retry_at: Option<Instant>,
    session_tx: flume::Sender<SessionEvent>,
}

/// Spawn the event loop on the given runtime.
pub(crate) fn spawn(
    runtime: &tokio::runtime::Handle,
    config: &ClientConfig,
    commands: flume::Receiver<Command>,
    shared_lifecycle: Arc<RwLock<Lifecycle>>,
    observers: Arc<Observers>,
) -> tokio::task::JoinHandle<()> {
    let (session_tx, session_rx) = flume::unbounded();
    let event_loop = EventLoop {
        settings: SessionSettings {
            connect_timeout: config.timeout(),
            ping_interval: config.ping_interval(),
        },
        policy: ReconnectPolicy::new(config.reconnect.clone()),
        request_status_on_open: config.status.request_on_open,
        endpoint: None,
        lifecycle: Lifecycle::Disconnected,
        shared_lifecycle,
        observers,
        reconnect: false,
        redial_after_close: false,
        failures: 0,
        generation: 0,
        session: None,
        retry_at: None,
        session_tx,
    };
    runtime.spawn(event_loop.run(commands, session_rx))
}

impl EventLoop {
    async fn run(
        mut self,
        commands: flume::Receiver<Command>,
        sessions: flume::Receiver<SessionEvent>,
    ) {
        loop {
            let retry_at = self.retry_at;
            tokio::select! {
                command = commands.recv_async() => match command {
                    Ok(command) => self.handle_command(command),
                    // Every handle has been dropped
                    Err(_) => break,
                },
                Ok(event) = sessions.recv_async() => self.handle_session_event(event),
                () = retry_timer(retry_at) => {
                    self.retry_at = None;
                    self.redial();
                }
            }
        }

        debug!("All handles dropped, shutting down event loop");
        self.reconnect = false;
        if let Some(session) = self.session.take() {
            let _ = session.outbound.send(Outbound::Close);
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect(endpoint) => {
                self.endpoint = Some(endpoint);
                self.reconnect = self.policy.enabled();
                self.failures = 0;
                match self.lifecycle {
                    Lifecycle::Disconnected => {
                        self.retry_at = None;
                        self.dial();
                    }
                    Lifecycle::Closing => {
                        debug!("connect() while closing, re-dialing once the close completes");
                        self.redial_after_close = true;
                    }
                    Lifecycle::Connecting | Lifecycle::Connected => {
                        debug!("connect() while {}, nothing to do", self.lifecycle);
                    }
                }
            }
            Command::Disconnect => {
                // Cleared before the close so the close does not re-dial.
                self.reconnect = false;
                self.redial_after_close = false;
                self.retry_at = None;
                match self.lifecycle {
                    Lifecycle::Connecting | Lifecycle::Connected => {
                        info!("Closing connection");
                        self.set_lifecycle(Lifecycle::Closing);
                        if let Some(session) = &self.session {
                            let _ = session.outbound.send(Outbound::Close);
                        }
                    }
                    Lifecycle::Closing | Lifecycle::Disconnected => {}
                }
            }
            Command::Send(text) => self.send(text),
        }
    }

    fn send(&self, text: String) {
        match (&self.session, self.lifecycle) {
            (Some(session), Lifecycle::Connected) => {
                let _ = session.outbound.send(Outbound::Text(text));
            }
            _ => debug!("Dropping outbound message while {}", self.lifecycle),
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Opened { generation } if self.is_current(generation) => {
                if self.lifecycle != Lifecycle::Connecting {
                    // disconnect() raced the open; the queued Close finishes it.
                    trace!("Open while {}, waiting for close", self.lifecycle);
                    return;
                }
                self.failures = 0;
                self.set_lifecycle(Lifecycle::Connected);
                // Queued before observers run so it goes out ahead of any user send.
                if self.request_status_on_open {
                    self.send(codec::encode_status_request());
                }
                self.observers.state_changed(ConnectionState::Connected);
            }
            SessionEvent::Message { generation, text } if self.is_current(generation) => {
                if self.lifecycle == Lifecycle::Connected {
                    self.observers.message(&text);
                }
            }
            SessionEvent::Closed { generation, reason } if self.is_current(generation) => {
                match &reason {
                    CloseReason::Requested => info!("Connection closed"),
                    CloseReason::Remote => info!("Connection closed by radio"),
                    CloseReason::Failed(e) => warn!("Connection lost: {}", e),
                }
                self.session = None;
                self.set_lifecycle(Lifecycle::Disconnected);
                self.observers.state_changed(ConnectionState::Disconnected);

                if std::mem::take(&mut self.redial_after_close) {
                    // Explicit connect(): no backoff and no failure count.
                    self.dial();
                } else if self.reconnect {
                    self.schedule_retry();
                }
            }
            stale => trace!(?stale, "Ignoring event from a previous connection"),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.generation == generation)
    }

    fn schedule_retry(&mut self) {
        self.failures = self.failures.saturating_add(1);
        match self.policy.next(self.failures) {
            Retry::After(delay) if delay.is_zero() => self.dial(),
            Retry::After(delay) => {
                debug!("Reconnecting in {:?} (attempt {})", delay, self.failures);
                self.retry_at = Some(Instant::now() + delay);
            }
            Retry::GiveUp => {
                let attempts = self.failures - 1;
                warn!("Giving up after {} reconnect attempts", attempts);
                self.reconnect = false;
                self.observers.gave_up(attempts);
            }
        }
    }

    fn redial(&mut self) {
        if self.reconnect && self.lifecycle == Lifecycle::Disconnected {
            self.dial();
        }
    }

    fn dial(&mut self) {
        let Some(endpoint) = self.endpoint.clone() else {
            warn!("No endpoint configured, not dialing");
            return;
        };

        self.generation += 1;
        let (outbound_tx, outbound_rx) = flume::unbounded();
        self.session = Some(Session {
            generation: self.generation,
            outbound: outbound_tx,
        });
        self.set_lifecycle(Lifecycle::Connecting);

        tokio::spawn(transport::run_session(
            self.generation,
            endpoint,
            self.settings.clone(),
            outbound_rx,
            self.session_tx.clone(),
        ));
    }

    fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        trace!("{} -> {}", self.lifecycle, lifecycle);
        self.lifecycle = lifecycle;
        *self.shared_lifecycle.write() = lifecycle;
    }
}

async fn retry_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
