//! Self-healing connection to the internet radio.
//!
//! This crate owns the one persistent WebSocket between the remote and the
//! radio. It dials, notices when the link drops, re-dials, tells interested
//! parties about every state change and inbound message, and frames the
//! commands built by `radio-protocol`.
//!
//! # Quick Start
//!
//! ```no_run
//! use radio_client::{ClientConfig, ConnectionManager, ConnectionState, LastKnownStatus};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), radio_client::RemoteClientError> {
//!     let manager = ConnectionManager::new(ClientConfig::default())?;
//!     manager.configure("ws://192.168.1.20:8080")?;
//!
//!     let status = Arc::new(LastKnownStatus::new());
//!     let sink = status.clone();
//!     manager.on_message(move |text| {
//!         let _ = sink.apply(text);
//!     });
//!     manager.on_state_change(|state| println!("radio is {state}"));
//!
//!     manager.connect()?;
//!     // ... later, from a button handler:
//!     if manager.state() == ConnectionState::Connected {
//!         manager.select_app("radio2");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Event loop**: a single task owns the lifecycle state machine and runs
//!   every observer callback, so transitions are serialized and delivered in
//!   order.
//! - **Session task**: one per connection attempt, exclusively owning the
//!   socket and reporting open/message/close back to the event loop.
//! - **Handles**: [`ConnectionManager`] is a cheap clone that only enqueues
//!   commands, so no operation ever blocks on the network.
//!
//! # Error Handling
//!
//! Only configuration mistakes are returned to callers. Transport failures
//! show up as a DISCONNECTED notification followed, if reconnection is
//! enabled, by a fresh attempt.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod messages;
pub mod status;

// Private implementation modules
mod event_loop;
mod observer;
mod reconnect;
mod transport;

// Optional CLI support
#[cfg(feature = "cli")]
pub mod args;

// Re-exports
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use errors::RemoteClientError;
pub use messages::{ConnectionEvent, ConnectionState, Lifecycle};
pub use status::LastKnownStatus;

use event_loop::Command;
use observer::Observers;
use parking_lot::{Mutex, RwLock};
use radio_protocol::codec;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Handle to the connection manager.
///
/// Construct one at the composition root and hand clones to every consumer;
/// all clones drive the same connection. When the last clone is dropped the
/// connection is closed and the background task exits.
///
/// Observers are owned by the manager, so an observer that captures a
/// `ConnectionManager` clone forms a reference cycle and keeps the
/// connection alive after every other handle is gone. Observers that need
/// to call back into the manager should capture a [`WeakConnectionManager`]
/// from [`downgrade`](Self::downgrade) instead.
///
/// Every method returns immediately. Outcomes arrive through
/// [`on_state_change`](Self::on_state_change),
/// [`on_message`](Self::on_message) and [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

/// Non-owning handle to a [`ConnectionManager`].
///
/// # Examples
///
/// ```no_run
/// use radio_client::{ClientConfig, ConnectionManager, ConnectionState};
///
/// # async fn demo() -> Result<(), radio_client::RemoteClientError> {
/// let manager = ConnectionManager::new(ClientConfig::default())?;
/// let weak = manager.downgrade();
/// manager.on_state_change(move |state| {
///     if let (ConnectionState::Connected, Some(manager)) = (state, weak.upgrade()) {
///         manager.select_app("radio1");
///     }
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WeakConnectionManager {
    inner: Weak<Inner>,
}

impl WeakConnectionManager {
    /// Returns a full handle, or `None` once every [`ConnectionManager`]
    /// clone has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<ConnectionManager> {
        self.inner.upgrade().map(|inner| ConnectionManager { inner })
    }
}

struct Inner {
    commands: flume::Sender<Command>,
    control: Mutex<Control>,
    lifecycle: Arc<RwLock<Lifecycle>>,
    observers: Arc<Observers>,
}

/// Caller-side bookkeeping that must be checked synchronously.
struct Control {
    endpoint: Option<Endpoint>,
    /// Set by `connect()`, cleared by `disconnect()`.
    active: bool,
}

impl ConnectionManager {
    /// Creates a manager and starts its event loop.
    ///
    /// If the configuration names an endpoint it is configured right away.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::Config`] if the configuration is invalid
    /// or if called outside a Tokio runtime.
    pub fn new(config: ClientConfig) -> Result<Self, RemoteClientError> {
        config.validate()?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            RemoteClientError::Config(format!("ConnectionManager needs a Tokio runtime: {e}"))
        })?;

        let endpoint = config
            .connection
            .endpoint
            .as_deref()
            .map(Endpoint::parse)
            .transpose()?;

        let (cmd_tx, cmd_rx) = flume::unbounded();
        let lifecycle = Arc::new(RwLock::new(Lifecycle::Disconnected));
        let observers = Arc::new(Observers::default());

        // Detached: exits once every handle is dropped.
        drop(event_loop::spawn(
            &runtime,
            &config,
            cmd_rx,
            lifecycle.clone(),
            observers.clone(),
        ));

        Ok(Self {
            inner: Arc::new(Inner {
                commands: cmd_tx,
                control: Mutex::new(Control {
                    endpoint,
                    active: false,
                }),
                lifecycle,
                observers,
            }),
        })
    }

    /// Sets the radio's address.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::Config`] if the URL is invalid, or if a
    /// connection has been started and not yet stopped with
    /// [`disconnect`](Self::disconnect).
    pub fn configure(&self, endpoint: &str) -> Result<(), RemoteClientError> {
        let endpoint = Endpoint::parse(endpoint)?;
        let mut control = self.inner.control.lock();
        if control.active {
            return Err(RemoteClientError::Config(
                "Cannot change the endpoint while connected; call disconnect() first".to_string(),
            ));
        }
        debug!("Endpoint set to {}", endpoint);
        control.endpoint = Some(endpoint);
        Ok(())
    }

    /// Starts connecting and enables automatic reconnection.
    ///
    /// Does nothing beyond re-enabling reconnection if a connection is
    /// already open or being opened.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::Config`] if no endpoint is configured.
    pub fn connect(&self) -> Result<(), RemoteClientError> {
        let mut control = self.inner.control.lock();
        let endpoint = control.endpoint.clone().ok_or_else(|| {
            RemoteClientError::Config("No endpoint configured; call configure() first".to_string())
        })?;
        control.active = true;
        self.command(Command::Connect(endpoint))
    }

    /// Closes the connection and disables automatic reconnection.
    ///
    /// A DISCONNECTED notification follows if anything was connected or
    /// connecting.
    pub fn disconnect(&self) {
        self.inner.control.lock().active = false;
        let _ = self.command(Command::Disconnect);
    }

    /// Sends `message` verbatim if the connection is open.
    ///
    /// While disconnected or reconnecting the message is dropped, not
    /// queued. Check [`state`](Self::state) before relying on delivery.
    pub fn send(&self, message: impl Into<String>) {
        if self.lifecycle() != Lifecycle::Connected {
            trace!("Not connected, dropping outbound message");
            return;
        }
        let _ = self.command(Command::Send(message.into()));
    }

    /// Shows free text on the radio.
    pub fn send_notification(&self, text: &str) {
        self.send(codec::encode_notification(text));
    }

    /// Brings an application to the foreground on the radio.
    pub fn select_app(&self, app_id: &str) {
        self.send(codec::encode_app_selection(app_id));
    }

    /// Asks the radio to send its current status.
    pub fn request_status(&self) {
        self.send(codec::encode_status_request());
    }

    /// Registers the state observer, replacing any previous one.
    pub fn on_state_change<F>(&self, observer: F)
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        self.inner.observers.set_state_callback(Arc::new(observer));
    }

    /// Registers the inbound message observer, replacing any previous one.
    pub fn on_message<F>(&self, observer: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.inner.observers.set_message_callback(Arc::new(observer));
    }

    /// Adds a channel subscriber that receives every event.
    ///
    /// Unlike the `on_*` observers, subscribers accumulate. A subscriber is
    /// removed once its receiver is dropped.
    #[must_use]
    pub fn subscribe(&self) -> flume::Receiver<ConnectionEvent> {
        self.inner.observers.subscribe()
    }

    /// Current observer-facing state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.lifecycle().state()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        *self.inner.lifecycle.read()
    }

    /// Creates a handle that does not keep the connection alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakConnectionManager {
        WeakConnectionManager {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Configured endpoint, if any.
    #[must_use]
    pub fn endpoint(&self) -> Option<Endpoint> {
        self.inner.control.lock().endpoint.clone()
    }

    fn command(&self, command: Command) -> Result<(), RemoteClientError> {
        self.inner
            .commands
            .send(command)
            .map_err(|_| RemoteClientError::ConnectionClosed)
    }
}
