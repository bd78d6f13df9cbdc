//! Application-facing state and event types.

use std::fmt;

/// Connection state as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No open connection (including while connecting or waiting to retry).
    Disconnected,
    /// The WebSocket is open and sends are delivered.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Full lifecycle of the managed connection.
///
/// ```text
/// Disconnected --connect()--> Connecting --open--> Connected
///      ^                          |                   |
///      |<----closed/failed--------+                   |
///      |<----closed/failed----------------------------+
///      |                                              |
///      +<---closed---- Closing <----disconnect()------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// No transport exists. A re-dial may be scheduled.
    Disconnected,
    /// A transport is being dialed.
    Connecting,
    /// The transport is open.
    Connected,
    /// A graceful close has been requested and not yet completed.
    Closing,
}

impl Lifecycle {
    /// Collapses the lifecycle into the observer-facing state.
    #[must_use]
    pub fn state(self) -> ConnectionState {
        match self {
            Self::Connected => ConnectionState::Connected,
            Self::Disconnected | Self::Connecting | Self::Closing => ConnectionState::Disconnected,
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Closing => write!(f, "Closing"),
        }
    }
}

/// Events delivered to channel subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The connection state changed.
    StateChanged(ConnectionState),

    /// A text message arrived from the radio.
    Message(String),

    /// The retry limit was reached and automatic reconnection was disabled.
    ///
    /// Calling `connect()` again re-arms it.
    ReconnectGaveUp {
        /// Consecutive failed attempts.
        attempts: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_state() {
        assert_eq!(Lifecycle::Connected.state(), ConnectionState::Connected);
        assert_eq!(Lifecycle::Connecting.state(), ConnectionState::Disconnected);
        assert_eq!(Lifecycle::Closing.state(), ConnectionState::Disconnected);
        assert_eq!(Lifecycle::Disconnected.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_connection_event_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ConnectionEvent>();
    }
}
