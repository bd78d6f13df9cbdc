//! Error types for the radio client.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while managing the radio connection.
///
/// Only [`Config`](Self::Config) and [`ConnectionClosed`](Self::ConnectionClosed)
/// ever reach callers of the [`ConnectionManager`](crate::ConnectionManager)
/// operations. Everything else is a transport failure: it is logged, turned into a DISCONNECTED
/// transition, and retried if reconnection is enabled.
#[derive(Debug, Error)]
pub enum RemoteClientError {
    /// WebSocket-level error (framing, protocol violation, I/O).
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection failed (dial or WebSocket upgrade was refused).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt or keepalive timed out.
    #[error("Connection timeout after {0:?}")]
    Timeout(Duration),

    /// Configuration error, or an operation called in an invalid order.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The background event loop has stopped.
    #[error("Connection closed")]
    ConnectionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite;

    #[test]
    fn test_transport_error_conversion() {
        let err: RemoteClientError = tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, RemoteClientError::Transport(_)));
        assert!(err.to_string().starts_with("Transport error"));
    }

    #[test]
    fn test_error_display() {
        let err = RemoteClientError::Config("no endpoint configured".to_string());
        assert_eq!(err.to_string(), "Configuration error: no endpoint configured");

        let err = RemoteClientError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
    }
}
