//! Configuration types for the radio client.

use crate::endpoint::Endpoint;
use crate::errors::RemoteClientError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete radio client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection settings.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Reconnection settings.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Keepalive settings.
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
    /// Status polling settings.
    #[serde(default)]
    pub status: StatusConfig,
}

/// Connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// WebSocket URL of the radio (`ws://` or `wss://`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Connection timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Reconnection configuration.
///
/// The defaults re-dial immediately and forever after every drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Enable automatic reconnection.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of consecutive retry attempts (0 = infinite).
    #[serde(default)]
    pub max_retries: u32,
    /// Initial backoff duration in milliseconds (0 = re-dial immediately).
    #[serde(default)]
    pub backoff_ms: u64,
    /// Maximum backoff duration in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Jitter factor (0.0-1.0) for backoff randomization.
    #[serde(default)]
    pub jitter: f32,
}

fn default_true() -> bool {
    true
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 0,
            backoff_ms: 0,
            max_backoff_ms: default_max_backoff_ms(),
            jitter: 0.0,
        }
    }
}

/// Keepalive configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeepaliveConfig {
    /// Ping interval in milliseconds (0 = disabled).
    ///
    /// When enabled, a link with no inbound traffic for two intervals is
    /// treated as failed.
    #[serde(default)]
    pub ping_interval_ms: u64,
}

/// Status configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Send a status request as soon as a connection opens.
    #[serde(default = "default_true")]
    pub request_on_open: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            request_on_open: true,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure or
    /// the resulting configuration fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self, RemoteClientError> {
        let config: Self = toml::from_str(text)
            .map_err(|e| RemoteClientError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RemoteClientError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RemoteClientError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), RemoteClientError> {
        if let Some(endpoint) = &self.connection.endpoint {
            Endpoint::parse(endpoint)?;
        }

        if self.connection.timeout_ms == 0 {
            return Err(RemoteClientError::Config(
                "Connection timeout cannot be 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.reconnect.jitter) {
            return Err(RemoteClientError::Config(
                "Jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.reconnect.backoff_ms > self.reconnect.max_backoff_ms {
            return Err(RemoteClientError::Config(
                "Initial backoff cannot exceed maximum backoff".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.connection.timeout_ms)
    }

    /// Returns the keepalive ping interval, if enabled.
    #[must_use]
    pub fn ping_interval(&self) -> Option<Duration> {
        match self.keepalive.ping_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Builder for creating a `ClientConfig`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: ClientConfig,
}

impl ConfigBuilder {
    /// Starts from an existing configuration.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Sets the radio's WebSocket URL.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.connection.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.connection.timeout_ms = timeout_ms;
        self
    }

    /// Enables or disables automatic reconnection.
    #[must_use]
    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.config.reconnect.enabled = enabled;
        self
    }

    /// Sets the initial and maximum reconnect backoff.
    #[must_use]
    pub fn backoff_ms(mut self, initial: u64, max: u64) -> Self {
        self.config.reconnect.backoff_ms = initial;
        self.config.reconnect.max_backoff_ms = max;
        self
    }

    /// Sets the consecutive retry limit (0 = infinite).
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.reconnect.max_retries = max_retries;
        self
    }

    /// Sets the backoff jitter factor.
    #[must_use]
    pub fn jitter(mut self, jitter: f32) -> Self {
        self.config.reconnect.jitter = jitter;
        self
    }

    /// Sets the keepalive ping interval (0 = disabled).
    #[must_use]
    pub fn ping_interval_ms(mut self, ping_interval_ms: u64) -> Self {
        self.config.keepalive.ping_interval_ms = ping_interval_ms;
        self
    }

    /// Controls the automatic status request on open.
    #[must_use]
    pub fn request_status_on_open(mut self, enabled: bool) -> Self {
        self.config.status.request_on_open = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<ClientConfig, RemoteClientError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .endpoint("ws://radio.local:8080")
            .backoff_ms(100, 5_000)
            .max_retries(3)
            .build()
            .unwrap();

        assert_eq!(config.connection.endpoint.as_deref(), Some("ws://radio.local:8080"));
        assert_eq!(config.reconnect.backoff_ms, 100);
        assert_eq!(config.reconnect.max_backoff_ms, 5_000);
        assert_eq!(config.reconnect.max_retries, 3);
    }

    #[test]
    fn test_defaults_retry_immediately_forever() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.reconnect.enabled);
        assert_eq!(config.reconnect.max_retries, 0);
        assert_eq!(config.reconnect.backoff_ms, 0);
        assert!(config.status.request_on_open);
        assert_eq!(config.ping_interval(), None);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_validation_bad_endpoint() {
        let result = ClientConfig::builder().endpoint("tcp://radio.local").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        assert!(ClientConfig::builder().timeout_ms(0).build().is_err());
    }

    #[test]
    fn test_config_validation_invalid_jitter() {
        assert!(ClientConfig::builder().jitter(1.5).build().is_err());
    }

    #[test]
    fn test_config_validation_backoff_order() {
        assert!(ClientConfig::builder().backoff_ms(10_000, 1_000).build().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ClientConfig::from_toml_str(
            r#"
            [connection]
            endpoint = "ws://10.0.0.7:81"

            [reconnect]
            backoff_ms = 250
            jitter = 0.2

            [keepalive]
            ping_interval_ms = 15000
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.endpoint.as_deref(), Some("ws://10.0.0.7:81"));
        assert_eq!(config.connection.timeout_ms, 10_000);
        assert!(config.reconnect.enabled);
        assert_eq!(config.reconnect.backoff_ms, 250);
        assert_eq!(config.reconnect.max_backoff_ms, 30_000);
        assert_eq!(config.ping_interval(), Some(Duration::from_secs(15)));
        assert!(config.status.request_on_open);
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert!(config.connection.endpoint.is_none());
        assert!(config.reconnect.enabled);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(ClientConfig::from_toml_str("connection = 5").is_err());
    }
}
