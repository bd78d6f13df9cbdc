//! Command-line argument parsing for radio remote applications.
//!
//! This module is only available when the `cli` feature is enabled.
//! It provides a structured way to parse command-line arguments and
//! convert them into a `ClientConfig` object.
//!
//! # Examples
//!
//! ```no_run
//! use radio_client::args::Args;
//! use radio_client::ClientConfig;
//!
//! let args = Args::parse();
//! let config = ClientConfig::from_args(&args)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::{ClientConfig, ConfigBuilder};
use crate::errors::RemoteClientError;
use clap::Parser;
use std::path::PathBuf;

/// Radio remote command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Radio WebSocket URL
    ///
    /// Examples:
    ///   - ws://192.168.1.20:8080
    ///   - wss://radio.example.com/ws
    #[arg(value_name = "ENDPOINT", env = "RADIO_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Configuration file path (TOML format)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial reconnect backoff in milliseconds (0 = re-dial immediately)
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,

    /// Maximum consecutive reconnect attempts (0 = infinite)
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Keepalive ping interval in milliseconds (0 = disabled)
    #[arg(long, value_name = "MS")]
    pub ping_ms: Option<u64>,

    /// Do not reconnect automatically after a drop
    #[arg(long)]
    pub no_reconnect: bool,

    /// Do not connect on startup
    #[arg(long)]
    pub offline: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse command-line arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse arguments from an iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }
}

impl ClientConfig {
    /// Create a configuration from command-line arguments.
    ///
    /// If a config file is specified in the arguments, it will be loaded
    /// first, then overridden by explicit command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The endpoint is invalid
    /// - The configuration validation fails
    pub fn from_args(args: &Args) -> Result<Self, RemoteClientError> {
        let base = match &args.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        let mut builder = ConfigBuilder::from_config(base.clone());

        if let Some(endpoint) = &args.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(backoff_ms) = args.backoff_ms {
            let max = base.reconnect.max_backoff_ms.max(backoff_ms);
            builder = builder.backoff_ms(backoff_ms, max);
        }
        if let Some(max_retries) = args.max_retries {
            builder = builder.max_retries(max_retries);
        }
        if let Some(ping_ms) = args.ping_ms {
            builder = builder.ping_interval_ms(ping_ms);
        }
        if args.no_reconnect {
            builder = builder.reconnect(false);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_minimal() {
        let args = Args::try_parse_from(["test", "ws://radio.local:8080"]).unwrap();
        assert_eq!(args.endpoint.as_deref(), Some("ws://radio.local:8080"));
        assert!(!args.no_reconnect);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::try_parse_from([
            "test",
            "ws://radio.local",
            "--backoff-ms",
            "500",
            "--max-retries",
            "10",
            "--no-reconnect",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.backoff_ms, Some(500));
        assert_eq!(args.max_retries, Some(10));
        assert!(args.no_reconnect);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_config_from_args() {
        let args = Args::try_parse_from([
            "test",
            "ws://radio.local",
            "--backoff-ms",
            "60000",
            "--ping-ms",
            "20000",
        ])
        .unwrap();
        let config = ClientConfig::from_args(&args).unwrap();

        assert_eq!(config.connection.endpoint.as_deref(), Some("ws://radio.local"));
        assert_eq!(config.reconnect.backoff_ms, 60_000);
        assert_eq!(config.reconnect.max_backoff_ms, 60_000);
        assert_eq!(config.keepalive.ping_interval_ms, 20_000);
        assert!(config.reconnect.enabled);
    }

    #[test]
    fn test_config_from_args_rejects_bad_endpoint() {
        let args = Args::try_parse_from(["test", "http://radio.local"]).unwrap();
        assert!(ClientConfig::from_args(&args).is_err());
    }

    #[test]
    fn test_config_from_args_missing_file() {
        let args = Args::try_parse_from(["test", "--config", "/nonexistent/radio.toml"]).unwrap();
        assert!(ClientConfig::from_args(&args).is_err());
    }
}
