//! WebSocket address of the radio.

use crate::errors::RemoteClientError;
use std::fmt;
use tokio_tungstenite::tungstenite::http::Uri;

/// Validated `ws://` or `wss://` address of the radio.
///
/// # Examples
///
/// ```
/// use radio_client::Endpoint;
///
/// let endpoint = Endpoint::parse("ws://192.168.1.20:8080/ws")?;
/// assert_eq!(endpoint.host(), "192.168.1.20");
/// assert!(!endpoint.is_secure());
///
/// assert!(Endpoint::parse("http://radio.local").is_err());
/// # Ok::<(), radio_client::RemoteClientError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    host: String,
    secure: bool,
}

impl Endpoint {
    /// Parses and validates an endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteClientError::Config`] if the URL does not parse, has a
    /// scheme other than `ws`/`wss`, or has no host.
    pub fn parse(url: &str) -> Result<Self, RemoteClientError> {
        let url = url.trim();
        let uri: Uri = url
            .parse()
            .map_err(|e| RemoteClientError::Config(format!("Invalid endpoint '{url}': {e}")))?;

        let secure = match uri.scheme_str() {
            Some("ws") => false,
            Some("wss") => true,
            Some(other) => {
                return Err(RemoteClientError::Config(format!(
                    "Endpoint '{url}' must use ws:// or wss://, not {other}://"
                )))
            }
            None => {
                return Err(RemoteClientError::Config(format!(
                    "Endpoint '{url}' is missing a ws:// or wss:// scheme"
                )))
            }
        };

        let host = match uri.host() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => {
                return Err(RemoteClientError::Config(format!(
                    "Endpoint '{url}' has no host"
                )))
            }
        };

        Ok(Self {
            url: url.to_string(),
            host,
            secure,
        })
    }

    /// The URL as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Host part of the URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// True for `wss://` endpoints.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ws() {
        let endpoint = Endpoint::parse("ws://radio.local:8080/socket").unwrap();
        assert_eq!(endpoint.as_str(), "ws://radio.local:8080/socket");
        assert_eq!(endpoint.host(), "radio.local");
        assert!(!endpoint.is_secure());
    }

    #[test]
    fn test_parse_wss_trims_whitespace() {
        let endpoint = Endpoint::parse("  wss://radio.example.com/ws \n").unwrap();
        assert!(endpoint.is_secure());
        assert_eq!(endpoint.to_string(), "wss://radio.example.com/ws");
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        let err = Endpoint::parse("http://radio.local").unwrap_err();
        assert!(matches!(err, RemoteClientError::Config(_)));
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert!(Endpoint::parse("radio.local:8080").is_err());
        assert!(Endpoint::parse("").is_err());
    }
}
