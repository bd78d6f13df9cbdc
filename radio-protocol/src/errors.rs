//! Error types for the radio wire protocol.

use thiserror::Error;

/// Reasons an inbound payload could not be decoded into a status record.
///
/// Decoding is all-or-nothing: either the whole payload matches the
/// [`StatusRecord`](crate::StatusRecord) shape or one of these is returned.
/// A decode error never says anything about the health of the connection.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not JSON at all (syntax error or truncated input).
    #[error("payload is not valid JSON: {0}")]
    NotJson(String),

    /// The payload is JSON but fields are missing, unknown, or mistyped.
    #[error("payload does not match the status shape: {0}")]
    Shape(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Syntax | Category::Eof | Category::Io => Self::NotJson(err.to_string()),
            Category::Data => Self::Shape(err.to_string()),
        }
    }
}

impl DecodeError {
    /// Returns true if the payload was well-formed JSON of the wrong shape.
    #[must_use]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::Shape(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_is_not_json() {
        let err: DecodeError = serde_json::from_str::<serde_json::Value>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, DecodeError::NotJson(_)));
        assert!(!err.is_shape_mismatch());
    }

    #[test]
    fn test_truncated_input_is_not_json() {
        let err: DecodeError = serde_json::from_str::<serde_json::Value>(r#"{"app":"#)
            .unwrap_err()
            .into();
        assert!(matches!(err, DecodeError::NotJson(_)));
    }

    #[test]
    fn test_type_mismatch_is_shape() {
        let err: DecodeError = serde_json::from_str::<u32>(r#""three""#)
            .unwrap_err()
            .into();
        assert!(err.is_shape_mismatch());
        assert!(err.to_string().starts_with("payload does not match"));
    }
}
