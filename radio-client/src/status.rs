//! Last known radio status.

use parking_lot::RwLock;
use radio_protocol::{codec, DecodeError, StatusRecord};
use tracing::debug;

/// Holds the most recent status snapshot that decoded successfully.
///
/// Feed it every inbound message. Payloads that are not status snapshots
/// leave the stored record untouched.
///
/// # Examples
///
/// ```
/// use radio_client::LastKnownStatus;
///
/// let status = LastKnownStatus::new();
/// assert!(status.apply("not json").is_err());
/// assert!(status.get().is_none());
/// ```
#[derive(Debug, Default)]
pub struct LastKnownStatus {
    record: RwLock<Option<StatusRecord>>,
}

impl LastKnownStatus {
    /// Creates an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `message` and, on success, replaces the stored record.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`] if the message is not a status snapshot.
    /// The stored record is left as it was.
    pub fn apply(&self, message: &str) -> Result<StatusRecord, DecodeError> {
        match codec::decode_status(message) {
            Ok(record) => {
                *self.record.write() = Some(record.clone());
                Ok(record)
            }
            Err(e) => {
                debug!("Ignoring inbound message: {}", e);
                Err(e)
            }
        }
    }

    /// Returns a copy of the stored record.
    #[must_use]
    pub fn get(&self) -> Option<StatusRecord> {
        self.record.read().clone()
    }

    /// Forgets the stored record.
    pub fn clear(&self) {
        *self.record.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use radio_protocol::{App, ViewMode};

    fn snapshot(app: &str, station: i32) -> String {
        format!(
            r#"{{"app":"{app}","radio1_station":{station},"radio2_station":0,"music":{{"viewMode":"VIEW_MODE_FOLDER","albumName":"","currentSongName":""}},"video":{{}}}}"#
        )
    }

    #[test]
    fn test_apply_replaces_record() {
        let status = LastKnownStatus::new();
        status.apply(&snapshot("radio1", 3)).unwrap();
        status.apply(&snapshot("radio2", 5)).unwrap();

        let record = status.get().unwrap();
        assert_eq!(record.app, App::Radio2);
        assert_eq!(record.radio1_station, 5);
        assert_eq!(record.music.view_mode, ViewMode::Folder);
    }

    #[test]
    fn test_decode_error_keeps_previous_record() {
        let status = LastKnownStatus::new();
        let first = status.apply(&snapshot("radio1", 3)).unwrap();

        assert!(status.apply("not json").is_err());
        assert!(status.apply(r#"{"app": "video"}"#).is_err());

        assert_eq!(status.get(), Some(first));
    }

    #[test]
    fn test_clear() {
        let status = LastKnownStatus::new();
        status.apply(&snapshot("music", 0)).unwrap();
        status.clear();
        assert!(status.get().is_none());
    }
}
