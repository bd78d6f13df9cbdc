//! Encoding of outbound commands and decoding of inbound status payloads.
//!
//! # Wire Format
//!
//! Every message is a single flat JSON object:
//!
//! - Notification: `{"notification": "<text>"}`
//! - App selection: `{"app": "<radio1|radio2|music|video>"}`
//! - Status request: `{"status": "get"}`
//!
//! Inbound status snapshots are decoded into [`StatusRecord`].

use crate::errors::DecodeError;
use crate::status::StatusRecord;
use serde_json::Value;

/// Envelope key for free-text notifications.
pub const NOTIFICATION_KEY: &str = "notification";
/// Envelope key for application selection.
pub const APP_KEY: &str = "app";
/// Envelope key for status requests.
pub const STATUS_KEY: &str = "status";

/// Builds a one-field envelope.
///
/// Both key and value go through JSON string escaping, so quotes and control
/// characters in free text cannot break out of the object.
fn envelope(key: &str, value: &str) -> String {
    format!("{{{}: {}}}", Value::from(key), Value::from(value))
}

/// Wraps free text in a notification envelope.
#[must_use]
pub fn encode_notification(text: &str) -> String {
    envelope(NOTIFICATION_KEY, text)
}

/// Wraps an application identifier in an app-selection envelope.
///
/// The identifier is passed through as-is; checking it against
/// [`App`](crate::App) is up to the caller.
#[must_use]
pub fn encode_app_selection(app_id: &str) -> String {
    envelope(APP_KEY, app_id)
}

/// Returns the constant status-request envelope.
#[must_use]
pub fn encode_status_request() -> String {
    envelope(STATUS_KEY, "get")
}

/// Decodes a status snapshot.
///
/// # Errors
///
/// Returns [`DecodeError::NotJson`] for text that is not JSON and
/// [`DecodeError::Shape`] for JSON with missing, extra or mistyped fields.
pub fn decode_status(message: &str) -> Result<StatusRecord, DecodeError> {
    Ok(serde_json::from_str(message)?)
}

/// Commands the remote can send to the radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show a free-text notification on the radio.
    Notification(String),
    /// Bring an application to the foreground.
    SelectApp(String),
    /// Ask the radio to send its current status.
    StatusRequest,
}

impl Command {
    /// Encodes the command into its wire envelope.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Notification(text) => encode_notification(text),
            Self::SelectApp(app) => encode_app_selection(app),
            Self::StatusRequest => encode_status_request(),
        }
    }
}

impl From<crate::App> for Command {
    fn from(app: crate::App) -> Self {
        Self::SelectApp(app.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{App, MusicState, VideoState, ViewMode};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"{"app":"radio1","radio1_station":3,"radio2_station":0,"music":{"viewMode":"VIEW_MODE_PLAYBACK","albumName":"A","currentSongName":"S"},"video":{}}"#;

    #[test]
    fn test_encode_envelopes() {
        assert_eq!(encode_app_selection("video"), r#"{"app": "video"}"#);
        assert_eq!(encode_notification("hello"), r#"{"notification": "hello"}"#);
        assert_eq!(encode_status_request(), r#"{"status": "get"}"#);
    }

    #[test]
    fn test_app_selection_passes_unknown_ids_through() {
        assert_eq!(encode_app_selection("tv"), r#"{"app": "tv"}"#);
    }

    #[test]
    fn test_notification_escapes_quotes() {
        let encoded = encode_notification(r#"say "hi"\now"#);
        assert_eq!(encoded, r#"{"notification": "say \"hi\"\\now"}"#);
    }

    #[test]
    fn test_command_encode() {
        assert_eq!(Command::StatusRequest.encode(), encode_status_request());
        assert_eq!(Command::from(App::Music).encode(), r#"{"app": "music"}"#);
        assert_eq!(
            Command::Notification("x".into()).encode(),
            r#"{"notification": "x"}"#
        );
    }

    #[test]
    fn test_decode_status() {
        let record = decode_status(SAMPLE).unwrap();
        assert_eq!(
            record,
            StatusRecord {
                app: App::Radio1,
                radio1_station: 3,
                radio2_station: 0,
                music: MusicState {
                    view_mode: ViewMode::Playback,
                    album_name: "A".to_string(),
                    current_song_name: "S".to_string(),
                },
                video: VideoState::default(),
            }
        );
    }

    #[test]
    fn test_decode_keeps_opaque_video_state() {
        let text = SAMPLE.replace(r#""video":{}"#, r#""video":{"file":"clip.mp4","pos":12}"#);
        let record = decode_status(&text).unwrap();
        assert_eq!(record.video.0["file"], "clip.mp4");
        assert_eq!(record.video.0["pos"], 12);
    }

    #[test]
    fn test_decode_not_json() {
        assert!(matches!(
            decode_status("not json"),
            Err(DecodeError::NotJson(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let text = SAMPLE.replace(r#""radio2_station":0,"#, "");
        assert!(decode_status(&text).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_decode_rejects_extra_field() {
        let text = SAMPLE.replace(r#""app":"radio1","#, r#""app":"radio1","volume":5,"#);
        assert!(decode_status(&text).unwrap_err().is_shape_mismatch());

        let nested = SAMPLE.replace(r#""albumName":"A","#, r#""albumName":"A","year":1999,"#);
        assert!(decode_status(&nested).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_decode_rejects_mistyped_field() {
        let text = SAMPLE.replace(r#""radio1_station":3"#, r#""radio1_station":"3""#);
        assert!(decode_status(&text).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_decode_rejects_unknown_app() {
        let text = SAMPLE.replace(r#""app":"radio1""#, r#""app":"tv""#);
        assert!(decode_status(&text).unwrap_err().is_shape_mismatch());
    }

    #[test]
    fn test_decode_command_echo_is_not_a_status() {
        assert!(decode_status(&encode_app_selection("video")).is_err());
    }

    proptest! {
        #[test]
        fn prop_notification_is_single_field_object(text in ".*") {
            let encoded = encode_notification(&text);
            let value: Value = serde_json::from_str(&encoded).unwrap();
            let object = value.as_object().unwrap();
            prop_assert_eq!(object.len(), 1);
            prop_assert_eq!(object[NOTIFICATION_KEY].as_str(), Some(text.as_str()));
        }
    }
}
