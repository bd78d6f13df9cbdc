//! Typed snapshot of the radio's state.
//!
//! A [`StatusRecord`] only ever comes out of
//! [`decode_status`](crate::codec::decode_status). Every struct here rejects
//! unknown fields so that a payload either matches completely or not at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Applications the radio can have in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum App {
    /// First internet radio player.
    Radio1,
    /// Second internet radio player.
    Radio2,
    /// Local music library.
    Music,
    /// Video player.
    Video,
}

impl App {
    /// Every selectable application, in on-screen order.
    pub const ALL: [App; 4] = [App::Radio1, App::Radio2, App::Music, App::Video];

    /// Wire identifier used in `{"app": ...}` envelopes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Radio1 => "radio1",
            Self::Radio2 => "radio2",
            Self::Music => "music",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`App`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown app '{0}' (expected radio1, radio2, music or video)")]
pub struct UnknownApp(pub String);

impl FromStr for App {
    type Err = UnknownApp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|app| app.as_str() == s)
            .ok_or_else(|| UnknownApp(s.to_string()))
    }
}

/// What the music app is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    /// Browsing the folder tree.
    #[serde(rename = "VIEW_MODE_FOLDER")]
    Folder,
    /// Playing back an album.
    #[serde(rename = "VIEW_MODE_PLAYBACK")]
    Playback,
}

/// Music app sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MusicState {
    /// Browse or playback view.
    pub view_mode: ViewMode,
    /// Album currently selected.
    pub album_name: String,
    /// Song currently playing.
    pub current_song_name: String,
}

/// Video app sub-state.
///
/// The radio does not document this object, so it is kept as raw JSON.
/// It must still be an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoState(pub serde_json::Map<String, serde_json::Value>);

impl VideoState {
    /// Returns true if the radio sent an empty object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Full status snapshot sent by the radio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusRecord {
    /// Application in the foreground.
    pub app: App,
    /// Station selected in the first radio app.
    pub radio1_station: i32,
    /// Station selected in the second radio app.
    pub radio2_station: i32,
    /// Music app sub-state.
    pub music: MusicState,
    /// Video app sub-state.
    pub video: VideoState,
}

impl StatusRecord {
    /// Station of the foreground radio app, or `None` for music and video.
    #[must_use]
    pub fn active_station(&self) -> Option<i32> {
        match self.app {
            App::Radio1 => Some(self.radio1_station),
            App::Radio2 => Some(self.radio2_station),
            App::Music | App::Video => None,
        }
    }
}
