//! Wire protocol for the internet radio remote.
//!
//! The radio speaks small flat JSON objects over a WebSocket. This crate owns
//! both directions of that conversation and nothing else: it has no I/O and
//! no async code, so it can be used from the connection layer, from tests,
//! and from any display front-end alike.
//!
//! # Modules
//!
//! - [`codec`] - Outbound command envelopes and inbound status decoding
//! - [`status`] - The typed [`StatusRecord`] snapshot of the radio
//! - [`errors`] - [`DecodeError`] for payloads that do not match the model
//!
//! # Examples
//!
//! ```
//! use radio_protocol::{codec, App};
//!
//! assert_eq!(codec::encode_app_selection("video"), r#"{"app": "video"}"#);
//!
//! let record = codec::decode_status(
//!     r#"{"app":"radio1","radio1_station":3,"radio2_station":0,
//!         "music":{"viewMode":"VIEW_MODE_PLAYBACK","albumName":"A","currentSongName":"S"},
//!         "video":{}}"#,
//! )?;
//! assert_eq!(record.app, App::Radio1);
//! assert_eq!(record.radio1_station, 3);
//! # Ok::<(), radio_protocol::DecodeError>(())
//! ```

pub mod codec;
pub mod errors;
pub mod status;

// Re-export commonly used types
pub use codec::{decode_status, Command};
pub use errors::DecodeError;
pub use status::{App, MusicState, StatusRecord, VideoState, ViewMode};
