//! # APEQ Audio Player (apeq-ap)
//!
//! Background audio player daemon for APEQ.
//!
//! **Purpose:** Decode audio files, run the single playback session, apply the
//! multi-band gain cascade to the 16-bit sample path, and provide the HTTP/SSE
//! control interface consumed by the UI process.
//!
//! **Architecture:** One coordinator task owns the media renderer; transport
//! commands from the HTTP layer are marshalled onto it over a channel, and
//! progress/completion events fan out to subscribed listeners.

pub mod api;
pub mod audio;
pub mod error;
pub mod session;
pub mod volume;

pub use error::{Error, Result};
