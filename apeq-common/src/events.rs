//! Event types and wire types for the APEQ event system
//!
//! The daemon pushes `PlayerEvent` values to every subscribed listener; the UI
//! process sends `TrackDescriptor` payloads with play commands. Both sides of
//! the process boundary share these definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved scheme prefix identifying a bundled-resource locator.
///
/// Locators carrying this prefix name a file inside the daemon's configured
/// asset folder; all other locators are treated as filesystem paths.
pub const ASSET_SCHEME: &str = "asset://";

/// Track descriptor carried by a play command.
///
/// Immutable once constructed; the session coordinator replaces it wholesale
/// on each new play command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub title: String,
    pub artist: String,
    /// Source locator: `asset://<name>` or a filesystem path
    pub locator: String,
}

impl TrackDescriptor {
    /// Bundled-resource name, if the locator uses the asset scheme.
    pub fn asset_name(&self) -> Option<&str> {
        self.locator.strip_prefix(ASSET_SCHEME)
    }
}

/// Playback session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Playing,
    Paused,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Playing => write!(f, "playing"),
            SessionState::Paused => write!(f, "paused"),
        }
    }
}

/// APEQ event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Playback progress update (sent every 1s during playback)
    PlaybackProgress {
        title: String,
        artist: String,
        position_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Current track reached end-of-track
    PlaybackComplete {
        timestamp: DateTime<Utc>,
    },

    /// Session state changed
    PlaybackStateChanged {
        state: SessionState,
        timestamp: DateTime<Utc>,
    },

    /// Output volume changed
    VolumeChanged {
        volume: u32,
        timestamp: DateTime<Utc>,
    },
}

impl PlayerEvent {
    /// SSE event name for this event type
    pub fn event_name(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackProgress { .. } => "playback_progress",
            PlayerEvent::PlaybackComplete { .. } => "playback_complete",
            PlayerEvent::PlaybackStateChanged { .. } => "playback_state_changed",
            PlayerEvent::VolumeChanged { .. } => "volume_changed",
        }
    }
}
