//! Output volume control
//!
//! Stepped volume surface in the style of a mobile stream volume: integer
//! levels `0..=MAX_VOLUME_STEPS`. The control owns clamping; callers pass
//! requested levels through unvalidated.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Number of volume steps (level range is 0..=MAX_VOLUME_STEPS)
pub const MAX_VOLUME_STEPS: u32 = 15;

/// Default startup volume level
pub const DEFAULT_VOLUME: u32 = 11;

/// Output-volume control surface.
pub trait VolumeControl: Send + Sync {
    /// Current volume level
    fn volume(&self) -> u32;

    /// Maximum volume level
    fn max_volume(&self) -> u32;

    /// Set the volume level; out-of-range values are clamped here.
    fn set_volume(&self, level: u32);
}

/// Process-wide output volume.
///
/// Keeps the stepped level for the control surface and a linear factor shared
/// with the audio output callback.
pub struct SystemVolume {
    level: AtomicU32,
    factor: Arc<Mutex<f32>>,
}

impl SystemVolume {
    pub fn new(level: u32) -> Self {
        let level = level.min(MAX_VOLUME_STEPS);
        Self {
            level: AtomicU32::new(level),
            factor: Arc::new(Mutex::new(level as f32 / MAX_VOLUME_STEPS as f32)),
        }
    }

    /// Linear volume factor handle, read by the audio callback.
    pub fn factor_handle(&self) -> Arc<Mutex<f32>> {
        Arc::clone(&self.factor)
    }
}

impl Default for SystemVolume {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl VolumeControl for SystemVolume {
    fn volume(&self) -> u32 {
        self.level.load(Ordering::Acquire)
    }

    fn max_volume(&self) -> u32 {
        MAX_VOLUME_STEPS
    }

    fn set_volume(&self, level: u32) {
        let clamped = level.min(MAX_VOLUME_STEPS);
        self.level.store(clamped, Ordering::Release);
        *self.factor.lock().unwrap() = clamped as f32 / MAX_VOLUME_STEPS as f32;
    }
}
