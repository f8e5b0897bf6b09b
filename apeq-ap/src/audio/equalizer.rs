//! Multi-band gain cascade over 16-bit PCM samples
//!
//! Each "band" is a scalar multiplier stage (no frequency separation). Gains
//! are integer units where 1000 = unity; `unit / 1000` is the linear factor.
//! Bands apply as a cascade in list order.
//!
//! Saturation policy: every band multiplication rounds to the nearest integer
//! (ties away from zero) and clamps to the 16-bit signed range before the next
//! band sees the value. A cascade whose partial product leaves the range
//! therefore saturates mid-cascade, like fixed-point hardware, even when the
//! final product would land back inside it.

use std::sync::{Arc, RwLock};

/// Gain unit representing unity (factor 1.0)
pub const UNITY_GAIN: i32 = 1000;

/// Apply a gain cascade to a buffer of 16-bit PCM samples, in place.
///
/// The buffer is channel-agnostic: mono and interleaved multi-channel data are
/// processed identically, sample by sample. Gain values are not validated; a
/// negative gain inverts the signal.
///
/// Returns the number of samples processed (the buffer length).
pub fn apply_gains(samples: &mut [i16], gains: &[i32]) -> usize {
    for sample in samples.iter_mut() {
        let mut value = *sample;
        for &gain in gains {
            let scaled = f64::from(value) * (f64::from(gain) / f64::from(UNITY_GAIN));
            value = scaled
                .round()
                .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        }
        *sample = value;
    }
    samples.len()
}

/// Shared handle to the active gain cascade.
///
/// The control surface replaces the gain list; the audio output callback
/// snapshots it once per render quantum. An empty list is a no-op cascade.
#[derive(Debug, Clone, Default)]
pub struct EqualizerSettings {
    gains: Arc<RwLock<Vec<i32>>>,
}

impl EqualizerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current gain cascade
    pub fn snapshot(&self) -> Vec<i32> {
        self.gains.read().unwrap().clone()
    }

    /// Replace the gain cascade wholesale
    pub fn set(&self, gains: Vec<i32>) {
        *self.gains.write().unwrap() = gains;
    }
}
