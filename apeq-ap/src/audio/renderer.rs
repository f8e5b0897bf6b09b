//! Media renderer abstraction and the streaming implementation
//!
//! The session coordinator drives an opaque renderer through this trait: two
//! load primitives (bundled asset vs filesystem path), transport control, and
//! position/duration queries. End-of-track is reported out-of-band on the
//! signal channel handed to the renderer at construction.

use crate::audio::decoder::{DecodedTrack, TrackDecoder};
use crate::audio::equalizer::EqualizerSettings;
use crate::audio::output::{AudioOutput, Playhead};
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Out-of-band signals from the renderer to the session coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererSignal {
    /// Playback reached end-of-track
    TrackComplete,
}

/// Opaque media renderer controlled by the session coordinator.
///
/// Implementations are driven exclusively from the coordinator task; none of
/// these calls are expected to be re-entrant or thread-safe.
pub trait Renderer: Send {
    /// Load a bundled asset by name.
    fn load_asset(&mut self, name: &str) -> Result<()>;

    /// Load an audio file from a filesystem path.
    fn load_file(&mut self, path: &Path) -> Result<()>;

    /// Start or resume playout of the loaded track.
    fn play(&mut self);

    /// Pause playout, keeping position.
    fn pause(&mut self);

    /// Stop playout and reset position.
    fn stop(&mut self);

    /// Move the playout position (milliseconds).
    fn seek(&mut self, position_ms: u64);

    /// Current playout position in milliseconds.
    fn position_ms(&mut self) -> u64;

    /// Duration of the loaded track in milliseconds (0 if none).
    fn duration_ms(&mut self) -> u64;

    /// True while actively playing (not paused, not stopped, not completed).
    fn is_playing(&mut self) -> bool;
}

/// Renderer backed by the symphonia decoder and the cpal output thread.
///
/// Tracks decode whole-file up front; playout runs from the decoded buffer on
/// the output thread with the gain cascade applied per render quantum.
pub struct StreamRenderer {
    asset_folder: PathBuf,
    output: AudioOutput,
    playhead: Arc<Playhead>,
    current: Option<Arc<DecodedTrack>>,
    started: bool,
}

impl StreamRenderer {
    pub fn new(
        asset_folder: PathBuf,
        equalizer: EqualizerSettings,
        volume: Arc<Mutex<f32>>,
        signal_tx: UnboundedSender<RendererSignal>,
    ) -> Self {
        let output = AudioOutput::spawn(equalizer, volume, signal_tx);
        let playhead = output.playhead();
        Self {
            asset_folder,
            output,
            playhead,
            current: None,
            started: false,
        }
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        // Tear down any previous playout before swapping the track
        self.output.stop();
        self.started = false;

        let track = TrackDecoder::decode_file(path)?;
        debug!(
            "Loaded {}: {} frames at {} Hz",
            path.display(),
            track.frames(),
            track.sample_rate
        );
        self.current = Some(Arc::new(track));
        Ok(())
    }
}

impl Renderer for StreamRenderer {
    fn load_asset(&mut self, name: &str) -> Result<()> {
        let path = self.asset_folder.join(name);
        self.load(&path)
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        self.load(path)
    }

    fn play(&mut self) {
        let Some(track) = &self.current else { return };
        if self.started {
            self.playhead.paused.store(false, Ordering::Release);
        } else {
            self.output.start(Arc::clone(track), 0);
            self.started = true;
        }
    }

    fn pause(&mut self) {
        self.playhead.paused.store(true, Ordering::Release);
    }

    fn stop(&mut self) {
        self.output.stop();
        self.started = false;
    }

    fn seek(&mut self, position_ms: u64) {
        let Some(track) = &self.current else { return };
        let frame = (position_ms * u64::from(track.sample_rate) / 1000).min(track.frames());
        self.playhead.frame.store(frame, Ordering::Release);
    }

    fn position_ms(&mut self) -> u64 {
        let Some(track) = &self.current else { return 0 };
        if track.sample_rate == 0 {
            return 0;
        }
        self.playhead.frame.load(Ordering::Acquire) * 1000 / u64::from(track.sample_rate)
    }

    fn duration_ms(&mut self) -> u64 {
        self.current.as_ref().map_or(0, |track| track.duration_ms())
    }

    fn is_playing(&mut self) -> bool {
        self.playhead.active.load(Ordering::Acquire) && !self.playhead.paused.load(Ordering::Acquire)
    }
}
