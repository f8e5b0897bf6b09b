//! Audio output using cpal
//!
//! A dedicated thread owns the cpal stream; the renderer talks to it over a
//! command channel and shares a `Playhead` for position/pause/active state.
//! The output callback copies 16-bit frames out of the decoded track, runs the
//! gain cascade over them, applies master volume, and converts to f32.

use crate::audio::decoder::DecodedTrack;
use crate::audio::equalizer::{self, EqualizerSettings};
use crate::audio::renderer::RendererSignal;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, Stream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

/// Shared playout position and transport flags.
///
/// Written by the audio callback (frame advance, completion) and by the
/// renderer (pause, seek, stop); read by both.
#[derive(Debug, Default)]
pub struct Playhead {
    /// Current frame position in the decoded buffer
    pub frame: AtomicU64,
    /// Output silence while set
    pub paused: AtomicBool,
    /// A stream exists and end-of-track has not been reached
    pub active: AtomicBool,
}

/// Commands for the output thread
enum OutputCommand {
    Start {
        track: Arc<DecodedTrack>,
        start_frame: u64,
    },
    Stop,
    Shutdown,
}

/// Audio output manager.
///
/// Spawns the output thread at construction; dropped streams stop playout.
pub struct AudioOutput {
    cmd_tx: Sender<OutputCommand>,
    handle: Option<JoinHandle<()>>,
    playhead: Arc<Playhead>,
}

impl AudioOutput {
    /// Spawn the output thread.
    ///
    /// # Arguments
    /// - `equalizer`: shared gain cascade applied to every render quantum
    /// - `volume`: master volume factor (0.0-1.0), read in the audio callback
    /// - `signal_tx`: channel for the end-of-track completion signal
    pub fn spawn(
        equalizer: EqualizerSettings,
        volume: Arc<Mutex<f32>>,
        signal_tx: UnboundedSender<RendererSignal>,
    ) -> Self {
        let playhead = Arc::new(Playhead::default());
        let (cmd_tx, cmd_rx) = std::sync::mpsc::channel();

        let thread_playhead = Arc::clone(&playhead);
        let handle = std::thread::spawn(move || {
            output_thread(cmd_rx, thread_playhead, equalizer, volume, signal_tx);
        });

        Self {
            cmd_tx,
            handle: Some(handle),
            playhead,
        }
    }

    /// Shared playhead handle
    pub fn playhead(&self) -> Arc<Playhead> {
        Arc::clone(&self.playhead)
    }

    /// Begin playout of a decoded track from `start_frame`.
    pub fn start(&self, track: Arc<DecodedTrack>, start_frame: u64) {
        let _ = self.cmd_tx.send(OutputCommand::Start { track, start_frame });
    }

    /// Tear down the current stream and reset the playhead.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(OutputCommand::Stop);
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(OutputCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Output thread main loop: owns the cpal stream for the current track.
fn output_thread(
    cmd_rx: Receiver<OutputCommand>,
    playhead: Arc<Playhead>,
    equalizer: EqualizerSettings,
    volume: Arc<Mutex<f32>>,
    signal_tx: UnboundedSender<RendererSignal>,
) {
    debug!("Audio output thread started");
    let mut stream: Option<Stream> = None;

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            OutputCommand::Start { track, start_frame } => {
                // Drop any previous stream before rebuilding
                stream = None;

                playhead.frame.store(start_frame, Ordering::Release);
                playhead.paused.store(false, Ordering::Release);
                playhead.active.store(true, Ordering::Release);

                match build_stream(
                    track,
                    Arc::clone(&playhead),
                    equalizer.clone(),
                    Arc::clone(&volume),
                    signal_tx.clone(),
                ) {
                    Ok(s) => stream = Some(s),
                    Err(e) => {
                        error!("Failed to start audio stream: {}", e);
                        playhead.active.store(false, Ordering::Release);
                    }
                }
            }
            OutputCommand::Stop => {
                stream = None;
                playhead.active.store(false, Ordering::Release);
                playhead.frame.store(0, Ordering::Release);
            }
            OutputCommand::Shutdown => break,
        }
    }

    drop(stream);
    debug!("Audio output thread shut down");
}

/// Build and start a stereo f32 output stream at the track's native rate.
fn build_stream(
    track: Arc<DecodedTrack>,
    playhead: Arc<Playhead>,
    equalizer: EqualizerSettings,
    volume: Arc<Mutex<f32>>,
    signal_tx: UnboundedSender<RendererSignal>,
) -> Result<Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?;

    let rate = track.sample_rate;
    let mut supported = device
        .supported_output_configs()
        .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?;

    let config = supported
        .find(|c| {
            c.channels() == 2
                && c.min_sample_rate().0 <= rate
                && c.max_sample_rate().0 >= rate
                && c.sample_format() == SampleFormat::F32
        })
        .map(|c| c.with_sample_rate(SampleRate(rate)).config())
        .ok_or_else(|| {
            Error::AudioOutput(format!("Device does not support {} Hz stereo f32", rate))
        })?;

    info!(
        "Starting audio stream: {} Hz, {} channels",
        config.sample_rate.0, config.channels
    );

    let channels = usize::from(track.channels);
    let total_frames = track.frames();
    let mut scratch: Vec<i16> = Vec::new();

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if playhead.paused.load(Ordering::Acquire) || !playhead.active.load(Ordering::Acquire)
                {
                    data.fill(0.0);
                    return;
                }

                let frames_needed = data.len() / channels;
                let start = playhead.frame.load(Ordering::Acquire).min(total_frames);
                let available =
                    (total_frames.saturating_sub(start) as usize).min(frames_needed);

                let begin = start as usize * channels;
                scratch.clear();
                scratch.extend_from_slice(&track.samples[begin..begin + available * channels]);

                let gains = equalizer.snapshot();
                equalizer::apply_gains(&mut scratch, &gains);

                let vol = *volume.lock().unwrap();
                for (i, out) in data.iter_mut().enumerate() {
                    *out = if i < scratch.len() {
                        f32::from(scratch[i]) / 32_768.0 * vol
                    } else {
                        0.0
                    };
                }

                playhead
                    .frame
                    .store(start + available as u64, Ordering::Release);

                // End of track: signal completion exactly once
                if start + available as u64 >= total_frames
                    && playhead.active.swap(false, Ordering::AcqRel)
                {
                    let _ = signal_tx.send(RendererSignal::TrackComplete);
                }
            },
            |e| error!("Audio stream error: {}", e),
            None,
        )
        .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

    Ok(stream)
}
