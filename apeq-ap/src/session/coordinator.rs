//! Playback session coordinator
//!
//! A single tokio task owns the renderer and is the sole mutator of session
//! state. Transport commands and queries arrive over one channel, so command
//! handling, completion handling, and progress ticks never interleave. The
//! progress interval is only polled while the session is `Playing` and is
//! reset on every transition into `Playing`, so no stale tick can fire after
//! a pause or stop.

use crate::audio::renderer::{Renderer, RendererSignal};
use crate::session::registry::CallbackRegistry;
use crate::volume::VolumeControl;
use apeq_common::events::{PlayerEvent, SessionState, TrackDescriptor};
use apeq_common::human_time::format_track_time;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Interval between progress broadcasts while playing
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(1000);

/// One-way transport commands accepted by the coordinator.
#[derive(Debug, Clone)]
pub enum TransportCommand {
    /// Load a new track and start playing, replacing any current session
    Play(TrackDescriptor),
    /// Pause when playing, resume when paused, no-op when idle
    TogglePause,
    /// Stop playout and return to idle
    Stop,
    /// Move the playout position; no-op when idle
    Seek(u64),
    /// Forwarded to the output-volume control regardless of session state
    SetVolume(u32),
}

/// Point-in-time view of the session, for the query surface.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub position_ms: u64,
    pub duration_ms: u64,
}

enum SessionCommand {
    Transport(TransportCommand),
    IsPlaying(oneshot::Sender<bool>),
    Duration(oneshot::Sender<u64>),
    Status(oneshot::Sender<SessionStatus>),
}

/// Cloneable handle for sending commands and queries to the coordinator.
///
/// Transport commands are fire-and-forget; queries await a reply and fall
/// back to an empty answer if the coordinator is gone.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn transport(&self, cmd: TransportCommand) {
        let _ = self.cmd_tx.send(SessionCommand::Transport(cmd));
    }

    pub fn play(&self, track: TrackDescriptor) {
        self.transport(TransportCommand::Play(track));
    }

    pub fn toggle_pause(&self) {
        self.transport(TransportCommand::TogglePause);
    }

    pub fn stop(&self) {
        self.transport(TransportCommand::Stop);
    }

    pub fn seek(&self, position_ms: u64) {
        self.transport(TransportCommand::Seek(position_ms));
    }

    pub fn set_volume(&self, level: u32) {
        self.transport(TransportCommand::SetVolume(level));
    }

    pub async fn is_playing(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(SessionCommand::IsPlaying(tx)).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    pub async fn duration_ms(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(SessionCommand::Duration(tx)).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    pub async fn status(&self) -> SessionStatus {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(SessionCommand::Status(tx)).is_ok() {
            if let Ok(status) = rx.await {
                return status;
            }
        }
        SessionStatus {
            state: SessionState::Idle,
            title: None,
            artist: None,
            position_ms: 0,
            duration_ms: 0,
        }
    }
}

/// Single playback session coordinator.
pub struct SessionCoordinator<R: Renderer> {
    renderer: R,
    volume: Arc<dyn VolumeControl>,
    registry: CallbackRegistry,
    signal_rx: mpsc::UnboundedReceiver<RendererSignal>,
    cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    state: SessionState,
    track: Option<TrackDescriptor>,
}

impl<R: Renderer> SessionCoordinator<R> {
    pub fn new(
        renderer: R,
        volume: Arc<dyn VolumeControl>,
        registry: CallbackRegistry,
        signal_rx: mpsc::UnboundedReceiver<RendererSignal>,
    ) -> (Self, SessionHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            renderer,
            volume,
            registry,
            signal_rx,
            cmd_rx,
            state: SessionState::Idle,
            track: None,
        };
        (coordinator, SessionHandle { cmd_tx })
    }

    /// Run until every handle is dropped.
    pub async fn run(mut self) {
        let mut progress = interval(PROGRESS_INTERVAL);
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd, &mut progress),
                    None => break,
                },
                Some(signal) = self.signal_rx.recv() => self.handle_signal(signal),
                _ = progress.tick(), if self.state == SessionState::Playing => {
                    self.emit_progress();
                }
            }
        }

        info!("Session coordinator shut down");
    }

    fn handle_command(&mut self, cmd: SessionCommand, progress: &mut Interval) {
        match cmd {
            SessionCommand::Transport(transport) => self.handle_transport(transport, progress),
            SessionCommand::IsPlaying(reply) => {
                let _ = reply.send(self.renderer.is_playing());
            }
            SessionCommand::Duration(reply) => {
                let _ = reply.send(self.renderer.duration_ms());
            }
            SessionCommand::Status(reply) => {
                let status = SessionStatus {
                    state: self.state,
                    title: self.track.as_ref().map(|t| t.title.clone()),
                    artist: self.track.as_ref().map(|t| t.artist.clone()),
                    position_ms: self.renderer.position_ms(),
                    duration_ms: self.renderer.duration_ms(),
                };
                let _ = reply.send(status);
            }
        }
    }

    fn handle_transport(&mut self, cmd: TransportCommand, progress: &mut Interval) {
        match cmd {
            TransportCommand::Play(track) => self.start_playback(track, progress),
            TransportCommand::TogglePause => match self.state {
                SessionState::Playing => {
                    self.renderer.pause();
                    self.set_state(SessionState::Paused);
                }
                SessionState::Paused => {
                    self.renderer.play();
                    progress.reset();
                    self.set_state(SessionState::Playing);
                }
                SessionState::Idle => {}
            },
            TransportCommand::Stop => {
                if self.state != SessionState::Idle {
                    self.renderer.stop();
                    self.set_state(SessionState::Idle);
                }
            }
            TransportCommand::Seek(position_ms) => {
                if self.state != SessionState::Idle {
                    debug!("Seek to {}", format_track_time(position_ms));
                    self.renderer.seek(position_ms);
                }
            }
            TransportCommand::SetVolume(level) => {
                self.volume.set_volume(level);
                self.registry.broadcast(PlayerEvent::VolumeChanged {
                    volume: self.volume.volume(),
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn start_playback(&mut self, track: TrackDescriptor, progress: &mut Interval) {
        if self.renderer.is_playing() {
            self.renderer.stop();
        }

        let loaded = match track.asset_name() {
            Some(name) => self.renderer.load_asset(name),
            None => self.renderer.load_file(Path::new(&track.locator)),
        };

        // A failed load abandons the command: no state change, no notification
        if let Err(e) = loaded {
            warn!("Failed to load {}: {}", track.locator, e);
            return;
        }

        self.renderer.play();
        info!(
            "Playing \"{}\" by {} ({})",
            track.title,
            track.artist,
            format_track_time(self.renderer.duration_ms())
        );

        self.track = Some(track);
        progress.reset();
        self.set_state(SessionState::Playing);
    }

    fn handle_signal(&mut self, signal: RendererSignal) {
        match signal {
            // Completion fans out without a state transition; the progress
            // loop stops emitting once the renderer reports not-playing.
            RendererSignal::TrackComplete => {
                debug!("Track complete");
                self.registry.broadcast(PlayerEvent::PlaybackComplete {
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn emit_progress(&mut self) {
        if !self.renderer.is_playing() {
            return;
        }
        if let Some(track) = &self.track {
            self.registry.broadcast(PlayerEvent::PlaybackProgress {
                title: track.title.clone(),
                artist: track.artist.clone(),
                position_ms: self.renderer.position_ms(),
                timestamp: Utc::now(),
            });
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            self.state = state;
            self.registry.broadcast(PlayerEvent::PlaybackStateChanged {
                state,
                timestamp: Utc::now(),
            });
        }
    }
}
