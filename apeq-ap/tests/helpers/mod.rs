//! Shared test helpers: scripted renderer and session setup
#![allow(dead_code)]

use apeq_ap::audio::renderer::{Renderer, RendererSignal};
use apeq_ap::error::{Error, Result};
use apeq_ap::session::{CallbackRegistry, SessionCoordinator, SessionHandle};
use apeq_ap::volume::{SystemVolume, VolumeControl};
use apeq_common::events::{PlayerEvent, TrackDescriptor};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Observable state of the scripted renderer
#[derive(Debug, Default)]
pub struct MockState {
    pub playing: bool,
    pub loaded: Option<String>,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub seeks: Vec<u64>,
    pub stop_calls: usize,
    pub asset_loads: Vec<String>,
    pub file_loads: Vec<String>,
    pub fail_next_load: bool,
}

/// Scripted renderer for driving the session coordinator in tests
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    state: Arc<Mutex<MockState>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<MockState>> {
        Arc::clone(&self.state)
    }
}

impl Renderer for MockRenderer {
    fn load_asset(&mut self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_load {
            state.fail_next_load = false;
            return Err(Error::Decode("injected load failure".to_string()));
        }
        state.asset_loads.push(name.to_string());
        state.loaded = Some(format!("asset://{}", name));
        state.position_ms = 0;
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_load {
            state.fail_next_load = false;
            return Err(Error::Decode("injected load failure".to_string()));
        }
        let path = path.display().to_string();
        state.file_loads.push(path.clone());
        state.loaded = Some(path);
        state.position_ms = 0;
        Ok(())
    }

    fn play(&mut self) {
        self.state.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.position_ms = 0;
        state.stop_calls += 1;
    }

    fn seek(&mut self, position_ms: u64) {
        let mut state = self.state.lock().unwrap();
        state.seeks.push(position_ms);
        state.position_ms = position_ms;
    }

    fn position_ms(&mut self) -> u64 {
        self.state.lock().unwrap().position_ms
    }

    fn duration_ms(&mut self) -> u64 {
        self.state.lock().unwrap().duration_ms
    }

    fn is_playing(&mut self) -> bool {
        self.state.lock().unwrap().playing
    }
}

/// Everything a session test needs to drive and observe the coordinator
pub struct TestSession {
    pub handle: SessionHandle,
    pub registry: CallbackRegistry,
    pub volume: Arc<SystemVolume>,
    pub signal_tx: UnboundedSender<RendererSignal>,
    pub renderer: Arc<Mutex<MockState>>,
}

/// Spawn a coordinator over a scripted renderer.
pub fn spawn_session(renderer: MockRenderer) -> TestSession {
    let state = renderer.state();
    let volume = Arc::new(SystemVolume::new(5));
    let registry = CallbackRegistry::new();
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let (coordinator, handle) = SessionCoordinator::new(
        renderer,
        volume.clone() as Arc<dyn VolumeControl>,
        registry.clone(),
        signal_rx,
    );
    tokio::spawn(coordinator.run());

    TestSession {
        handle,
        registry,
        volume,
        signal_tx,
        renderer: state,
    }
}

/// Track descriptor pointing at a filesystem locator
pub fn track(title: &str, locator: &str) -> TrackDescriptor {
    TrackDescriptor {
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        locator: locator.to_string(),
    }
}

/// Drain everything currently queued on a listener
pub fn drain(rx: &mut UnboundedReceiver<PlayerEvent>) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Count progress events in a drained batch
pub fn progress_count(events: &[PlayerEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PlayerEvent::PlaybackProgress { .. }))
        .count()
}
