//! Session coordinator state machine and progress loop tests
//!
//! Runs the coordinator against a scripted renderer under tokio's paused
//! clock, so the 1-second progress cadence is driven deterministically.

mod helpers;

use apeq_ap::volume::VolumeControl;
use apeq_common::events::{PlayerEvent, SessionState};
use helpers::{drain, progress_count, spawn_session, track, MockRenderer};
use std::time::Duration;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn play_yields_playing_from_any_state() {
    let session = spawn_session(MockRenderer::new());

    // From Idle
    session.handle.play(track("First", "/music/first.mp3"));
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Playing);

    // From Playing: replaces the track wholesale
    session.handle.play(track("Second", "/music/second.mp3"));
    settle().await;
    let status = session.handle.status().await;
    assert_eq!(status.state, SessionState::Playing);
    assert_eq!(status.title.as_deref(), Some("Second"));

    // From Paused
    session.handle.toggle_pause();
    settle().await;
    session.handle.play(track("Third", "/music/third.mp3"));
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Playing);

    let renderer = session.renderer.lock().unwrap();
    assert_eq!(renderer.file_loads.len(), 3);
    assert!(renderer.playing);
}

#[tokio::test(start_paused = true)]
async fn asset_locator_uses_asset_load_primitive() {
    let session = spawn_session(MockRenderer::new());

    session.handle.play(track("Bundled", "asset://intro.mp3"));
    settle().await;

    let renderer = session.renderer.lock().unwrap();
    assert_eq!(renderer.asset_loads, vec!["intro.mp3".to_string()]);
    assert!(renderer.file_loads.is_empty());
}

#[tokio::test(start_paused = true)]
async fn toggle_pause_flips_and_is_noop_from_idle() {
    let session = spawn_session(MockRenderer::new());

    // No-op from Idle
    session.handle.toggle_pause();
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Idle);
    assert!(!session.renderer.lock().unwrap().playing);

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;

    session.handle.toggle_pause();
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Paused);
    assert!(!session.handle.is_playing().await);

    session.handle.toggle_pause();
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Playing);
    assert!(session.handle.is_playing().await);
}

#[tokio::test(start_paused = true)]
async fn stop_yields_idle_from_any_state() {
    let session = spawn_session(MockRenderer::new());

    // From Idle: nothing to do, renderer untouched
    session.handle.stop();
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Idle);
    assert_eq!(session.renderer.lock().unwrap().stop_calls, 0);

    // From Playing
    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    session.handle.stop();
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Idle);
    assert_eq!(session.renderer.lock().unwrap().stop_calls, 1);

    // From Paused
    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    session.handle.toggle_pause();
    settle().await;
    session.handle.stop();
    settle().await;
    assert_eq!(session.handle.status().await.state, SessionState::Idle);
    assert_eq!(session.renderer.lock().unwrap().stop_calls, 2);
}

#[tokio::test(start_paused = true)]
async fn progress_ticks_once_per_second_while_playing() {
    let session = spawn_session(MockRenderer::new());
    let (_id, mut rx) = session.registry.register();

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    drain(&mut rx);

    tokio::time::sleep(Duration::from_millis(3050)).await;
    let events = drain(&mut rx);
    assert_eq!(progress_count(&events), 3);

    // Progress events carry the track metadata
    let first = events
        .iter()
        .find(|e| matches!(e, PlayerEvent::PlaybackProgress { .. }))
        .unwrap();
    match first {
        PlayerEvent::PlaybackProgress { title, artist, .. } => {
            assert_eq!(title, "Song");
            assert_eq!(artist, "Test Artist");
        }
        _ => unreachable!(),
    }
}

#[tokio::test(start_paused = true)]
async fn no_progress_after_pause_until_resume() {
    let session = spawn_session(MockRenderer::new());
    let (_id, mut rx) = session.registry.register();

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;

    session.handle.toggle_pause();
    settle().await;
    drain(&mut rx);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(progress_count(&drain(&mut rx)), 0);

    // Resume restarts the cadence from now
    session.handle.toggle_pause();
    settle().await;
    drain(&mut rx);
    tokio::time::sleep(Duration::from_millis(1050)).await;
    assert_eq!(progress_count(&drain(&mut rx)), 1);
}

#[tokio::test(start_paused = true)]
async fn no_progress_after_stop() {
    let session = spawn_session(MockRenderer::new());
    let (_id, mut rx) = session.registry.register();

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    session.handle.stop();
    settle().await;
    drain(&mut rx);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(progress_count(&drain(&mut rx)), 0);
}

#[tokio::test(start_paused = true)]
async fn completion_fans_out_without_state_transition() {
    let session = spawn_session(MockRenderer::new());
    let (_id, mut rx) = session.registry.register();

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    drain(&mut rx);

    // Renderer reaches end-of-track
    session.renderer.lock().unwrap().playing = false;
    session
        .signal_tx
        .send(apeq_ap::audio::RendererSignal::TrackComplete)
        .unwrap();
    settle().await;

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, PlayerEvent::PlaybackComplete { .. })));

    // The coordinator does not transition state on completion, but the
    // progress loop stops emitting once the renderer reports not-playing
    assert_eq!(session.handle.status().await.state, SessionState::Playing);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(progress_count(&drain(&mut rx)), 0);
}

#[tokio::test(start_paused = true)]
async fn load_failure_is_swallowed() {
    let renderer = MockRenderer::new();
    renderer.state().lock().unwrap().fail_next_load = true;
    let session = spawn_session(renderer);
    let (_id, mut rx) = session.registry.register();

    session.handle.play(track("Broken", "/music/broken.mp3"));
    settle().await;

    let status = session.handle.status().await;
    assert_eq!(status.state, SessionState::Idle);
    assert_eq!(status.title, None);
    assert!(drain(&mut rx).is_empty());
    assert!(session.renderer.lock().unwrap().loaded.is_none());
}

#[tokio::test(start_paused = true)]
async fn broadcast_failure_is_isolated_per_listener() {
    let session = spawn_session(MockRenderer::new());
    let (_dead_id, dead_rx) = session.registry.register();
    let (_live_id, mut live_rx) = session.registry.register();
    drop(dead_rx);

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    drain(&mut live_rx);

    tokio::time::sleep(Duration::from_millis(1050)).await;
    assert_eq!(progress_count(&drain(&mut live_rx)), 1);

    // The unreachable listener stays registered until it unregisters itself
    assert_eq!(session.registry.listener_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn seek_is_noop_from_idle_and_keeps_state_otherwise() {
    let session = spawn_session(MockRenderer::new());

    session.handle.seek(5_000);
    settle().await;
    assert!(session.renderer.lock().unwrap().seeks.is_empty());

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    session.handle.seek(5_000);
    settle().await;
    assert_eq!(session.renderer.lock().unwrap().seeks, vec![5_000]);
    assert_eq!(session.handle.status().await.state, SessionState::Playing);

    session.handle.toggle_pause();
    settle().await;
    session.handle.seek(9_000);
    settle().await;
    assert_eq!(session.renderer.lock().unwrap().seeks, vec![5_000, 9_000]);
    assert_eq!(session.handle.status().await.state, SessionState::Paused);
}

#[tokio::test(start_paused = true)]
async fn set_volume_passes_through_in_any_state() {
    let session = spawn_session(MockRenderer::new());
    let (_id, mut rx) = session.registry.register();

    // From Idle, out-of-range value is clamped by the control itself
    session.handle.set_volume(99);
    settle().await;
    assert_eq!(session.volume.volume(), session.volume.max_volume());

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        PlayerEvent::VolumeChanged { volume, .. } if *volume == session.volume.max_volume()
    )));

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    session.handle.set_volume(3);
    settle().await;
    assert_eq!(session.volume.volume(), 3);
    assert_eq!(session.handle.status().await.state, SessionState::Playing);
}

#[tokio::test(start_paused = true)]
async fn query_surface_delegates_to_renderer() {
    let renderer = MockRenderer::new();
    {
        let state_handle = renderer.state();
        let mut state = state_handle.lock().unwrap();
        state.duration_ms = 183_000;
        state.position_ms = 42_000;
    }
    let session = spawn_session(renderer);

    assert_eq!(session.handle.duration_ms().await, 183_000);
    assert!(!session.handle.is_playing().await);

    session.handle.play(track("Song", "/music/song.mp3"));
    settle().await;
    session.renderer.lock().unwrap().position_ms = 42_000;

    let status = session.handle.status().await;
    assert_eq!(status.position_ms, 42_000);
    assert_eq!(status.duration_ms, 183_000);
    assert!(session.handle.is_playing().await);
}
