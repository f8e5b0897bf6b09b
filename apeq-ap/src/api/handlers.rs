//! HTTP request handlers
//!
//! Implements the REST endpoints for playback control, volume, and the
//! equalizer. Transport commands are one-way: they are queued to the
//! coordinator and always answer "ok" (failures degrade to no observable
//! effect, matching the session's minimal-recovery policy).

use crate::api::AppContext;
use apeq_common::events::{SessionState, TrackDescriptor};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    position_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    volume: u32,
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: u32,
    max_volume: u32,
}

#[derive(Debug, Deserialize)]
pub struct EqualizerRequest {
    gains: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct EqualizerResponse {
    gains: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    state: SessionState,
    playing: bool,
}

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    title: Option<String>,
    artist: Option<String>,
    position_ms: u64,
    duration_ms: u64,
    state: SessionState,
}

fn ok() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "apeq-ap".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Playback Control Endpoints
// ============================================================================

/// POST /playback/play - Start a new session with the given track descriptor
pub async fn play(
    State(ctx): State<AppContext>,
    Json(track): Json<TrackDescriptor>,
) -> Json<StatusResponse> {
    info!("Play request: {}", track.locator);
    ctx.session.play(track);
    ok()
}

/// POST /playback/pause - Pause/resume toggle
pub async fn pause(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.session.toggle_pause();
    ok()
}

/// POST /playback/stop - Stop the session
pub async fn stop(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.session.stop();
    ok()
}

/// POST /playback/seek - Move the playout position
pub async fn seek(
    State(ctx): State<AppContext>,
    Json(req): Json<SeekRequest>,
) -> Json<StatusResponse> {
    ctx.session.seek(req.position_ms);
    ok()
}

/// GET /playback/state - Session state and renderer playing flag
pub async fn get_state(State(ctx): State<AppContext>) -> Json<StateResponse> {
    let status = ctx.session.status().await;
    let playing = ctx.session.is_playing().await;

    Json(StateResponse {
        state: status.state,
        playing,
    })
}

/// GET /playback/position - Current track and playout position
pub async fn get_position(State(ctx): State<AppContext>) -> Json<PositionResponse> {
    let status = ctx.session.status().await;

    Json(PositionResponse {
        title: status.title,
        artist: status.artist,
        position_ms: status.position_ms,
        duration_ms: status.duration_ms,
        state: status.state,
    })
}

// ============================================================================
// Volume Endpoints
// ============================================================================

/// GET /audio/volume - Current and maximum volume level
pub async fn get_volume(State(ctx): State<AppContext>) -> Json<VolumeResponse> {
    Json(VolumeResponse {
        volume: ctx.volume.volume(),
        max_volume: ctx.volume.max_volume(),
    })
}

/// POST /audio/volume - Set volume level
///
/// The requested level is passed through unvalidated; the volume control owns
/// clamping.
pub async fn set_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Json<StatusResponse> {
    ctx.session.set_volume(req.volume);
    ok()
}

// ============================================================================
// Equalizer Endpoints
// ============================================================================

/// GET /equalizer - Active gain cascade
pub async fn get_equalizer(State(ctx): State<AppContext>) -> Json<EqualizerResponse> {
    Json(EqualizerResponse {
        gains: ctx.equalizer.snapshot(),
    })
}

/// POST /equalizer - Replace the gain cascade
pub async fn set_equalizer(
    State(ctx): State<AppContext>,
    Json(req): Json<EqualizerRequest>,
) -> Json<StatusResponse> {
    info!("Equalizer update: {} bands", req.gains.len());
    ctx.equalizer.set(req.gains);
    ok()
}
