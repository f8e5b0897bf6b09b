//! HTTP/SSE control surface for the audio player daemon
//!
//! The process boundary: decodes inbound transport commands into coordinator
//! calls and exposes the query/subscribe surface to the UI process.

pub mod handlers;
pub mod sse;

use crate::audio::EqualizerSettings;
use crate::session::{CallbackRegistry, SessionHandle};
use crate::volume::VolumeControl;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub session: SessionHandle,
    pub registry: CallbackRegistry,
    pub volume: Arc<dyn VolumeControl>,
    pub equalizer: EqualizerSettings,
    pub port: u16,
}

/// Create the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))

        // Playback control
        .route("/playback/play", post(handlers::play))
        .route("/playback/pause", post(handlers::pause))
        .route("/playback/stop", post(handlers::stop))
        .route("/playback/seek", post(handlers::seek))
        .route("/playback/state", get(handlers::get_state))
        .route("/playback/position", get(handlers::get_position))

        // Output volume
        .route("/audio/volume", get(handlers::get_volume).post(handlers::set_volume))

        // Equalizer gain cascade
        .route("/equalizer", get(handlers::get_equalizer).post(handlers::set_equalizer))

        // SSE event stream
        .route("/events", get(sse::event_stream))

        // Attach application context
        .with_state(ctx)

        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
