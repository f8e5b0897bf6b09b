//! Audio Player (apeq-ap) - Main entry point
//!
//! Background audio player daemon: hosts the playback session coordinator,
//! the equalizer gain cascade, and the HTTP/SSE control surface consumed by
//! the UI process.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apeq_ap::api;
use apeq_ap::audio::{EqualizerSettings, StreamRenderer};
use apeq_ap::session::{CallbackRegistry, SessionCoordinator};
use apeq_ap::volume::{SystemVolume, VolumeControl};

/// Command-line arguments for apeq-ap
#[derive(Parser, Debug)]
#[command(name = "apeq-ap")]
#[command(about = "Audio player daemon for APEQ")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5750", env = "APEQ_AP_PORT")]
    port: u16,

    /// Folder containing bundled audio assets (asset:// locators)
    #[arg(short, long)]
    asset_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apeq_ap=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let asset_folder =
        apeq_common::config::resolve_asset_folder(args.asset_folder.as_deref(), "APEQ_ASSET_FOLDER")
            .context("Failed to resolve asset folder")?;

    info!("Starting APEQ Audio Player on port {}", args.port);
    info!("Asset folder: {}", asset_folder.display());

    // Shared surfaces: volume control, gain cascade, listener registry
    let volume = Arc::new(SystemVolume::default());
    let equalizer = EqualizerSettings::new();
    let registry = CallbackRegistry::new();

    // Renderer and session coordinator
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let renderer = StreamRenderer::new(
        asset_folder,
        equalizer.clone(),
        volume.factor_handle(),
        signal_tx,
    );
    let (coordinator, session) = SessionCoordinator::new(
        renderer,
        volume.clone() as Arc<dyn VolumeControl>,
        registry.clone(),
        signal_rx,
    );
    tokio::spawn(coordinator.run());
    info!("Session coordinator started");

    // Build the application router
    let ctx = api::AppContext {
        session: session.clone(),
        registry,
        volume,
        equalizer,
        port: args.port,
    };
    let app = api::create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Expected terminal path: stop the session, then let the host tear us down
    session.stop();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
