//! Audio Review (earmark-rv) - Main entry point
//!
//! HTTP service for reviewing annotated audio: indexes a corpus of audio
//! files, loads annotation and candidate sources against it, serves whole
//! files and padded segments, and persists labeling decisions.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use earmark_common::config::{ensure_parent_dir, resolve_label_log};
use earmark_rv::{build_router, AppState, ReviewService};

/// Command-line arguments for earmark-rv
#[derive(Parser, Debug)]
#[command(name = "earmark-rv")]
#[command(about = "Audio review and labeling service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "EARMARK_RV_PORT")]
    port: u16,

    /// Audio corpus root to index at startup
    #[arg(short = 'r', long, env = "EARMARK_AUDIO_ROOT")]
    audio_root: Option<PathBuf>,

    /// Label log path (falls back to env, config file, then OS data dir)
    #[arg(short = 'l', long)]
    label_log: Option<String>,

    /// Bound on one segment extraction, in seconds
    #[arg(long, default_value = "30", env = "EARMARK_EXTRACT_TIMEOUT")]
    extract_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments first so --help and --version exit before any logging
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "earmark_rv=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Earmark Review (earmark-rv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let label_log = resolve_label_log(args.label_log.as_deref(), "EARMARK_LABEL_LOG");
    ensure_parent_dir(&label_log).context("Failed to create label log directory")?;
    info!("Label log: {}", label_log.display());

    let service = ReviewService::new(
        label_log,
        Duration::from_secs(args.extract_timeout_secs),
    );

    // Preload the corpus when a root was given; failure is not fatal, the
    // corpus can still be built over the API
    if let Some(root) = &args.audio_root {
        match service.build_corpus(&root.to_string_lossy()).await {
            Ok(count) => info!("Preloaded corpus: {} entries", count),
            Err(e) => warn!("Corpus preload failed: {}", e),
        }
    }

    // Build the application router
    let state = AppState::new(service);
    let app = build_router(state);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    info!("Starting HTTP server on {}", addr);

    // Create and run the server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
