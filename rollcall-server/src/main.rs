//! Rollcall attendance service - main entry point
//!
//! Loads the roster, serves the scan endpoint until a shutdown signal
//! arrives, then finalizes the session exactly once: absentees are appended
//! to the ledger and the final report is dispatched.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rollcall_server::config::Config;
use rollcall_server::dispatch::{NullDispatcher, ReportDispatcher, TelegramDispatcher};
use rollcall_server::recognition::HashResolver;
use rollcall_server::{build_router, AppState, IdentityResolver, LedgerStore, Roster, SessionFinalizer};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rollcall-server
#[derive(Parser, Debug)]
#[command(name = "rollcall-server")]
#[command(about = "Webhook-driven face attendance service")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "ROLLCALL_PORT")]
    port: Option<u16>,

    /// Directory of roster reference images
    #[arg(short, long, env = "ROLLCALL_ROSTER_DIR")]
    roster_dir: Option<PathBuf>,

    /// Attendance ledger file
    #[arg(short, long, env = "ROLLCALL_LEDGER")]
    ledger: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(roster_dir) = args.roster_dir {
        config.roster_dir = roster_dir;
    }
    if let Some(ledger) = args.ledger {
        config.ledger_path = ledger;
    }

    info!(
        "Starting rollcall-server v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        config.port
    );

    let resolver: Arc<dyn IdentityResolver> = Arc::new(HashResolver::new());

    info!("Loading known faces from {}...", config.roster_dir.display());
    let roster = Arc::new(
        Roster::load(&config.roster_dir, resolver.as_ref()).context("Failed to load roster")?,
    );
    info!("Encodings complete: {} known faces. Server is ready.", roster.len());

    let ledger = Arc::new(LedgerStore::new(config.ledger_path.clone()));

    let dispatcher: Arc<dyn ReportDispatcher> = match &config.telegram {
        Some(telegram) => Arc::new(TelegramDispatcher::new(
            telegram.bot_token.clone(),
            telegram.chat_id.clone(),
        )),
        None => {
            warn!("No telegram configuration; final report will not be delivered");
            Arc::new(NullDispatcher)
        }
    };

    let finalizer = SessionFinalizer::new(Arc::clone(&ledger), Arc::clone(&roster), dispatcher);

    let state = AppState {
        resolver,
        roster,
        ledger,
        window: config.window,
        match_threshold: config.match_threshold,
    };
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(
        "Attendance logging active between {} and {} (on-time until {})",
        config.window.start, config.window.end, config.window.on_time_cutoff
    );
    info!("Listening on http://{}", addr);
    info!("Press CTRL+C to stop the server and send the final report");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down. Finalizing report...");
    finalizer.finalize().await.context("Finalization failed")?;

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
