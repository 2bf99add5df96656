//! # Rollcall Server Library
//!
//! Webhook-driven attendance service: a camera posts a frame, the service
//! resolves the depicted identity against the roster and records a per-day
//! attendance ledger gated by a configurable time window. At shutdown the
//! session is finalized once: unseen roster members are marked absent and
//! the ledger is dispatched to the notification channel.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod dispatch;
pub mod finalizer;
pub mod ledger;
pub mod recognition;
pub mod roster;

pub use config::Config;
pub use finalizer::SessionFinalizer;
pub use ledger::LedgerStore;
pub use recognition::IdentityResolver;
pub use roster::Roster;

use rollcall_common::TimeWindow;

/// Application state shared across HTTP handlers
///
/// Everything here is immutable or internally synchronized; the ledger owns
/// the only lock in the service.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn IdentityResolver>,
    pub roster: Arc<Roster>,
    pub ledger: Arc<LedgerStore>,
    pub window: TimeWindow,
    pub match_threshold: f64,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(api::handlers::upload))
        .route("/health", get(api::handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
