//! HTTP request handlers
//!
//! The transport contract is plain text: the recognized name, `UNKNOWN`, or
//! `TIME LIMIT REACHED`, all with status 200; 400 for an empty or
//! undecodable frame; 500 for internal failures, isolated per request.

use crate::ledger::RecordOutcome;
use crate::recognition::resolve_identity;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Local;
use rollcall_common::{Error, Result, WindowState};
use serde_json::json;
use tracing::{error, info, warn};

/// Typed outcome of one scan, mapped to a transport response only at the
/// axum boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// An identity was accepted; an already-marked identity is still a
    /// success, not an error
    Recognized(String),
    /// The frame resolved no roster identity
    Unrecognized,
    /// Outside the attendance window, or the session is finalizing;
    /// the ledger was not touched
    WindowClosed,
}

/// Run one scan through the pipeline: resolver, match policy, window gate,
/// ledger.
pub async fn scan(state: &AppState, image: &[u8]) -> Result<ScanOutcome> {
    let probes = state.resolver.encode(image)?;
    let decision = resolve_identity(
        state.resolver.as_ref(),
        &probes,
        &state.roster,
        state.match_threshold,
    );

    let now = Local::now();
    match state.window.evaluate(now.time()) {
        WindowState::Closed => {
            info!("Scan received at {}. TIME LIMIT REACHED.", now.format("%H:%M:%S"));
            Ok(ScanOutcome::WindowClosed)
        }
        WindowState::Open(remark) => match decision.identity {
            Some(name) => {
                info!("Match found: {}", name);
                let outcome = state
                    .ledger
                    .record(&name, now.date_naive(), now.time(), remark)
                    .await?;
                if outcome == RecordOutcome::Rejected {
                    // Finalization sealed the ledger between the gate and
                    // the record; treat like a closed window
                    return Ok(ScanOutcome::WindowClosed);
                }
                Ok(ScanOutcome::Recognized(name))
            }
            None => {
                info!("No match found. Person is UNKNOWN.");
                Ok(ScanOutcome::Unrecognized)
            }
        },
    }
}

/// POST /upload - receive one camera frame as raw image bytes
pub async fn upload(State(state): State<AppState>, body: Bytes) -> (StatusCode, String) {
    if body.is_empty() {
        warn!("Received empty image frame");
        return (StatusCode::BAD_REQUEST, "Error: Empty Frame".to_string());
    }

    match scan(&state, &body).await {
        Ok(ScanOutcome::Recognized(name)) => (StatusCode::OK, name),
        Ok(ScanOutcome::Unrecognized) => (StatusCode::OK, "UNKNOWN".to_string()),
        Ok(ScanOutcome::WindowClosed) => (StatusCode::OK, "TIME LIMIT REACHED".to_string()),
        Err(Error::Decode(msg)) => {
            warn!("Undecodable frame: {}", msg);
            (StatusCode::BAD_REQUEST, format!("Error: {}", msg))
        }
        Err(e) => {
            error!("Error during processing: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
    }
}

/// GET /health - health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "rollcall-server",
        "version": env!("CARGO_PKG_VERSION"),
        "roster_size": state.roster.len(),
    }))
}
