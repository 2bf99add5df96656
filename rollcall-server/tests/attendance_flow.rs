//! Integration tests for the attendance scan endpoint
//!
//! Drives the full router with a stub resolver: recognition outcomes,
//! window gating, ledger idempotence, and the finalization protocol.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Local, NaiveTime};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use rollcall_common::{Remark, Result, Status, TimeWindow};
use rollcall_server::dispatch::{NullDispatcher, ReportDispatcher};
use rollcall_server::recognition::{Embedding, IdentityResolver};
use rollcall_server::roster::KnownIdentity;
use rollcall_server::{build_router, AppState, LedgerStore, Roster, SessionFinalizer};

/// Resolver that embeds request bytes verbatim; `not-an-image` fails to
/// decode, everything else is one probe whose embedding is its bytes.
struct StubResolver;

impl IdentityResolver for StubResolver {
    fn encode(&self, image: &[u8]) -> Result<Vec<Embedding>> {
        if image == b"not-an-image" {
            return Err(rollcall_common::Error::Decode("unsupported format".into()));
        }
        Ok(vec![Embedding::new(image.to_vec())])
    }

    fn distances(&self, known: &[Embedding], probe: &Embedding) -> Vec<f64> {
        known
            .iter()
            .map(|k| if k == probe { 0.0 } else { 1.0 })
            .collect()
    }
}

fn test_roster() -> Arc<Roster> {
    Arc::new(Roster::from_identities(vec![
        KnownIdentity::new("ALICE", Embedding::new(b"alice-face".to_vec())),
        KnownIdentity::new("BOB", Embedding::new(b"bob-face".to_vec())),
    ]))
}

/// Window covering the whole day; every scan lands ON-TIME
fn open_window() -> TimeWindow {
    let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap();
    TimeWindow {
        start: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        end: end_of_day,
        on_time_cutoff: end_of_day,
    }
}

/// Zero-length window twelve hours away from now; always closed
fn closed_window() -> TimeWindow {
    let (far, _) = Local::now()
        .time()
        .overflowing_add_signed(chrono::Duration::hours(12));
    TimeWindow {
        start: far,
        end: far,
        on_time_cutoff: far,
    }
}

struct TestServer {
    app: axum::Router,
    ledger: Arc<LedgerStore>,
    roster: Arc<Roster>,
    _dir: tempfile::TempDir,
}

fn setup(window: TimeWindow) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(LedgerStore::new(dir.path().join("Attendance.csv")));
    let roster = test_roster();

    let state = AppState {
        resolver: Arc::new(StubResolver),
        roster: Arc::clone(&roster),
        ledger: Arc::clone(&ledger),
        window,
        match_threshold: 0.5,
    };

    TestServer {
        app: build_router(state),
        ledger,
        roster,
        _dir: dir,
    }
}

async fn post_upload(app: &axum::Router, body: &[u8]) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/octet-stream")
        .body(Body::from(body.to_vec()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_recognized_scan_is_logged_present() {
    let server = setup(open_window());

    let (status, body) = post_upload(&server.app, b"alice-face").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ALICE");

    let rows = server.ledger.rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "ALICE");
    assert_eq!(rows[0].status, Status::Present);
    assert_eq!(rows[0].remark, Remark::OnTime);
    assert_eq!(rows[0].date, Local::now().date_naive());
}

#[tokio::test]
async fn test_repeated_scan_is_success_without_second_row() {
    let server = setup(open_window());

    let (_, first) = post_upload(&server.app, b"alice-face").await;
    let (status, second) = post_upload(&server.app, b"alice-face").await;

    assert_eq!(first, "ALICE");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, "ALICE");
    assert_eq!(server.ledger.rows().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_face_is_not_logged() {
    let server = setup(open_window());

    let (status, body) = post_upload(&server.app, b"mallory-face").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "UNKNOWN");
    assert!(server.ledger.rows().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_closed_window_rejects_without_ledger_access() {
    let server = setup(closed_window());

    let (status, body) = post_upload(&server.app, b"alice-face").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "TIME LIMIT REACHED");
    assert!(server.ledger.rows().await.unwrap().is_empty());
    assert!(!server.ledger.path().exists());
}

#[tokio::test]
async fn test_empty_frame_is_bad_request() {
    let server = setup(open_window());

    let (status, body) = post_upload(&server.app, b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Error: Empty Frame");
}

#[tokio::test]
async fn test_undecodable_frame_is_bad_request() {
    let server = setup(open_window());

    let (status, body) = post_upload(&server.app, b"not-an-image").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Error:"));
    assert!(server.ledger.rows().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_finalize_marks_absentees_and_seals_the_session() {
    let server = setup(open_window());

    let (_, body) = post_upload(&server.app, b"alice-face").await;
    assert_eq!(body, "ALICE");

    let finalizer = SessionFinalizer::new(
        Arc::clone(&server.ledger),
        Arc::clone(&server.roster),
        Arc::new(NullDispatcher) as Arc<dyn ReportDispatcher>,
    );
    finalizer.finalize().await.unwrap();

    let rows = server.ledger.rows().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .any(|r| r.name == "BOB" && r.status == Status::Absent && r.time.is_none()));

    // A scan arriving after finalization is rejected, not recorded
    let (status, body) = post_upload(&server.app, b"bob-face").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "TIME LIMIT REACHED");
    assert_eq!(server.ledger.rows().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_scans_keep_one_present_row() {
    let server = setup(open_window());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = server.app.clone();
        handles.push(tokio::spawn(async move {
            post_upload(&app, b"alice-face").await
        }));
    }
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ALICE");
    }

    assert_eq!(server.ledger.rows().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = setup(open_window());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["roster_size"], 2);
}
