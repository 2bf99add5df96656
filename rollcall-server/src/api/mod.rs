//! HTTP API for the attendance service
//!
//! One scan endpoint plus a health check. Outcome-to-status mapping lives
//! here and nowhere else; everything below the handlers speaks typed
//! results.

pub mod handlers;

pub use handlers::{scan, ScanOutcome};
