//! # Rollcall Common Library
//!
//! Shared code for the rollcall attendance service:
//! - Error types
//! - Attendance record model (ledger row vocabulary)
//! - Time window gating

pub mod error;
pub mod record;
pub mod window;

pub use error::{Error, Result};
pub use record::{AttendanceRecord, Remark, Status};
pub use window::{TimeWindow, WindowState};
