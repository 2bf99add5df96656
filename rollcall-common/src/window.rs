//! Attendance time window gating
//!
//! Pure function of wall-clock time against three configured instants.
//! Evaluated fresh on every request; carries no state of its own.

use crate::record::Remark;
use chrono::NaiveTime;
use serde::Deserialize;

/// The daily attendance window
///
/// Scans inside `[start, end]` (inclusive both ends) are accepted; scans at
/// or before `on_time_cutoff` earn `ON-TIME`, later ones `LATE`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub on_time_cutoff: NaiveTime,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            on_time_cutoff: NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
        }
    }
}

/// Result of evaluating the window at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Outside the window; the scan must be rejected before any ledger access
    Closed,
    /// Inside the window, carrying the remark a Present row would get
    Open(Remark),
}

impl TimeWindow {
    pub fn evaluate(&self, at: NaiveTime) -> WindowState {
        if at < self.start || at > self.end {
            return WindowState::Closed;
        }
        if at <= self.on_time_cutoff {
            WindowState::Open(Remark::OnTime)
        } else {
            WindowState::Open(Remark::Late)
        }
    }
}
