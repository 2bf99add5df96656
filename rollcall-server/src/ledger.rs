//! Attendance ledger persistence
//!
//! The ledger file is the only shared mutable resource in the service.
//! Every read-check-append-write cycle runs under the store's single mutex,
//! so the per-day uniqueness invariant holds under concurrent scans:
//! at most one Present row per `(name, date)`.

use chrono::{NaiveDate, NaiveTime};
use rollcall_common::{AttendanceRecord, Remark, Result, Status};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::info;

/// Outcome of a `record` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new Present row was appended and persisted
    Inserted,
    /// A Present row for this `(name, date)` already exists; no-op
    AlreadyPresent,
    /// The ledger has been sealed for finalization; no row written
    Rejected,
}

/// Durable, race-free store of attendance rows
pub struct LedgerStore {
    path: PathBuf,
    lock: Mutex<()>,
    sealed: AtomicBool,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            sealed: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the ledger has been sealed by finalization
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Record a Present row for `(name, date)` unless one already exists.
    ///
    /// The existence check, append, and write all happen under the store
    /// mutex. A sealed ledger rejects the scan instead of racing the
    /// absentee snapshot.
    pub async fn record(
        &self,
        name: &str,
        date: NaiveDate,
        time: NaiveTime,
        remark: Remark,
    ) -> Result<RecordOutcome> {
        let _guard = self.lock.lock().await;

        if self.sealed.load(Ordering::Acquire) {
            return Ok(RecordOutcome::Rejected);
        }

        let mut rows = self.load()?;
        let already = rows
            .iter()
            .any(|r| r.status == Status::Present && r.name == name && r.date == date);
        if already {
            info!("{} already marked present on {}", name, date);
            return Ok(RecordOutcome::AlreadyPresent);
        }

        rows.push(AttendanceRecord::present(name, date, time, remark));
        self.store(&rows)?;
        info!("Logged attendance for {} ({})", name, remark);
        Ok(RecordOutcome::Inserted)
    }

    /// Seal the ledger and append Absent rows for every roster name without
    /// a Present row on `date`. Returns the names marked absent.
    ///
    /// Idempotent: names that already carry an Absent row for `date` are not
    /// appended again, and re-invocation after a complete pass is a no-op.
    pub async fn finalize(&self, date: NaiveDate, roster_names: &[String]) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        self.sealed.store(true, Ordering::Release);

        let mut rows = self.load()?;
        let present: HashSet<&str> = rows
            .iter()
            .filter(|r| r.date == date && r.status == Status::Present)
            .map(|r| r.name.as_str())
            .collect();
        let already_absent: HashSet<&str> = rows
            .iter()
            .filter(|r| r.date == date && r.status == Status::Absent)
            .map(|r| r.name.as_str())
            .collect();

        let absentees: Vec<String> = roster_names
            .iter()
            .filter(|name| !present.contains(name.as_str()) && !already_absent.contains(name.as_str()))
            .cloned()
            .collect();

        if !absentees.is_empty() {
            for name in &absentees {
                rows.push(AttendanceRecord::absent(name, date));
            }
            self.store(&rows)?;
        }

        Ok(absentees)
    }

    /// Snapshot of all rows, for reporting and tests
    pub async fn rows(&self) -> Result<Vec<AttendanceRecord>> {
        let _guard = self.lock.lock().await;
        self.load()
    }

    fn load(&self) -> Result<Vec<AttendanceRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.deserialize().collect::<std::result::Result<_, _>>()?;
        Ok(rows)
    }

    fn store(&self, rows: &[AttendanceRecord]) -> Result<()> {
        // Write-then-rename so a crash mid-write cannot truncate the ledger
        let tmp = self.path.with_extension("csv.tmp");
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        drop(writer);
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
