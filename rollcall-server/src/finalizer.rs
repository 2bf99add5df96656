//! Session finalization
//!
//! Runs exactly once at shutdown: seals the ledger, appends absentee rows
//! for roster members never seen today, and hands the final file to the
//! report dispatcher.

use crate::dispatch::ReportDispatcher;
use crate::ledger::LedgerStore;
use crate::roster::Roster;
use chrono::Local;
use rollcall_common::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Once-only absentee computation and report dispatch
pub struct SessionFinalizer {
    ledger: Arc<LedgerStore>,
    roster: Arc<Roster>,
    dispatcher: Arc<dyn ReportDispatcher>,
    finalized: AtomicBool,
}

impl SessionFinalizer {
    pub fn new(
        ledger: Arc<LedgerStore>,
        roster: Arc<Roster>,
        dispatcher: Arc<dyn ReportDispatcher>,
    ) -> Self {
        Self {
            ledger,
            roster,
            dispatcher,
            finalized: AtomicBool::new(false),
        }
    }

    /// Finalize the session for today's date.
    ///
    /// Repeated invocations are no-ops: the atomic flag flips exactly once,
    /// and the absentee pass itself is idempotent at the row level. The
    /// ledger is sealed before the absentee snapshot, so a scan racing this
    /// call is rejected rather than recorded behind the snapshot's back.
    /// Dispatch failure is logged and swallowed.
    pub async fn finalize(&self) -> Result<()> {
        if self.finalized.swap(true, Ordering::SeqCst) {
            debug!("Session already finalized; ignoring repeated shutdown signal");
            return Ok(());
        }

        info!("Finalizing attendance report...");
        let today = Local::now().date_naive();
        let absentees = self
            .ledger
            .finalize(today, &self.roster.unique_names())
            .await?;
        for name in &absentees {
            info!("Marking {} as Absent", name);
        }
        info!("Final report saved to {}", self.ledger.path().display());

        if let Err(e) = self.dispatcher.send(self.ledger.path()).await {
            warn!("Report dispatch failed: {}", e);
        }

        Ok(())
    }
}
