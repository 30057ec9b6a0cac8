//! Sync queue
//!
//! Pushes local records that are not yet `synced` to the remote, one at a
//! time with a fixed pause between attempts. Failures are recorded on the
//! record and never stop the pass.

use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::models::{Report, SyncStatus};
use crate::remote::ReportRemote;
use crate::storage::LocalReportStore;

/// Default pause between push attempts
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Outcome of one sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Push one record and record the outcome on it
///
/// Returns the status written. Remote-origin records are never pushed.
pub async fn push_report(
    store: &LocalReportStore,
    remote: &dyn ReportRemote,
    report: &Report,
) -> Option<SyncStatus> {
    if report.from_github {
        debug!(timestamp = %report.timestamp, "Skipping remote-origin report");
        return None;
    }

    let status = match remote.submit_report(report).await {
        Ok(()) => SyncStatus::Synced,
        Err(e) => {
            warn!(
                team_id = report.team_id,
                timestamp = %report.timestamp,
                error = %e,
                "Report push failed"
            );
            SyncStatus::Failed
        }
    };

    store.update_status_for(report.team_id, &report.timestamp, status);
    Some(status)
}

/// Push every local record that is not `synced`
///
/// `succeeded + failed` always equals the number of candidates found when
/// the pass started.
pub async fn sync_pending(
    store: &LocalReportStore,
    remote: &dyn ReportRemote,
    pacing: Duration,
) -> SyncSummary {
    let candidates: Vec<Report> = store.load().into_iter().filter(Report::needs_sync).collect();
    let mut summary = SyncSummary::default();

    if candidates.is_empty() {
        debug!("Nothing to sync");
        return summary;
    }

    info!(pending = candidates.len(), "Syncing pending reports");

    for (i, report) in candidates.iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            sleep(pacing).await;
        }

        match push_report(store, remote, report).await {
            Some(SyncStatus::Synced) => summary.succeeded += 1,
            _ => summary.failed += 1,
        }
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Sync pass finished"
    );
    summary
}
