//! Report reconciliation
//!
//! Merges the local report list with the remote one into a single
//! time-ordered view. Two records are the same event when
//! [`Report::same_event`] holds; the remote copy wins.

use tracing::{debug, info, warn};

use crate::models::Report;
use crate::remote::ReportRemote;
use crate::storage::LocalReportStore;

/// Merge local and remote records, dropping duplicates
///
/// Remote records are considered first, so when a local record matches one
/// the remote copy is kept. Matching is greedy in that order: a record is
/// kept unless it matches a record already kept. Local storage is never
/// touched.
pub fn merge_reports(local: Vec<Report>, remote: Vec<Report>) -> Vec<Report> {
    let mut merged: Vec<Report> = Vec::with_capacity(local.len() + remote.len());

    for report in remote.into_iter().chain(local) {
        if merged.iter().any(|kept| kept.same_event(&report)) {
            debug!(
                team_id = report.team_id,
                timestamp = %report.timestamp,
                from_github = report.from_github,
                "Dropping duplicate report"
            );
            continue;
        }
        merged.push(report);
    }

    sort_by_timestamp(&mut merged);
    merged
}

/// Stable ascending sort by parsed timestamp; unparseable timestamps sort first
pub fn sort_by_timestamp(reports: &mut [Report]) {
    reports.sort_by_key(|r| r.parsed_timestamp());
}

/// Every known report, ascending by time
///
/// With `team_filter` set (locked-team mode) only that team's reports are
/// loaded and fetched. Without a remote, or when the fetch fails, the local
/// records are returned as stored, only ordered by time.
pub async fn get_all_reports(
    store: &LocalReportStore,
    remote: Option<&dyn ReportRemote>,
    team_filter: Option<u32>,
) -> Vec<Report> {
    let mut local = match team_filter {
        Some(team_id) => store.load_for_team(team_id),
        None => store.load(),
    };

    let Some(remote) = remote else {
        sort_by_timestamp(&mut local);
        return local;
    };

    match remote.fetch_reports(team_filter).await {
        Ok(mut fetched) => {
            if let Some(team_id) = team_filter {
                fetched.retain(|r| r.team_id == team_id);
            }
            let local_count = local.len();
            let remote_count = fetched.len();
            let merged = merge_reports(local, fetched);
            info!(
                local = local_count,
                remote = remote_count,
                merged = merged.len(),
                "Reports reconciled"
            );
            merged
        }
        Err(e) => {
            warn!(error = %e, "Remote fetch failed, using local reports only");
            sort_by_timestamp(&mut local);
            local
        }
    }
}

/// Reports of one team, ascending by time
pub async fn get_team_reports(
    store: &LocalReportStore,
    remote: Option<&dyn ReportRemote>,
    team_id: u32,
) -> Vec<Report> {
    get_all_reports(store, remote, Some(team_id)).await
}
