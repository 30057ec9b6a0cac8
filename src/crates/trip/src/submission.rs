//! Report submission
//!
//! Validates a draft, saves it locally, then makes a single push attempt.
//! The local save is what counts as success; a failed push only changes
//! the record's status and leaves it for the next sync pass.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{Result, TripError};
use crate::models::{find_team, MediaItem, MissionRef, Report, SyncStatus, Team};
use crate::remote::ReportRemote;
use crate::storage::LocalReportStore;
use crate::sync::push_report;

/// Unvalidated report input
#[derive(Debug, Clone, Default)]
pub struct SubmissionDraft {
    pub team_id: u32,
    /// 0-based indices into the team's mission list
    pub mission_indices: Vec<usize>,
    pub media: Vec<MediaItem>,
    pub comment: String,
}

/// Saved report plus the status it ended up with
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub report: Report,
    pub status: SyncStatus,
}

impl SubmissionDraft {
    pub fn new(team_id: u32) -> Self {
        Self {
            team_id,
            ..Self::default()
        }
    }

    pub fn with_missions(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.mission_indices.extend(indices);
        self
    }

    pub fn with_media(mut self, item: MediaItem) -> Self {
        self.media.push(item);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Validate a draft and build the record it describes
///
/// Mission indices are sorted and deduplicated.
pub fn build_report(teams: &[Team], draft: &SubmissionDraft, at: DateTime<Utc>) -> Result<Report> {
    let team = find_team(teams, draft.team_id)
        .ok_or_else(|| TripError::NotFound(format!("team {}", draft.team_id)))?;

    if draft.media.is_empty() {
        return Err(TripError::Validation(
            "at least one photo or video is required".to_string(),
        ));
    }
    if draft.mission_indices.is_empty() {
        return Err(TripError::Validation(
            "select at least one mission".to_string(),
        ));
    }

    let mut indices = draft.mission_indices.clone();
    indices.sort_unstable();
    indices.dedup();

    let missions = indices
        .into_iter()
        .map(|index| {
            team.mission(index).ok_or_else(|| {
                TripError::Validation(format!(
                    "team {} has no mission {}",
                    team.name,
                    index + 1
                ))
            })
        })
        .collect::<Result<Vec<MissionRef>>>()?;

    Ok(Report::new_local_at(
        team,
        at,
        missions,
        draft.media.clone(),
        draft.comment.trim(),
    ))
}

/// Save a draft and push it once when a remote is available
pub async fn submit(
    store: &LocalReportStore,
    remote: Option<&dyn ReportRemote>,
    teams: &[Team],
    draft: &SubmissionDraft,
) -> Result<SubmissionOutcome> {
    let report = build_report(teams, draft, Utc::now())?;
    store.append(report.clone())?;

    info!(
        team_id = report.team_id,
        timestamp = %report.timestamp,
        missions = report.missions.len(),
        "Report saved"
    );

    let status = match remote {
        Some(remote) => push_report(store, remote, &report)
            .await
            .unwrap_or(SyncStatus::Failed),
        None => {
            store.update_status_for(report.team_id, &report.timestamp, SyncStatus::LocalOnly);
            SyncStatus::LocalOnly
        }
    };

    let mut report = report;
    report.sync_status = Some(status);
    Ok(SubmissionOutcome { report, status })
}
