//! Local report store
//!
//! Wraps the single JSON array persisted under [`REPORTS_KEY`]. Reads never
//! fail: an absent or unparseable value is an empty list. Only the write in
//! [`LocalReportStore::append`] reports failure to the caller, so a
//! submission that did not persist is never mistaken for a saved one.

use crate::error::Result;
use crate::models::{Report, SyncStatus};
use crate::storage::{SharedStore, REPORTS_KEY};
use tracing::{debug, warn};

/// Report list persisted in a key/value store
#[derive(Clone)]
pub struct LocalReportStore {
    store: SharedStore,
}

impl LocalReportStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All records in insertion order
    pub fn load(&self) -> Vec<Report> {
        let raw = match self.store.get(REPORTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read local reports, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Report>>(&raw) {
            Ok(reports) => reports,
            Err(e) => {
                warn!(error = %e, "Local reports are corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Records belonging to one team
    pub fn load_for_team(&self, team_id: u32) -> Vec<Report> {
        self.load()
            .into_iter()
            .filter(|r| r.team_id == team_id)
            .collect()
    }

    /// Append one record; the write error propagates
    pub fn append(&self, report: Report) -> Result<()> {
        let mut reports = self.load();
        debug!(team_id = report.team_id, timestamp = %report.timestamp, "Appending local report");
        reports.push(report);
        self.save(&reports)
    }

    /// Remove every record with exactly this timestamp; returns how many went
    pub fn remove(&self, timestamp: &str) -> usize {
        let mut reports = self.load();
        let before = reports.len();
        reports.retain(|r| r.timestamp != timestamp);
        let removed = before - reports.len();

        if removed == 0 {
            return 0;
        }
        if let Err(e) = self.save(&reports) {
            warn!(timestamp = %timestamp, error = %e, "Failed to persist report removal");
            return 0;
        }
        removed
    }

    /// Set the sync status of the first local-origin record with this timestamp
    ///
    /// Remote-origin records are skipped. Returns whether a record changed.
    pub fn update_status(&self, timestamp: &str, status: SyncStatus) -> bool {
        self.update_matching(timestamp, status, |_| true)
    }

    /// Like [`LocalReportStore::update_status`], limited to one team's records
    ///
    /// Teams can share a timestamp, so pushes record their outcome this way.
    pub fn update_status_for(&self, team_id: u32, timestamp: &str, status: SyncStatus) -> bool {
        self.update_matching(timestamp, status, |r| r.team_id == team_id)
    }

    fn update_matching(
        &self,
        timestamp: &str,
        status: SyncStatus,
        filter: impl Fn(&Report) -> bool,
    ) -> bool {
        let mut reports = self.load();
        let Some(report) = reports
            .iter_mut()
            .find(|r| r.timestamp == timestamp && !r.from_github && filter(r))
        else {
            debug!(timestamp = %timestamp, "No local report to update");
            return false;
        };

        report.sync_status = Some(status);
        match self.save(&reports) {
            Ok(()) => true,
            Err(e) => {
                warn!(timestamp = %timestamp, status = %status, error = %e, "Failed to persist sync status");
                false
            }
        }
    }

    fn save(&self, reports: &[Report]) -> Result<()> {
        let raw = serde_json::to_string(reports)?;
        self.store.set(REPORTS_KEY, &raw)
    }
}

impl std::fmt::Debug for LocalReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalReportStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaItem, MissionRef};
    use crate::storage::{KeyValueStore, MemoryKeyValueStore};
    use crate::TripError;
    use std::sync::Arc;

    fn report(team_id: u32, timestamp: &str) -> Report {
        Report {
            team_id,
            team_name: "Falcons".to_string(),
            timestamp: timestamp.to_string(),
            images: vec![MediaItem::image("a.jpg", "data:image/jpeg;base64,AAAA")],
            comment: "done".to_string(),
            missions: vec![MissionRef {
                index: 0,
                text: "Group photo".to_string(),
            }],
            sync_status: Some(SyncStatus::Pending),
            from_github: false,
        }
    }

    fn store() -> (Arc<MemoryKeyValueStore>, LocalReportStore) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        (kv.clone(), LocalReportStore::new(kv))
    }

    #[test]
    fn test_load_absent_is_empty() {
        let (_, reports) = store();
        assert!(reports.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let (kv, reports) = store();
        kv.set(REPORTS_KEY, "{\"not\": \"an array\"}").unwrap();
        assert!(reports.load().is_empty());
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let (_, reports) = store();
        reports.append(report(1, "2024-01-01T10:00:10.000Z")).unwrap();
        reports.append(report(1, "2024-01-01T10:00:00.000Z")).unwrap();

        let loaded = reports.load();
        assert_eq!(loaded[0].timestamp, "2024-01-01T10:00:10.000Z");
        assert_eq!(loaded[1].timestamp, "2024-01-01T10:00:00.000Z");
    }

    #[test]
    fn test_append_propagates_quota_failure() {
        let kv = Arc::new(MemoryKeyValueStore::with_quota(16));
        let reports = LocalReportStore::new(kv);

        let err = reports.append(report(1, "2024-01-01T10:00:00.000Z")).unwrap_err();
        assert!(matches!(err, TripError::QuotaExceeded { .. }));
        assert!(reports.load().is_empty());
    }

    #[test]
    fn test_remove_drops_all_matching() {
        let (_, reports) = store();
        reports.append(report(1, "2024-01-01T10:00:00.000Z")).unwrap();
        reports.append(report(2, "2024-01-01T10:00:00.000Z")).unwrap();
        reports.append(report(1, "2024-01-01T11:00:00.000Z")).unwrap();

        assert_eq!(reports.remove("2024-01-01T10:00:00.000Z"), 2);
        assert_eq!(reports.load().len(), 1);
        assert_eq!(reports.remove("missing"), 0);
    }

    #[test]
    fn test_update_status_first_match_only() {
        let (_, reports) = store();
        reports.append(report(1, "2024-01-01T10:00:00.000Z")).unwrap();
        reports.append(report(2, "2024-01-01T10:00:00.000Z")).unwrap();

        assert!(reports.update_status("2024-01-01T10:00:00.000Z", SyncStatus::Synced));

        let loaded = reports.load();
        assert_eq!(loaded[0].sync_status, Some(SyncStatus::Synced));
        assert_eq!(loaded[1].sync_status, Some(SyncStatus::Pending));
    }

    #[test]
    fn test_update_status_for_targets_one_team() {
        let (_, reports) = store();
        reports.append(report(1, "2024-01-01T10:00:00.000Z")).unwrap();
        reports.append(report(2, "2024-01-01T10:00:00.000Z")).unwrap();

        assert!(reports.update_status_for(2, "2024-01-01T10:00:00.000Z", SyncStatus::Synced));
        assert!(!reports.update_status_for(3, "2024-01-01T10:00:00.000Z", SyncStatus::Synced));

        let loaded = reports.load();
        assert_eq!(loaded[0].sync_status, Some(SyncStatus::Pending));
        assert_eq!(loaded[1].sync_status, Some(SyncStatus::Synced));
    }

    #[test]
    fn test_update_status_skips_remote_origin() {
        let (_, reports) = store();
        let mut remote = report(1, "2024-01-01T10:00:00.000Z");
        remote.from_github = true;
        remote.sync_status = None;
        reports.append(remote).unwrap();

        assert!(!reports.update_status("2024-01-01T10:00:00.000Z", SyncStatus::Synced));
        assert_eq!(reports.load()[0].sync_status, None);
    }

    #[test]
    fn test_update_status_missing_is_noop() {
        let (_, reports) = store();
        assert!(!reports.update_status("nope", SyncStatus::Failed));
    }
}
