//! Common test utilities and setup

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use trip::models::{MediaItem, MissionRef};
use trip::storage::{FileKeyValueStore, LocalReportStore, MemoryKeyValueStore, SharedStore};
use trip::{Report, ReportRemote, Result, SyncStatus, TripError};

/// In-memory report store
pub fn memory_store() -> LocalReportStore {
    LocalReportStore::new(Arc::new(MemoryKeyValueStore::new()))
}

/// File-backed report store in a fresh temp dir
pub fn file_store() -> (TempDir, LocalReportStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let kv: SharedStore = Arc::new(FileKeyValueStore::new(temp_dir.path().join("storage.json")));
    (temp_dir, LocalReportStore::new(kv))
}

/// Local-origin record with the given status
pub fn local_report(team_id: u32, timestamp: &str, status: SyncStatus) -> Report {
    Report {
        team_id,
        team_name: format!("Team {}", team_id),
        timestamp: timestamp.to_string(),
        images: vec![MediaItem::image("a.jpg", "data:image/jpeg;base64,AAAA")],
        comment: "local".to_string(),
        missions: vec![MissionRef {
            index: 0,
            text: "Group photo".to_string(),
        }],
        sync_status: Some(status),
        from_github: false,
    }
}

/// Remote-origin record as the issue parser produces it
pub fn remote_report(team_id: u32, timestamp: &str) -> Report {
    Report {
        team_id,
        team_name: format!("Team {}", team_id),
        timestamp: timestamp.to_string(),
        images: vec![MediaItem::placeholder()],
        comment: "remote".to_string(),
        missions: vec![],
        sync_status: None,
        from_github: true,
    }
}

/// Scriptable [`ReportRemote`]
///
/// Fetches return `reports` unless a failure is queued. Submits succeed
/// unless the report's team is listed in `failing_teams`; every submit is
/// recorded.
#[derive(Default)]
pub struct FakeRemote {
    reports: Mutex<Vec<Report>>,
    fetch_failures: Mutex<VecDeque<u16>>,
    failing_teams: Mutex<Vec<u32>>,
    submitted: Mutex<Vec<Report>>,
    fetches: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_reports(reports: Vec<Report>) -> Arc<Self> {
        let remote = Self::default();
        *remote.reports.lock() = reports;
        Arc::new(remote)
    }

    /// Make the next fetch fail with the given HTTP status
    pub fn fail_next_fetch(&self, status: u16) {
        self.fetch_failures.lock().push_back(status);
    }

    pub fn fail_submits_for(&self, team_id: u32) {
        self.failing_teams.lock().push(team_id);
    }

    pub fn set_reports(&self, reports: Vec<Report>) {
        *self.reports.lock() = reports;
    }

    pub fn submitted(&self) -> Vec<Report> {
        self.submitted.lock().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportRemote for FakeRemote {
    async fn fetch_reports(&self, team_filter: Option<u32>) -> Result<Vec<Report>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = self.fetch_failures.lock().pop_front() {
            return Err(TripError::RemoteStatus {
                status,
                message: "scripted failure".to_string(),
            });
        }

        let reports = self.reports.lock().clone();
        Ok(match team_filter {
            Some(team_id) => reports.into_iter().filter(|r| r.team_id == team_id).collect(),
            None => reports,
        })
    }

    async fn submit_report(&self, report: &Report) -> Result<()> {
        self.submitted.lock().push(report.clone());

        if self.failing_teams.lock().contains(&report.team_id) {
            return Err(TripError::RemoteStatus {
                status: 502,
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}
