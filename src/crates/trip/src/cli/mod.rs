//! CLI command implementations
//!
//! Provides command handlers for the trip CLI binary.

pub mod admin;
pub mod report;
pub mod team;
pub mod token;

use chrono::{FixedOffset, Offset, Utc};
use colored::{ColoredString, Colorize};
use std::sync::Arc;
use tracing::debug;

use crate::config::TripConfig;
use crate::error::{Result, TripError};
use crate::models::{Report, SyncStatus};
use crate::remote::{GitHubClient, ReportRemote};
use crate::storage::{LocalReportStore, Preferences, SharedStore};

/// Everything a command handler needs
pub struct TripContext {
    pub config: TripConfig,
    pub store: LocalReportStore,
    pub prefs: Preferences,
    pub remote: Option<Arc<GitHubClient>>,
}

impl TripContext {
    /// Assemble a context from loaded configuration
    ///
    /// The remote is left out when mirroring is disabled or no token is
    /// available.
    pub fn new(config: TripConfig, kv: SharedStore) -> Result<Self> {
        let store = LocalReportStore::new(kv.clone());
        let prefs = Preferences::new(kv);

        let remote = match GitHubClient::from_config(&config, prefs.token()) {
            Ok(client) => Some(Arc::new(client)),
            Err(TripError::RemoteDisabled(reason)) => {
                debug!(reason = %reason, "Running in local-only mode");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            config,
            store,
            prefs,
            remote,
        })
    }

    /// Remote as a trait object, for the library entry points
    pub fn remote(&self) -> Option<&dyn ReportRemote> {
        self.remote.as_deref().map(|r| r as &dyn ReportRemote)
    }

    pub fn offset(&self) -> FixedOffset {
        self.config
            .settings
            .utc_offset()
            .unwrap_or_else(|_| Utc.fix())
    }
}

/// Colored status for table cells
pub(crate) fn status_label(report: &Report) -> ColoredString {
    if report.from_github {
        return "github".cyan();
    }
    match report.sync_status {
        Some(SyncStatus::Synced) => "synced".green(),
        Some(SyncStatus::Failed) => "failed".red(),
        Some(SyncStatus::LocalOnly) => "local-only".yellow(),
        Some(SyncStatus::Pending) | None => "pending".yellow(),
    }
}

/// Render a report time in the event's local offset
pub(crate) fn display_time(report: &Report, offset: FixedOffset) -> String {
    report
        .parsed_timestamp()
        .map(|dt| dt.with_timezone(&offset).format("%Y/%m/%d %H:%M:%S").to_string())
        .unwrap_or_else(|| report.timestamp.clone())
}

/// Shorten long text for table output
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
