//! Remote report source
//!
//! Reports are mirrored to GitHub Issues. Reading lists issues by label and
//! parses each one; writing triggers a workflow that creates the issue
//! asynchronously, so a successful submit does not return the new issue.

pub mod github;
pub mod issue;

pub use github::{GitHubClient, TokenInfo};
pub use issue::{format_issue, parse_issue, team_tag, Issue, IssueDraft, IssueParseError};

use async_trait::async_trait;
use chrono::FixedOffset;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Report, Team};

/// Remote side of the report mirror
#[async_trait]
pub trait ReportRemote: Send + Sync {
    /// Fetch parsed reports, optionally limited to one team
    ///
    /// A non-success response is an error; unreadable issues are skipped.
    async fn fetch_reports(&self, team_filter: Option<u32>) -> Result<Vec<Report>>;

    /// Push one report
    async fn submit_report(&self, report: &Report) -> Result<()>;
}

/// Parse a batch of issues, skipping those that are not reports
pub fn reports_from_issues(issues: &[Issue], teams: &[Team], offset: FixedOffset) -> Vec<Report> {
    issues
        .iter()
        .filter_map(|issue| match parse_issue(issue, teams, offset) {
            Ok(report) => Some(report),
            Err(IssueParseError::EmptyBody) => {
                warn!(issue = issue.number, "Skipping issue without body");
                None
            }
            Err(e) => {
                debug!(issue = issue.number, reason = %e, "Skipping issue");
                None
            }
        })
        .collect()
}
