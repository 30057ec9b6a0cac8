//! Mission report model
//!
//! A report is the only persisted entity. Its `timestamp` doubles as the
//! identifier, so it is kept verbatim as the ISO-8601 string it was created
//! or parsed with rather than re-rendered from a parsed value.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::team::Team;

/// Window, in whole seconds, inside which two reports of one team are the same event
pub const DUPLICATE_WINDOW_SECS: i64 = 5;

/// Sync status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Saved locally, not yet pushed
    Pending,
    /// Pushed to the remote successfully
    Synced,
    /// Last push attempt failed
    Failed,
    /// Saved while the remote was disabled
    LocalOnly,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Synced => "synced",
            Self::Failed => "failed",
            Self::LocalOnly => "local-only",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attached photo or video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Data URL, or empty for the placeholder entry
    pub data: String,
    pub name: String,
    #[serde(default)]
    pub is_video: bool,
}

impl MediaItem {
    pub fn image(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            name: name.into(),
            is_video: false,
        }
    }

    pub fn video(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            name: name.into(),
            is_video: true,
        }
    }

    /// Empty entry used when a report carries no media
    pub fn placeholder() -> Self {
        Self {
            data: String::new(),
            name: String::new(),
            is_video: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty()
    }
}

/// Reference to one entry of a team's mission list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionRef {
    /// 0-based index into the team's mission list
    pub index: usize,
    /// Mission label at submission time
    pub text: String,
}

/// Mission report record
///
/// Field names follow the persisted JSON layout (`teamId`, `syncStatus`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub team_id: u32,

    /// Team display name at submission time
    pub team_name: String,

    /// ISO-8601 creation time; acts as the record identifier
    pub timestamp: String,

    #[serde(default)]
    pub images: Vec<MediaItem>,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub missions: Vec<MissionRef>,

    /// Absent on older and remote-origin records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<SyncStatus>,

    /// Set only on records parsed from the remote
    #[serde(
        default,
        rename = "fromGitHub",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub from_github: bool,
}

impl Report {
    /// Create a local-origin report stamped with the current time
    pub fn new_local(
        team: &Team,
        missions: Vec<MissionRef>,
        images: Vec<MediaItem>,
        comment: impl Into<String>,
    ) -> Self {
        Self::new_local_at(team, Utc::now(), missions, images, comment)
    }

    /// Create a local-origin report with an explicit creation time
    pub fn new_local_at(
        team: &Team,
        at: DateTime<Utc>,
        missions: Vec<MissionRef>,
        images: Vec<MediaItem>,
        comment: impl Into<String>,
    ) -> Self {
        let images = if images.is_empty() {
            vec![MediaItem::placeholder()]
        } else {
            images
        };

        Self {
            team_id: team.id,
            team_name: team.name.clone(),
            timestamp: format_timestamp(at),
            images,
            comment: comment.into(),
            missions,
            sync_status: Some(SyncStatus::Pending),
            from_github: false,
        }
    }

    /// Parsed creation time, if the stored string is valid RFC 3339
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Creation time truncated to whole seconds since the epoch
    pub fn epoch_seconds(&self) -> Option<i64> {
        self.parsed_timestamp().map(|dt| dt.timestamp())
    }

    pub fn is_synced(&self) -> bool {
        self.sync_status == Some(SyncStatus::Synced)
    }

    /// Local-origin record that still needs a push
    pub fn needs_sync(&self) -> bool {
        !self.from_github && !self.is_synced()
    }

    /// Media entries that actually carry data
    pub fn attached_media(&self) -> impl Iterator<Item = &MediaItem> {
        self.images.iter().filter(|m| !m.is_placeholder())
    }

    /// Whether both records describe the same submission
    ///
    /// Same team and timestamps no more than [`DUPLICATE_WINDOW_SECS`] apart.
    /// Not transitive. Records with unparseable timestamps only match on an
    /// exact string.
    pub fn same_event(&self, other: &Report) -> bool {
        if self.team_id != other.team_id {
            return false;
        }
        match (self.epoch_seconds(), other.epoch_seconds()) {
            (Some(a), Some(b)) => (a - b).abs() <= DUPLICATE_WINDOW_SECS,
            _ => self.timestamp == other.timestamp,
        }
    }
}

/// Render a timestamp the way new reports are stamped
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
