//! Data models

pub mod report;
pub mod team;

pub use report::{format_timestamp, MediaItem, MissionRef, Report, SyncStatus, DUPLICATE_WINDOW_SECS};
pub use team::{find_team, find_team_by_name, team_label, Team};
