//! Issue text grammar
//!
//! Reports are mirrored as GitHub issues whose title and body follow a fixed
//! layout. [`format_issue`] writes it and [`parse_issue`] reads it back.
//!
//! ```text
//! title   := "【" team-name "】" date " ミッション報告"
//! body    := line*
//! line    := "**日時:** " timestamp
//!          | "**達成したミッション:**" NL mission* (blank-line | EOF)
//!          | "**コメント:** " text
//!          | "![" alt "](" data-url ")"
//!          | any other line (ignored)
//! mission := "- " n ". " text        (n is 1-based)
//! ```
//!
//! The date value is RFC 3339; older issues carry `YYYY/M/D H:MM:SS` in the
//! event's local offset. An unreadable date falls back to the issue's own
//! creation time.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::{find_team_by_name, format_timestamp, MediaItem, MissionRef, Report, Team};

const DATE_LABEL: &str = "**日時:**";
const MISSIONS_LABEL: &str = "**達成したミッション:**";
const COMMENT_LABEL: &str = "**コメント:**";
const NO_COMMENT: &str = "なし";
const TITLE_SUFFIX: &str = "ミッション報告";
const FOOTER: &str = "*このレポートは社員旅行ミッション管理システムから自動投稿されました*";
const DEFAULT_IMAGE_NAME: &str = "image.jpg";

static TEAM_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"【(.+?)】").unwrap());

static MISSION_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^- (\d+)\. (.+)$").unwrap());

static EMBEDDED_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\((data:image[^)\s]+)\)").unwrap());

/// Issue as returned by the list-issues endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: String,
}

/// Title, body and labels for a new issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    /// Comma-separated label list
    pub labels: String,
}

/// Why an issue could not be read as a report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueParseError {
    #[error("issue title carries no 【team】 tag")]
    MissingTeamTag,

    #[error("issue title names unknown team `{0}`")]
    UnknownTeam(String),

    #[error("issue has no body")]
    EmptyBody,
}

/// Extract the bracketed team name from an issue title
pub fn team_tag(title: &str) -> Option<&str> {
    TEAM_TAG
        .captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Read one issue into a remote-origin report
pub fn parse_issue(
    issue: &Issue,
    teams: &[Team],
    offset: FixedOffset,
) -> Result<Report, IssueParseError> {
    let name = team_tag(&issue.title).ok_or(IssueParseError::MissingTeamTag)?;
    let team =
        find_team_by_name(teams, name).ok_or_else(|| IssueParseError::UnknownTeam(name.to_string()))?;

    let body = issue
        .body
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .ok_or(IssueParseError::EmptyBody)?;

    let fields = parse_body(body, offset);

    let images = if fields.images.is_empty() {
        vec![MediaItem::placeholder()]
    } else {
        fields.images
    };

    Ok(Report {
        team_id: team.id,
        team_name: team.name.clone(),
        timestamp: fields.timestamp.unwrap_or_else(|| issue.created_at.clone()),
        images,
        comment: fields.comment,
        missions: fields.missions,
        sync_status: None,
        from_github: true,
    })
}

#[derive(Debug, Default)]
struct BodyFields {
    timestamp: Option<String>,
    comment: String,
    missions: Vec<MissionRef>,
    images: Vec<MediaItem>,
}

fn parse_body(body: &str, offset: FixedOffset) -> BodyFields {
    let mut fields = BodyFields::default();
    let mut in_missions = false;

    for raw in body.lines() {
        let line = raw.trim();

        if in_missions {
            if line.is_empty() || line.starts_with("**") {
                in_missions = false;
            } else {
                if let Some(mission) = parse_mission_line(line) {
                    fields.missions.push(mission);
                }
                continue;
            }
        }

        if let Some(value) = line.strip_prefix(DATE_LABEL) {
            if fields.timestamp.is_none() {
                fields.timestamp = parse_date(value.trim(), offset).map(format_timestamp);
            }
        } else if let Some(value) = line.strip_prefix(COMMENT_LABEL) {
            let value = value.trim();
            fields.comment = if value == NO_COMMENT {
                String::new()
            } else {
                value.to_string()
            };
        } else if line == MISSIONS_LABEL {
            in_missions = true;
        }
    }

    for caps in EMBEDDED_IMAGE.captures_iter(body) {
        let alt = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let data = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let name = if alt.is_empty() { DEFAULT_IMAGE_NAME } else { alt };
        fields.images.push(MediaItem::image(name, data));
    }

    fields
}

fn parse_mission_line(line: &str) -> Option<MissionRef> {
    let caps = MISSION_LINE.captures(line)?;
    let number: usize = caps.get(1)?.as_str().parse().ok()?;
    let index = number.checked_sub(1)?;
    Some(MissionRef {
        index,
        text: caps.get(2)?.as_str().trim().to_string(),
    })
}

/// Parse a body date value: RFC 3339 first, then local `YYYY/M/D H:MM:SS`
pub fn parse_date(value: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a report as a new issue
pub fn format_issue(report: &Report, base_label: &str, offset: FixedOffset) -> IssueDraft {
    let local_date = report
        .parsed_timestamp()
        .map(|dt| dt.with_timezone(&offset).format("%Y/%-m/%-d").to_string())
        .unwrap_or_else(|| report.timestamp.clone());

    let title = format!("【{}】{} {}", report.team_name, local_date, TITLE_SUFFIX);

    let missions = if report.missions.is_empty() {
        NO_COMMENT.to_string()
    } else {
        report
            .missions
            .iter()
            .map(|m| format!("- {}. {}", m.index + 1, m.text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let comment = if report.comment.trim().is_empty() {
        NO_COMMENT
    } else {
        report.comment.as_str()
    };

    let media = report
        .attached_media()
        .enumerate()
        .map(|(i, item)| {
            if item.is_video {
                format!(
                    "### 動画 {}: {}\n\n⚠️ 動画は容量が大きいためGitHub Issuesには含まれていません。端末のローカルデータで確認してください。\n",
                    i + 1,
                    item.name
                )
            } else {
                let alt = item.name.replace([']', '\n'], "");
                format!("### 画像 {}: {}\n\n![{}]({})\n", i + 1, item.name, alt, item.data)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "## {team} - ミッション達成報告\n\n\
         {DATE_LABEL} {timestamp}\n\n\
         {MISSIONS_LABEL}\n{missions}\n\n\
         {COMMENT_LABEL} {comment}\n\n\
         ---\n\n\
         ## 📸 アップロード画像・動画\n\n\
         {media}\n\
         ---\n\
         {FOOTER}",
        team = report.team_name,
        timestamp = report.timestamp,
    );

    IssueDraft {
        title,
        body,
        labels: format!("{},{}", base_label, crate::models::team_label(report.team_id)),
    }
}
