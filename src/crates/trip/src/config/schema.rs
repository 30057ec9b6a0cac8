//! Configuration schema for the mission tracker

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TripError};
use crate::models::Team;

/// Main trip configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TripConfig {
    /// Static team list
    #[serde(default)]
    pub teams: Vec<Team>,

    /// Event-wide settings
    #[serde(default)]
    pub settings: SettingsConfig,

    /// GitHub mirroring
    #[serde(default)]
    pub github: GitHubConfig,

    /// Background sync timing
    #[serde(default)]
    pub sync: SyncConfig,

    /// Local storage location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Event-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Reports a team needs to count as completed
    #[serde(default = "default_required_reports")]
    pub required_reports: usize,

    /// Admin dashboard password (plaintext)
    #[serde(default)]
    pub admin_password: String,

    /// UTC offset, in hours, for dates written as `YYYY/M/D H:MM:SS`
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            required_reports: default_required_reports(),
            admin_password: String::new(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl SettingsConfig {
    /// Event offset as a chrono offset
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        fixed_offset(self.utc_offset_hours)
    }
}

/// Convert whole hours east of UTC; only real-world offsets (-12..=14) are accepted
pub fn fixed_offset(hours: i32) -> Result<FixedOffset> {
    if !(-12..=14).contains(&hours) {
        return Err(TripError::Config(format!(
            "UTC offset must be between -12 and 14 hours, got {}",
            hours
        )));
    }
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| TripError::Config(format!("Invalid UTC offset: {} hours", hours)))
}

fn default_required_reports() -> usize {
    3
}

fn default_utc_offset_hours() -> i32 {
    9
}

/// GitHub Issues mirroring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Mirror reports to GitHub
    #[serde(default)]
    pub enabled: bool,

    /// Repository as `owner/name`
    #[serde(default)]
    pub repo: String,

    /// Access token (supports ${VAR_NAME} interpolation)
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Workflow file that creates issues from dispatch inputs
    #[serde(default = "default_workflow")]
    pub workflow: String,

    /// Git ref the workflow runs on
    #[serde(default = "default_git_ref")]
    pub git_ref: String,

    /// Label every report issue carries
    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for timeouts, connect errors and 5xx responses
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            repo: String::new(),
            token: None,
            api_base: default_api_base(),
            workflow: default_workflow(),
            git_ref: default_git_ref(),
            label: default_label(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_workflow() -> String {
    "create_issue.yml".to_string()
}

fn default_git_ref() -> String {
    "main".to_string()
}

fn default_label() -> String {
    "mission-report".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    2
}

/// Background sync timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between background refresh ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Milliseconds between consecutive push attempts
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

fn default_interval_secs() -> u64 {
    crate::scheduler::DEFAULT_INTERVAL.as_secs()
}

fn default_pacing_ms() -> u64 {
    crate::sync::DEFAULT_PACING.as_millis() as u64
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage file path (relative to ~/.trip or absolute)
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "storage.json".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TripConfig {
    /// Resolve environment variables in configuration values
    ///
    /// Supports ${VAR_NAME} syntax in the token and admin password, and
    /// the `TRIP_GITHUB_TOKEN` / `TRIP_ADMIN_PASSWORD` overrides.
    pub fn resolve_env_vars(&mut self) {
        if let Some(ref token) = self.github.token {
            self.github.token = Some(Self::expand_env_var(token));
        }
        self.settings.admin_password = Self::expand_env_var(&self.settings.admin_password);

        if let Ok(token) = std::env::var("TRIP_GITHUB_TOKEN") {
            if !token.is_empty() {
                self.github.token = Some(token);
            }
        }
        if let Ok(password) = std::env::var("TRIP_ADMIN_PASSWORD") {
            if !password.is_empty() {
                self.settings.admin_password = password;
            }
        }
    }

    /// Expand environment variable in a string
    fn expand_env_var(value: &str) -> String {
        if value.starts_with("${") && value.ends_with('}') {
            let var_name = &value[2..value.len() - 1];
            std::env::var(var_name).unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        }
    }

    /// Check structural consistency
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for team in &self.teams {
            if team.name.trim().is_empty() {
                return Err(TripError::Config(format!("Team {} has an empty name", team.id)));
            }
            if !seen.insert(team.id) {
                return Err(TripError::Config(format!("Duplicate team id: {}", team.id)));
            }
        }

        if self.github.enabled {
            let parts: Vec<&str> = self.github.repo.split('/').collect();
            if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
                return Err(TripError::Config(format!(
                    "github.repo must be `owner/name`, got `{}`",
                    self.github.repo
                )));
            }
        }

        self.settings.utc_offset()?;

        if self.settings.required_reports == 0 {
            return Err(TripError::Config(
                "settings.required_reports must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the resolved storage path
    ///
    /// If path is relative, resolves it relative to ~/.trip
    pub fn storage_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.storage.path);

        if path.is_absolute() {
            path
        } else {
            data_dir().join(path)
        }
    }
}

/// Base directory for user-level state (~/.trip)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trip")
}
