//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.trip/trip.toml
//! 3. Project-level config: ./.trip/trip.toml
//!
//! Later configs override earlier ones key by key; arrays such as `teams`
//! are replaced as a whole.

use crate::config::schema::{data_dir, TripConfig};
use crate::error::{Result, TripError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration loader that handles both user and project configs
pub struct ConfigLoader {
    user_config_path: PathBuf,
    project_config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            user_config_path: data_dir().join("trip.toml"),
            project_config_path: PathBuf::from(".trip").join("trip.toml"),
        }
    }

    /// Create a loader reading from explicit locations
    pub fn with_paths(user_config_path: PathBuf, project_config_path: PathBuf) -> Self {
        Self {
            user_config_path,
            project_config_path,
        }
    }

    /// Load configuration from both locations with project taking precedence
    pub async fn load(&self) -> Result<TripConfig> {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        info!("Loading configuration with defaults");

        for path in [&self.user_config_path, &self.project_config_path] {
            match Self::read_table(path).await? {
                Some(layer) => {
                    debug!(path = %path.display(), "Loaded config layer");
                    merge_values(&mut merged, layer);
                }
                None => {
                    debug!(path = %path.display(), "Config layer not found, skipping");
                }
            }
        }

        let mut config: TripConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| TripError::Config(format!("Failed to parse config: {}", e)))?;

        config.resolve_env_vars();
        config.validate()?;

        info!(teams = config.teams.len(), github = config.github.enabled, "Configuration loaded");
        Ok(config)
    }

    /// Read one config file as a TOML table; `None` when the file is absent
    async fn read_table(path: &Path) -> Result<Option<toml::Value>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| TripError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let value: toml::Value = toml::from_str(&content)
            .map_err(|e| TripError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        Ok(Some(value))
    }

    /// Get user config path
    pub fn user_config_path(&self) -> &Path {
        &self.user_config_path
    }

    /// Get project config path
    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively overlay `overlay` onto `base`; tables merge, everything else replaces
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        let loader = ConfigLoader::new();

        assert!(loader.user_config_path().ends_with(".trip/trip.toml"));
        assert!(loader.project_config_path().ends_with(".trip/trip.toml"));
    }

    #[tokio::test]
    async fn test_load_returns_defaults_when_no_files() {
        let loader = ConfigLoader::with_paths(
            PathBuf::from("/nonexistent/user.toml"),
            PathBuf::from("/nonexistent/project.toml"),
        );
        let config = loader.load().await.unwrap();

        assert!(config.teams.is_empty());
        assert_eq!(config.settings.required_reports, 3);
        assert_eq!(config.storage.path, "storage.json");
    }

    #[tokio::test]
    async fn test_project_overrides_user_per_key() {
        let temp_dir = TempDir::new().unwrap();
        let user_path = temp_dir.path().join("user.toml");
        let project_path = temp_dir.path().join("project.toml");

        let user_toml = r#"
[settings]
required_reports = 4
admin_password = "user-admin"

[github]
enabled = true
repo = "acme/trip"

[[teams]]
id = 1
name = "Falcons"
"#;
        let project_toml = r#"
[settings]
admin_password = "project-admin"

[sync]
pacing_ms = 250
"#;
        fs::write(&user_path, user_toml).await.unwrap();
        fs::write(&project_path, project_toml).await.unwrap();

        let config = ConfigLoader::with_paths(user_path, project_path)
            .load()
            .await
            .unwrap();

        assert_eq!(config.settings.required_reports, 4);
        assert_eq!(config.settings.admin_password, "project-admin");
        assert_eq!(config.github.repo, "acme/trip");
        assert_eq!(config.sync.pacing_ms, 250);
        assert_eq!(config.sync.interval_secs, 30);
        assert_eq!(config.teams.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let user_path = temp_dir.path().join("user.toml");
        fs::write(&user_path, "[settings\nrequired_reports = ").await.unwrap();

        let result = ConfigLoader::with_paths(user_path, PathBuf::from("/nonexistent/p.toml"))
            .load()
            .await;

        assert!(matches!(result, Err(TripError::Config(_))));
    }

    #[test]
    fn test_merge_values_replaces_arrays() {
        let mut base: toml::Value = toml::from_str("list = [1, 2]\n[t]\na = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("list = [3]\n[t]\nb = 5").unwrap();

        merge_values(&mut base, overlay);

        assert_eq!(base["list"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(base["t"]["a"].as_integer(), Some(1));
        assert_eq!(base["t"]["b"].as_integer(), Some(5));
    }
}
