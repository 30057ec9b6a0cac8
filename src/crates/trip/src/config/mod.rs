//! Configuration management for trip
//!
//! Supports dual-location configuration:
//! - User-level: ~/.trip/trip.toml
//! - Project-level: ./.trip/trip.toml
//!
//! Project-level config overrides user-level config.

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    data_dir, fixed_offset, GitHubConfig, LoggingConfig, SettingsConfig, StorageConfig, SyncConfig, TripConfig,
};

use crate::Result;

/// Load configuration from both default locations
pub async fn load_config() -> Result<TripConfig> {
    ConfigLoader::new().load().await
}
