//! Saved selections: current team, locked team, access token

use crate::error::Result;
use crate::storage::{SharedStore, LOCKED_TEAM_KEY, SELECTED_TEAM_KEY, TOKEN_KEY};
use tracing::warn;

/// Typed access to the preference keys
#[derive(Clone)]
pub struct Preferences {
    store: SharedStore,
}

impl Preferences {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn selected_team(&self) -> Option<u32> {
        self.read_id(SELECTED_TEAM_KEY)
    }

    pub fn set_selected_team(&self, team_id: u32) -> Result<()> {
        self.store.set(SELECTED_TEAM_KEY, &team_id.to_string())
    }

    pub fn clear_selected_team(&self) -> Result<()> {
        self.store.remove(SELECTED_TEAM_KEY)
    }

    /// Team the device is locked to, if any
    pub fn locked_team(&self) -> Option<u32> {
        self.read_id(LOCKED_TEAM_KEY)
    }

    pub fn set_locked_team(&self, team_id: u32) -> Result<()> {
        self.store.set(LOCKED_TEAM_KEY, &team_id.to_string())
    }

    pub fn clear_locked_team(&self) -> Result<()> {
        self.store.remove(LOCKED_TEAM_KEY)
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read saved token");
                None
            }
        }
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }

    fn read_id(&self, key: &str) -> Option<u32> {
        match self.store.get(key) {
            Ok(Some(raw)) => raw.trim().parse().ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read preference");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryKeyValueStore};
    use std::sync::Arc;

    #[test]
    fn test_team_selection_roundtrip() {
        let prefs = Preferences::new(Arc::new(MemoryKeyValueStore::new()));

        assert_eq!(prefs.selected_team(), None);
        prefs.set_selected_team(3).unwrap();
        assert_eq!(prefs.selected_team(), Some(3));
        prefs.clear_selected_team().unwrap();
        assert_eq!(prefs.selected_team(), None);
    }

    #[test]
    fn test_garbage_id_reads_as_none() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(LOCKED_TEAM_KEY, "abc").unwrap();

        let prefs = Preferences::new(kv);
        assert_eq!(prefs.locked_team(), None);
    }

    #[test]
    fn test_empty_token_reads_as_none() {
        let prefs = Preferences::new(Arc::new(MemoryKeyValueStore::new()));

        prefs.set_token("").unwrap();
        assert_eq!(prefs.token(), None);
        prefs.set_token("ghp_abc").unwrap();
        assert_eq!(prefs.token().as_deref(), Some("ghp_abc"));
    }
}
