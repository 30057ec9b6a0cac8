//! Application state owned by the presentation layer
//!
//! Holds the current team, the locked team and refresh bookkeeping. The
//! team choices are persisted through [`Preferences`]; the refresh counters
//! live only for the session.

use chrono::{DateTime, Utc};

use crate::error::{Result, TripError};
use crate::models::{find_team, Team};
use crate::storage::Preferences;

/// Tracks report totals between refreshes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshTracker {
    last_count: usize,
    last_refresh: Option<DateTime<Utc>>,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a refresh; returns how many reports appeared since the last one
    pub fn record(&mut self, total: usize, at: DateTime<Utc>) -> usize {
        let new_reports = total.saturating_sub(self.last_count);
        self.last_count = total;
        self.last_refresh = Some(at);
        new_reports
    }

    pub fn last_count(&self) -> usize {
        self.last_count
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }
}

/// Session state: who is reporting and what the device is locked to
#[derive(Clone)]
pub struct AppState {
    prefs: Preferences,
    teams: Vec<Team>,
    current_team: Option<Team>,
    refresh: RefreshTracker,
}

impl AppState {
    /// Restore the remembered team selection
    ///
    /// A locked team takes precedence over the selection; ids that no longer
    /// exist in the team list are ignored.
    pub fn restore(prefs: Preferences, teams: Vec<Team>) -> Self {
        let current_team = prefs
            .locked_team()
            .or_else(|| prefs.selected_team())
            .and_then(|id| find_team(&teams, id).cloned());

        Self {
            prefs,
            teams,
            current_team,
            refresh: RefreshTracker::new(),
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn current_team(&self) -> Option<&Team> {
        self.current_team.as_ref()
    }

    pub fn locked_team(&self) -> Option<u32> {
        self.prefs.locked_team()
    }

    /// Select and remember a team; refused while locked to another team
    pub fn select_team(&mut self, team_id: u32) -> Result<&Team> {
        let team = find_team(&self.teams, team_id)
            .cloned()
            .ok_or_else(|| TripError::NotFound(format!("team {}", team_id)))?;

        if let Some(locked) = self.locked_team() {
            if locked != team_id {
                return Err(TripError::Validation(format!(
                    "device is locked to team {}",
                    locked
                )));
            }
        }

        self.prefs.set_selected_team(team_id)?;
        Ok(&*self.current_team.insert(team))
    }

    /// Forget the selected team; refused while locked
    pub fn clear_team(&mut self) -> Result<()> {
        if let Some(locked) = self.locked_team() {
            return Err(TripError::Validation(format!(
                "device is locked to team {}",
                locked
            )));
        }
        self.prefs.clear_selected_team()?;
        self.current_team = None;
        Ok(())
    }

    /// Lock the device to one team and select it
    pub fn lock_team(&mut self, team_id: u32) -> Result<()> {
        if find_team(&self.teams, team_id).is_none() {
            return Err(TripError::NotFound(format!("team {}", team_id)));
        }
        self.prefs.set_locked_team(team_id)?;
        self.select_team(team_id)?;
        Ok(())
    }

    pub fn unlock_team(&mut self) -> Result<()> {
        self.prefs.clear_locked_team()
    }

    pub fn refresh(&self) -> &RefreshTracker {
        &self.refresh
    }

    pub fn record_refresh(&mut self, total: usize, at: DateTime<Utc>) -> usize {
        self.refresh.record(total, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use std::sync::Arc;

    fn teams() -> Vec<Team> {
        vec![Team::new(1, "Falcons", vec![]), Team::new(2, "Owls", vec![])]
    }

    fn prefs() -> Preferences {
        Preferences::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[test]
    fn test_restore_remembered_team() {
        let prefs = prefs();
        prefs.set_selected_team(2).unwrap();

        let state = AppState::restore(prefs, teams());
        assert_eq!(state.current_team().map(|t| t.id), Some(2));
    }

    #[test]
    fn test_restore_ignores_unknown_team() {
        let prefs = prefs();
        prefs.set_selected_team(99).unwrap();

        let state = AppState::restore(prefs, teams());
        assert!(state.current_team().is_none());
    }

    #[test]
    fn test_lock_blocks_other_selection() {
        let mut state = AppState::restore(prefs(), teams());
        state.lock_team(1).unwrap();

        assert!(matches!(state.select_team(2), Err(TripError::Validation(_))));
        assert!(state.clear_team().is_err());
        assert_eq!(state.current_team().map(|t| t.id), Some(1));

        state.unlock_team().unwrap();
        assert_eq!(state.select_team(2).unwrap().id, 2);
    }

    #[test]
    fn test_refresh_tracker_counts_new_reports() {
        let mut tracker = RefreshTracker::new();
        let now = Utc::now();

        assert_eq!(tracker.record(3, now), 3);
        assert_eq!(tracker.record(5, now), 2);
        assert_eq!(tracker.record(4, now), 0);
        assert_eq!(tracker.last_count(), 4);
        assert_eq!(tracker.last_refresh(), Some(now));
    }
}
