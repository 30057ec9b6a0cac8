//! Progress aggregation for team cards and the admin dashboard

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Report, Team};

/// Progress of one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProgress {
    pub team_id: u32,
    pub team_name: String,
    pub reports: usize,
    pub required: usize,
    /// Capped at 100
    pub percent: f64,
    pub completed: bool,
}

/// Progress across all configured teams
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub teams: Vec<TeamProgress>,
    pub completed_teams: usize,
    pub total_teams: usize,
    /// Share of completed teams, rounded to a whole percent
    pub total_percent: u32,
    pub total_reports: usize,
}

impl TeamProgress {
    pub fn new(team: &Team, reports: usize, required: usize) -> Self {
        let percent = if required == 0 {
            100.0
        } else {
            (reports as f64 / required as f64 * 100.0).min(100.0)
        };

        Self {
            team_id: team.id,
            team_name: team.name.clone(),
            reports,
            required,
            percent,
            completed: reports >= required,
        }
    }
}

/// Count reports per configured team
///
/// Reports for teams missing from `teams` still count toward
/// `total_reports`.
pub fn summarize(teams: &[Team], reports: &[Report], required: usize) -> ProgressSummary {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for report in reports {
        *counts.entry(report.team_id).or_default() += 1;
    }

    let teams: Vec<TeamProgress> = teams
        .iter()
        .map(|team| TeamProgress::new(team, counts.get(&team.id).copied().unwrap_or(0), required))
        .collect();

    let completed_teams = teams.iter().filter(|t| t.completed).count();
    let total_teams = teams.len();
    let total_percent = if total_teams == 0 {
        0
    } else {
        (completed_teams as f64 / total_teams as f64 * 100.0).round() as u32
    };

    ProgressSummary {
        teams,
        completed_teams,
        total_teams,
        total_percent,
        total_reports: reports.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaItem;

    fn report(team_id: u32) -> Report {
        Report {
            team_id,
            team_name: String::new(),
            timestamp: "2024-01-01T10:00:00Z".to_string(),
            images: vec![MediaItem::placeholder()],
            comment: String::new(),
            missions: vec![],
            sync_status: None,
            from_github: false,
        }
    }

    #[test]
    fn test_summarize_counts_and_caps() {
        let teams = vec![
            Team::new(1, "Falcons", vec![]),
            Team::new(2, "Owls", vec![]),
            Team::new(3, "Bears", vec![]),
        ];
        let reports = vec![report(1), report(1), report(1), report(1), report(2), report(9)];

        let summary = summarize(&teams, &reports, 3);

        assert_eq!(summary.teams[0].reports, 4);
        assert_eq!(summary.teams[0].percent, 100.0);
        assert!(summary.teams[0].completed);
        assert!((summary.teams[1].percent - 33.333).abs() < 0.01);
        assert_eq!(summary.teams[2].reports, 0);
        assert_eq!(summary.completed_teams, 1);
        assert_eq!(summary.total_percent, 33);
        assert_eq!(summary.total_reports, 6);
    }

    #[test]
    fn test_summarize_no_teams() {
        let summary = summarize(&[], &[report(1)], 3);
        assert_eq!(summary.total_percent, 0);
        assert_eq!(summary.total_teams, 0);
    }

    #[test]
    fn test_rounding_of_total_percent() {
        let teams = vec![Team::new(1, "A", vec![]), Team::new(2, "B", vec![]), Team::new(3, "C", vec![])];
        let reports = vec![report(1), report(2)];

        assert_eq!(summarize(&teams, &reports, 1).total_percent, 67);
    }
}
