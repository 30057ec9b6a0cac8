//! Team selection command handlers

use colored::Colorize;
use tabled::{Table, Tabled};

use crate::auth::verify_team_password;
use crate::cli::TripContext;
use crate::error::{Result, TripError};
use crate::models::find_team;
use crate::progress::summarize;
use crate::reconcile::get_all_reports;
use crate::session::AppState;

/// Team display row for table output
#[derive(Tabled)]
struct TeamRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Team")]
    name: String,
    #[tabled(rename = "Missions")]
    missions: usize,
    #[tabled(rename = "Reports")]
    reports: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "")]
    marker: String,
}

/// Handle teams command: list teams with their progress
pub async fn handle_teams(ctx: &TripContext) -> Result<()> {
    let state = AppState::restore(ctx.prefs.clone(), ctx.config.teams.clone());

    if state.teams().is_empty() {
        println!("{}", "No teams configured".yellow());
        return Ok(());
    }

    let reports = get_all_reports(&ctx.store, ctx.remote(), state.locked_team()).await;
    let summary = summarize(state.teams(), &reports, ctx.config.settings.required_reports);
    let current = state.current_team().map(|t| t.id);
    let locked = state.locked_team();

    let rows: Vec<TeamRow> = state
        .teams()
        .iter()
        .zip(&summary.teams)
        .map(|(team, progress)| {
            let marker = if locked == Some(team.id) {
                "locked".red().to_string()
            } else if current == Some(team.id) {
                "selected".green().to_string()
            } else {
                String::new()
            };

            TeamRow {
                id: team.id,
                name: team.name.clone(),
                missions: team.missions.len(),
                reports: format!("{}/{}", progress.reports, progress.required),
                progress: format!("{:.0}%", progress.percent),
                marker,
            }
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

/// Handle select command
pub fn handle_select(ctx: &TripContext, team_id: u32, password: Option<String>) -> Result<()> {
    let team = find_team(&ctx.config.teams, team_id)
        .ok_or_else(|| TripError::NotFound(format!("team {}", team_id)))?;

    if !verify_team_password(team, password.as_deref().unwrap_or_default()) {
        return Err(TripError::Validation(format!(
            "wrong password for team {}",
            team.name
        )));
    }

    let mut state = AppState::restore(ctx.prefs.clone(), ctx.config.teams.clone());
    let team = state.select_team(team_id)?;

    println!("{}", "✓ Team selected".green().bold());
    println!("  {} ({} missions)", team.name, team.missions.len());
    for (i, mission) in team.missions.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, mission);
    }
    Ok(())
}

/// Handle lock command
pub fn handle_lock(ctx: &TripContext, team_id: u32) -> Result<()> {
    let mut state = AppState::restore(ctx.prefs.clone(), ctx.config.teams.clone());
    state.lock_team(team_id)?;

    let name = state.current_team().map(|t| t.name.as_str()).unwrap_or_default();
    println!("{}", format!("✓ Device locked to {}", name).green().bold());
    Ok(())
}

/// Handle unlock command
pub fn handle_unlock(ctx: &TripContext) -> Result<()> {
    let mut state = AppState::restore(ctx.prefs.clone(), ctx.config.teams.clone());

    if state.locked_team().is_none() {
        println!("{}", "Device is not locked".yellow());
        return Ok(());
    }

    state.unlock_team()?;
    println!("{}", "✓ Device unlocked".green().bold());
    Ok(())
}
