//! Admin dashboard

use colored::Colorize;
use tabled::{Table, Tabled};

use crate::auth::verify_admin_password;
use crate::cli::{display_time, TripContext};
use crate::error::{Result, TripError};
use crate::progress::summarize;
use crate::reconcile::get_all_reports;

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Reports")]
    reports: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Done")]
    done: String,
}

/// Handle dashboard command
pub async fn handle_dashboard(ctx: &TripContext, password: &str) -> Result<()> {
    if !verify_admin_password(&ctx.config.settings, password) {
        return Err(TripError::Validation("wrong admin password".to_string()));
    }

    let reports = get_all_reports(&ctx.store, ctx.remote(), None).await;
    let summary = summarize(&ctx.config.teams, &reports, ctx.config.settings.required_reports);

    println!("\n{}", "Trip Progress".bold().underline());
    println!(
        "Completed teams: {}/{} ({}%)",
        summary.completed_teams, summary.total_teams, summary.total_percent
    );
    println!("Total reports: {}\n", summary.total_reports);

    let rows: Vec<ProgressRow> = summary
        .teams
        .iter()
        .map(|team| ProgressRow {
            team: team.team_name.clone(),
            reports: format!("{}/{}", team.reports, team.required),
            progress: format!("{:.0}%", team.percent),
            done: if team.completed {
                "✓".green().to_string()
            } else {
                String::new()
            },
        })
        .collect();
    println!("{}", Table::new(rows));

    if let Some(latest) = reports.last() {
        println!(
            "\nLatest: {} at {}",
            latest.team_name,
            display_time(latest, ctx.offset())
        );
    }

    Ok(())
}
