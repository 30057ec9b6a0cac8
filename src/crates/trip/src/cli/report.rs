//! Report command handlers

use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{Table, Tabled};

use crate::cli::{display_time, status_label, truncate, TripContext};
use crate::error::{Result, TripError};
use crate::media::load_media;
use crate::models::SyncStatus;
use crate::reconcile::get_all_reports;
use crate::remote::ReportRemote;
use crate::scheduler::{BackgroundSync, IntervalTicker};
use crate::session::AppState;
use crate::shutdown::ShutdownCoordinator;
use crate::submission::{submit, SubmissionDraft};
use crate::sync::sync_pending;

/// Report display row for table output
#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Missions")]
    missions: String,
    #[tabled(rename = "Media")]
    media: usize,
    #[tabled(rename = "Comment")]
    comment: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
}

/// Handle submit command
///
/// `missions` are 1-based as shown by `trip select`.
pub async fn handle_submit(
    ctx: &TripContext,
    team_id: Option<u32>,
    missions: Vec<usize>,
    media: Vec<PathBuf>,
    comment: Option<String>,
) -> Result<()> {
    let state = AppState::restore(ctx.prefs.clone(), ctx.config.teams.clone());

    let team_id = match (team_id, state.current_team()) {
        (Some(id), _) => id,
        (None, Some(team)) => team.id,
        (None, None) => {
            return Err(TripError::Validation(
                "no team selected; pass --team or run 'trip select <id>'".to_string(),
            ))
        }
    };

    if let Some(locked) = state.locked_team() {
        if locked != team_id {
            return Err(TripError::Validation(format!(
                "device is locked to team {}",
                locked
            )));
        }
    }

    let mission_indices = missions
        .into_iter()
        .map(|n| {
            n.checked_sub(1)
                .ok_or_else(|| TripError::Validation("mission numbers start at 1".to_string()))
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut draft = SubmissionDraft::new(team_id)
        .with_missions(mission_indices)
        .with_comment(comment.unwrap_or_default());
    for path in &media {
        draft = draft.with_media(load_media(path).await?);
    }

    let outcome = submit(&ctx.store, ctx.remote(), &ctx.config.teams, &draft).await?;

    println!("{}", "✓ Report saved".green().bold());
    println!("  Team: {}", outcome.report.team_name);
    println!("  Missions: {}", outcome.report.missions.len());
    println!("  Media: {}", outcome.report.attached_media().count());
    println!("  Timestamp: {}", outcome.report.timestamp);

    match outcome.status {
        SyncStatus::Synced => println!("  {}", "Sent to GitHub".green()),
        SyncStatus::LocalOnly => println!("  {}", "Saved locally (GitHub mirroring is off)".yellow()),
        _ => println!(
            "  {}",
            "GitHub push failed; it will be retried by 'trip sync'".yellow()
        ),
    }

    Ok(())
}

/// Handle list command
pub async fn handle_list(ctx: &TripContext, team_id: Option<u32>) -> Result<()> {
    let state = AppState::restore(ctx.prefs.clone(), ctx.config.teams.clone());
    let filter = team_id.or_else(|| state.locked_team());

    let reports = get_all_reports(&ctx.store, ctx.remote(), filter).await;

    if reports.is_empty() {
        println!("{}", "No reports found".yellow());
        return Ok(());
    }

    let offset = ctx.offset();
    let rows: Vec<ReportRow> = reports
        .iter()
        .map(|report| ReportRow {
            time: display_time(report, offset),
            team: report.team_name.clone(),
            missions: report
                .missions
                .iter()
                .map(|m| (m.index + 1).to_string())
                .collect::<Vec<_>>()
                .join(","),
            media: report.attached_media().count(),
            comment: truncate(&report.comment, 30),
            status: status_label(report).to_string(),
            timestamp: report.timestamp.clone(),
        })
        .collect();

    let count = rows.len();
    println!("{}", Table::new(rows));
    println!("\nTotal: {} reports", count);

    if ctx.remote.is_none() {
        println!("{}", "Showing local reports only".dimmed());
    }

    Ok(())
}

/// Handle delete command
pub fn handle_delete(ctx: &TripContext, timestamp: &str) -> Result<()> {
    let removed = ctx.store.remove(timestamp);
    if removed == 0 {
        return Err(TripError::NotFound(format!("local report {}", timestamp)));
    }

    println!("{}", format!("✓ Deleted {} local report(s)", removed).green().bold());
    Ok(())
}

/// Handle sync command
pub async fn handle_sync(ctx: &TripContext) -> Result<()> {
    let Some(remote) = ctx.remote() else {
        println!("{}", "GitHub mirroring is off; nothing to sync".yellow());
        return Ok(());
    };

    let summary = sync_pending(&ctx.store, remote, ctx.config.sync.pacing()).await;

    if summary.attempted() == 0 {
        println!("{}", "All reports are synced".green());
    } else {
        println!(
            "Synced: {}  Failed: {}",
            summary.succeeded.to_string().green(),
            summary.failed.to_string().red()
        );
    }
    Ok(())
}

/// Handle watch command: run the background loop until Ctrl+C
pub async fn handle_watch(ctx: &TripContext) -> Result<()> {
    let state = AppState::restore(ctx.prefs.clone(), ctx.config.teams.clone());
    let remote = ctx.remote.clone().map(|r| r as Arc<dyn ReportRemote>);

    let shutdown = ShutdownCoordinator::new();
    let _signal_handler = shutdown.install_signal_handler();

    let background = BackgroundSync::new(ctx.store.clone(), remote, ctx.config.sync.pacing())
        .with_team_filter(state.locked_team());
    let mut outcomes = background.subscribe();
    let handle = background.spawn(IntervalTicker::new(ctx.config.sync.interval()), shutdown);

    println!(
        "Refreshing every {}s, press Ctrl+C to stop",
        ctx.config.sync.interval().as_secs()
    );

    while outcomes.changed().await.is_ok() {
        let outcome = outcomes.borrow_and_update().clone();
        let at = outcome
            .refreshed_at
            .map(|t| t.with_timezone(&ctx.offset()).format("%H:%M:%S").to_string())
            .unwrap_or_default();

        let mut line = format!("[{}] {} reports", at, outcome.total_reports);
        if outcome.new_reports > 0 && outcome.pass > 1 {
            line.push_str(&format!(", {} new", outcome.new_reports).green().to_string());
        }
        if outcome.sync.attempted() > 0 {
            line.push_str(&format!(
                ", synced {} failed {}",
                outcome.sync.succeeded, outcome.sync.failed
            ));
        }
        println!("{}", line);
    }

    let last = handle
        .await
        .map_err(|e| TripError::Other(format!("background task failed: {}", e)))?;
    println!("Stopped after {} passes", last.pass);
    Ok(())
}
