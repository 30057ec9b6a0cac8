//! Access token command handlers

use colored::Colorize;

use crate::auth::looks_like_token;
use crate::cli::TripContext;
use crate::error::{Result, TripError};
use crate::remote::GitHubClient;

/// Handle token set command
pub fn handle_set(ctx: &TripContext, token: &str) -> Result<()> {
    let token = token.trim();
    if !looks_like_token(token) {
        return Err(TripError::Validation(
            "token must start with ghp_ or github_pat_".to_string(),
        ));
    }

    ctx.prefs.set_token(token)?;
    println!("{}", "✓ Token saved".green().bold());
    if !ctx.config.github.enabled {
        println!("{}", "  Note: github.enabled is false in the configuration".yellow());
    }
    Ok(())
}

/// Handle token validate command
pub async fn handle_validate(ctx: &TripContext) -> Result<()> {
    let client = match &ctx.remote {
        Some(client) => client.clone(),
        None => std::sync::Arc::new(GitHubClient::from_config(&ctx.config, ctx.prefs.token())?),
    };

    match client.validate_token().await {
        Ok(info) => {
            println!("{}", "✓ Token is valid".green().bold());
            println!("  User: {}", info.login);
            println!("  Repository: {}", ctx.config.github.repo);
            Ok(())
        }
        Err(e) if e.needs_new_token() => {
            println!("{}", "✗ Token rejected; run 'trip token set <token>'".red().bold());
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Handle token clear command
pub fn handle_clear(ctx: &TripContext) -> Result<()> {
    ctx.prefs.clear_token()?;
    println!("{}", "✓ Saved token removed".green().bold());
    Ok(())
}
