//! Password and token checks
//!
//! Passwords are shared plaintext values from configuration.

use crate::config::SettingsConfig;
use crate::models::Team;

const TOKEN_PREFIXES: [&str; 2] = ["ghp_", "github_pat_"];

/// Check the admin dashboard password; an unset password never matches
pub fn verify_admin_password(settings: &SettingsConfig, input: &str) -> bool {
    !settings.admin_password.is_empty() && settings.admin_password == input
}

/// Check a team password; teams without one accept any input
pub fn verify_team_password(team: &Team, input: &str) -> bool {
    team.password.is_empty() || team.password == input
}

/// Whether a scanned or pasted string has the shape of a GitHub token
pub fn looks_like_token(candidate: &str) -> bool {
    let candidate = candidate.trim();
    TOKEN_PREFIXES
        .iter()
        .any(|prefix| candidate.len() > prefix.len() && candidate.starts_with(prefix))
        && !candidate.contains(char::is_whitespace)
}
