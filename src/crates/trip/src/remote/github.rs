//! GitHub REST client
//!
//! Endpoints used:
//! - `GET /repos/{repo}/issues` filtered by label, one page of 100
//! - `POST /repos/{repo}/actions/workflows/{workflow}/dispatches`
//! - `GET /user` and `GET /repos/{repo}` to validate a token

use async_trait::async_trait;
use chrono::FixedOffset;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{fixed_offset, GitHubConfig, TripConfig};
use crate::error::{Result, TripError};
use crate::models::{team_label, Report, Team};
use crate::remote::issue::{format_issue, Issue};
use crate::remote::{reports_from_issues, ReportRemote};
use crate::retry::{with_retry, RetryConfig};

const PAGE_SIZE: u32 = 100;
const ACCEPT: &str = "application/vnd.github+json";

/// Account behind a validated token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenInfo {
    pub login: String,
}

/// GitHub-backed [`ReportRemote`]
pub struct GitHubClient {
    http: Client,
    config: GitHubConfig,
    token: String,
    teams: Vec<Team>,
    offset: FixedOffset,
    retry: RetryConfig,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("repo", &self.config.repo)
            .field("api_base", &self.config.api_base)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client for the configured repository
    pub fn new(
        config: GitHubConfig,
        token: impl Into<String>,
        teams: Vec<Team>,
        utc_offset_hours: i32,
    ) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(TripError::RemoteDisabled("no access token".to_string()));
        }

        let offset = fixed_offset(utc_offset_hours)?;

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("trip/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retry = RetryConfig::default().with_max_retries(config.max_retries);

        Ok(Self {
            http,
            config,
            token,
            teams,
            offset,
            retry,
        })
    }

    /// Build a client from full configuration
    ///
    /// Fails with [`TripError::RemoteDisabled`] when mirroring is off or no
    /// token is available from config or `saved_token`.
    pub fn from_config(config: &TripConfig, saved_token: Option<String>) -> Result<Self> {
        if !config.github.enabled {
            return Err(TripError::RemoteDisabled("github.enabled is false".to_string()));
        }

        let token = config
            .github
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or(saved_token)
            .ok_or_else(|| TripError::RemoteDisabled("no access token".to_string()))?;

        Self::new(
            config.github.clone(),
            token,
            config.teams.clone(),
            config.settings.utc_offset_hours,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn issues_url(&self, team_filter: Option<u32>) -> String {
        let labels = match team_filter {
            Some(team_id) => format!("{},{}", self.config.label, team_label(team_id)),
            None => self.config.label.clone(),
        };
        format!(
            "{}?labels={}&state=all&per_page={}",
            self.url(&format!("/repos/{}/issues", self.config.repo)),
            labels,
            PAGE_SIZE
        )
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Accept", ACCEPT)
            .header("Authorization", format!("token {}", self.token))
    }

    /// Send a request, mapping non-success statuses to errors
    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(TripError::RemoteStatus {
            status: status.as_u16(),
            message,
        })
    }

    /// List report issues (single page)
    pub async fn list_issues(&self, team_filter: Option<u32>) -> Result<Vec<Issue>> {
        let url = self.issues_url(team_filter);
        debug!(url = %url, "Listing report issues");

        let response = with_retry(&self.retry, "list_issues", TripError::is_transient, || {
            self.send(self.authorized(self.http.get(&url)))
        })
        .await?;

        let issues: Vec<Issue> = response.json().await?;
        debug!(count = issues.len(), "Fetched issues");
        Ok(issues)
    }

    /// Trigger the issue-creating workflow for one report
    pub async fn dispatch_report(&self, report: &Report) -> Result<()> {
        let draft = format_issue(report, &self.config.label, self.offset);
        let url = self.url(&format!(
            "/repos/{}/actions/workflows/{}/dispatches",
            self.config.repo, self.config.workflow
        ));
        let payload = json!({
            "ref": self.config.git_ref,
            "inputs": {
                "title": draft.title,
                "body": draft.body,
                "labels": draft.labels,
            }
        });

        with_retry(&self.retry, "dispatch_report", TripError::is_transient, || {
            self.send(self.authorized(self.http.post(&url)).json(&payload))
        })
        .await?;

        info!(team_id = report.team_id, timestamp = %report.timestamp, "Issue workflow dispatched");
        Ok(())
    }

    /// Check that the token authenticates and can see the repository
    pub async fn validate_token(&self) -> Result<TokenInfo> {
        let user = self
            .send(self.authorized(self.http.get(self.url("/user"))))
            .await
            .map_err(|e| classify_auth_error(e, "user"))?;
        let info: TokenInfo = user.json().await?;

        self.send(
            self.authorized(
                self.http
                    .get(self.url(&format!("/repos/{}", self.config.repo))),
            ),
        )
        .await
        .map_err(|e| classify_auth_error(e, &self.config.repo))?;

        info!(login = %info.login, repo = %self.config.repo, "Token validated");
        Ok(info)
    }
}

/// Map auth-related statuses to the errors that prompt for a new token
fn classify_auth_error(err: TripError, target: &str) -> TripError {
    match err {
        TripError::RemoteStatus { status, message }
            if status == StatusCode::UNAUTHORIZED.as_u16() =>
        {
            TripError::InvalidToken(format!("{} rejected the token: {}", target, message))
        }
        TripError::RemoteStatus { status, message }
            if status == StatusCode::FORBIDDEN.as_u16() || status == StatusCode::NOT_FOUND.as_u16() =>
        {
            TripError::RepositoryAccess(format!("{} ({}): {}", target, status, message))
        }
        other => other,
    }
}

#[async_trait]
impl ReportRemote for GitHubClient {
    async fn fetch_reports(&self, team_filter: Option<u32>) -> Result<Vec<Report>> {
        let issues = self.list_issues(team_filter).await?;
        let mut reports = reports_from_issues(&issues, &self.teams, self.offset);
        if let Some(team_id) = team_filter {
            reports.retain(|r| r.team_id == team_id);
        }
        Ok(reports)
    }

    async fn submit_report(&self, report: &Report) -> Result<()> {
        self.dispatch_report(report).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        let config = GitHubConfig {
            enabled: true,
            repo: "acme/trip".to_string(),
            api_base: "https://api.example.test/".to_string(),
            ..Default::default()
        };
        GitHubClient::new(config, "ghp_test", vec![], 9).unwrap()
    }

    #[test]
    fn test_issues_url() {
        let client = client();

        assert_eq!(
            client.issues_url(None),
            "https://api.example.test/repos/acme/trip/issues?labels=mission-report&state=all&per_page=100"
        );
        assert_eq!(
            client.issues_url(Some(3)),
            "https://api.example.test/repos/acme/trip/issues?labels=mission-report,team-3&state=all&per_page=100"
        );
    }

    #[test]
    fn test_empty_token_disables_remote() {
        let result = GitHubClient::new(GitHubConfig::default(), "", vec![], 9);
        assert!(matches!(result, Err(TripError::RemoteDisabled(_))));
    }

    #[test]
    fn test_out_of_range_offset_is_config_error() {
        let config = GitHubConfig {
            enabled: true,
            repo: "acme/trip".to_string(),
            ..Default::default()
        };

        let result = GitHubClient::new(config.clone(), "ghp_test", vec![], 1_000_000);
        assert!(matches!(result, Err(TripError::Config(_))));
        assert!(GitHubClient::new(config, "ghp_test", vec![], -12).is_ok());
    }

    #[test]
    fn test_from_config_prefers_config_token_then_saved() {
        let mut config = TripConfig::default();
        config.github.enabled = true;
        config.github.repo = "acme/trip".to_string();

        assert!(GitHubClient::from_config(&config, None).is_err());
        assert!(GitHubClient::from_config(&config, Some("ghp_saved".into())).is_ok());

        config.github.enabled = false;
        assert!(matches!(
            GitHubClient::from_config(&config, Some("ghp_saved".into())),
            Err(TripError::RemoteDisabled(_))
        ));
    }

    #[test]
    fn test_classify_auth_error() {
        let unauthorized = TripError::RemoteStatus { status: 401, message: "Bad credentials".into() };
        let missing = TripError::RemoteStatus { status: 404, message: "Not Found".into() };
        let server = TripError::RemoteStatus { status: 500, message: "oops".into() };

        assert!(matches!(classify_auth_error(unauthorized, "user"), TripError::InvalidToken(_)));
        assert!(matches!(classify_auth_error(missing, "acme/trip"), TripError::RepositoryAccess(_)));
        assert!(matches!(classify_auth_error(server, "user"), TripError::RemoteStatus { .. }));
    }
}
