use crate::error::{RepoListerError, Result};
use crate::models::{RateLimitState, RepoPage, Repository};
use crate::types::{GitHubErrorBody, GitHubRepo};
use crate::username::validate_username;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
pub const PER_PAGE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const LOW_RATE_LIMIT: u32 = 10;

/// Anything that can list one page of a user's repositories.
///
/// Implementations must validate the username before doing any I/O and
/// report a short page (fewer than [`PER_PAGE`] items) as the last one.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn fetch_page(&self, username: &str, page: u32) -> Result<RepoPage>;
}

/// Fetches every page for `username`, one request at a time, until a short
/// page comes back. Any failure fails the whole call.
pub async fn fetch_all<S>(source: &S, username: &str) -> Result<Vec<Repository>>
where
    S: RepoSource + ?Sized,
{
    let username = validate_username(username)?;
    let mut repositories = Vec::new();
    let mut page = 1;

    loop {
        let batch = source.fetch_page(username, page).await?;
        repositories.extend(batch.repositories);

        if !batch.has_more {
            break;
        }
        page += 1;
    }

    info!(
        username,
        pages = page,
        total = repositories.len(),
        "Fetched all repositories"
    );
    Ok(repositories)
}

#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct GitHubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_config(GitHubClientConfig {
            token,
            ..Default::default()
        })
    }

    pub fn with_config(config: GitHubClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(RepoListerError::ConfigError(format!(
                "API base URL cannot hold a path: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("repo-lister/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| RepoListerError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(GitHubClient {
            client,
            base_url,
            token: config.token.filter(|t| !t.is_empty()),
        })
    }

    /// `{base}/users/{username}/repos?per_page=100&page={page}&sort=updated`
    /// with the username percent-encoded as a single path segment.
    pub fn repos_url(&self, username: &str, page: u32) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RepoListerError::ConfigError("API base URL cannot hold a path".into()))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("sort", "updated");
        Ok(url)
    }

    async fn make_request(&self, url: Url) -> Result<Response> {
        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await?;
        let rate_limit = rate_limit_state(&response);
        let status = response.status();

        if status.is_success() {
            if let Some(limit) = rate_limit.as_ref().filter(|l| l.remaining < LOW_RATE_LIMIT) {
                warn!(
                    remaining = limit.remaining,
                    reset_time = %limit.reset_time,
                    "GitHub rate limit is running low"
                );
            }
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let api_message = serde_json::from_str::<GitHubErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);

        let detail = match status {
            StatusCode::NOT_FOUND => format!("user not found: {}", url.path()),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if rate_limit.as_ref().is_some_and(|l| l.is_limited) =>
            {
                let reset = rate_limit.map(|l| l.reset_time).unwrap_or_else(Utc::now);
                format!("API rate limit exceeded, resets at {}", reset)
            }
            status => format!("API request failed with status {}: {}", status, api_message),
        };

        warn!(%status, %url, "GitHub request failed");
        Err(RepoListerError::fetch_failed(detail))
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn fetch_page(&self, username: &str, page: u32) -> Result<RepoPage> {
        let username = validate_username(username)?;
        let url = self.repos_url(username, page)?;

        debug!(username, page, "Requesting repository page");
        let response = self.make_request(url).await?;
        let repos: Vec<GitHubRepo> = response.json().await?;

        let page = RepoPage::new(page, repos.into_iter().map(Repository::from).collect());
        debug!(
            username,
            page = page.page,
            count = page.repositories.len(),
            has_more = page.has_more,
            "Fetched repository page"
        );
        Ok(page)
    }
}

/// Rate limit state from the `X-RateLimit-*` headers, if GitHub sent them.
pub fn rate_limit_state(response: &Response) -> Option<RateLimitState> {
    let headers = response.headers();
    let header = |name: &str| headers.get(name).and_then(|h| h.to_str().ok());

    let remaining = header("X-RateLimit-Remaining")?.parse::<u32>().ok()?;

    let limit = header("X-RateLimit-Limit")
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(remaining);

    let reset_time = header("X-RateLimit-Reset")
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0))
        .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(1));

    Some(RateLimitState {
        remaining,
        limit,
        reset_time,
        is_limited: remaining == 0,
    })
}
