use crate::github::PER_PAGE;
use crate::types::GitHubRepo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as listed for a user. Never mutated after it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "stargazers_count")]
    pub star_count: u32,
    pub updated_at: String,
}

impl Repository {
    /// `updated_at` as a timestamp, if GitHub sent a valid RFC 3339 value.
    pub fn updated_at_parsed(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl From<GitHubRepo> for Repository {
    fn from(repo: GitHubRepo) -> Self {
        Repository {
            id: repo.id,
            name: repo.name,
            description: repo.description,
            language: repo.language,
            star_count: repo.stargazers_count,
            updated_at: repo.updated_at,
        }
    }
}

/// Rate limit state reported by the last response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: 60,
            limit: 60,
            reset_time: Utc::now() + chrono::Duration::hours(1),
            is_limited: false,
        }
    }
}

/// One page of results plus whether another page should be requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPage {
    pub page: u32,
    pub repositories: Vec<Repository>,
    pub has_more: bool,
}

impl RepoPage {
    /// A full page means there may be more; a short page is the last one.
    pub fn new(page: u32, repositories: Vec<Repository>) -> Self {
        let has_more = repositories.len() >= PER_PAGE as usize;
        Self {
            page,
            repositories,
            has_more,
        }
    }
}
