#![allow(dead_code)]

use async_trait::async_trait;
use repo_lister::error::{RepoListerError, Result};
use repo_lister::github::{RepoSource, PER_PAGE};
use repo_lister::models::{RepoPage, Repository};
use repo_lister::username::validate_username;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn repository(id: u64) -> Repository {
    Repository {
        id,
        name: format!("repo-{}", id),
        description: (id % 3 != 0).then(|| format!("Description of \"repo\" {}", id)),
        language: (id % 2 == 0).then(|| "Rust".to_string()),
        star_count: (id * 7) as u32,
        updated_at: format!("2024-01-{:02}T12:00:00Z", id % 28 + 1),
    }
}

pub fn repositories(count: usize) -> Vec<Repository> {
    (1..=count as u64).map(repository).collect()
}

/// The JSON GitHub would send for `repo`, with a few fields we ignore.
pub fn repository_json(repo: &Repository) -> Value {
    json!({
        "id": repo.id,
        "node_id": format!("R_{}", repo.id),
        "name": repo.name,
        "full_name": format!("octocat/{}", repo.name),
        "private": false,
        "description": repo.description,
        "language": repo.language,
        "stargazers_count": repo.star_count,
        "updated_at": repo.updated_at,
        "html_url": format!("https://github.com/octocat/{}", repo.name),
    })
}

/// Mounts one mock per page GitHub would serve for a user with `total`
/// repositories, each expected exactly once.
pub async fn mount_user(server: &MockServer, username: &str, total: usize) -> Vec<Repository> {
    let all = repositories(total);
    let per_page = PER_PAGE as usize;
    let pages = total / per_page + 1;

    for page in 1..=pages {
        let start = ((page - 1) * per_page).min(total);
        let end = (page * per_page).min(total);
        let body: Vec<Value> = all[start..end].iter().map(repository_json).collect();

        Mock::given(method("GET"))
            .and(path(format!("/users/{}/repos", username)))
            .and(query_param("page", page.to_string()))
            .and(query_param("per_page", "100"))
            .and(query_param("sort", "updated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    all
}

pub struct GateHandle {
    pub started: Arc<Notify>,
    pub release: oneshot::Sender<()>,
}

struct Gate {
    started: Arc<Notify>,
    release: oneshot::Receiver<()>,
}

/// In-memory repository source. A gated username holds its next request
/// until the gate is released.
#[derive(Default)]
pub struct FakeSource {
    users: HashMap<String, Vec<Repository>>,
    gates: Mutex<HashMap<String, Gate>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: &str, total: usize) -> Self {
        self.users.insert(username.to_string(), repositories(total));
        self
    }

    pub fn gate(&self, username: &str) -> GateHandle {
        let started = Arc::new(Notify::new());
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(
            username.to_string(),
            Gate {
                started: started.clone(),
                release: rx,
            },
        );
        GateHandle {
            started,
            release: tx,
        }
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoSource for FakeSource {
    async fn fetch_page(&self, username: &str, page: u32) -> Result<RepoPage> {
        let username = validate_username(username)?;
        self.calls.lock().unwrap().push((username.to_string(), page));

        let gate = self.gates.lock().unwrap().remove(username);
        if let Some(gate) = gate {
            gate.started.notify_one();
            let _ = gate.release.await;
        }

        let all = self
            .users
            .get(username)
            .ok_or_else(|| RepoListerError::fetch_failed("404 Not Found"))?;
        let per_page = PER_PAGE as usize;
        let start = ((page as usize - 1) * per_page).min(all.len());
        let end = (start + per_page).min(all.len());
        Ok(RepoPage::new(page, all[start..end].to_vec()))
    }
}
