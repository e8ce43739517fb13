//! Query state for one browsing session and the async driver around it.
//!
//! [`QueryState`] is never mutated in place: every transition builds a new
//! value. Each fetch carries a [`FetchTicket`] stamped with the generation
//! of the submit that started it, and results for an older generation are
//! dropped on arrival.

use crate::error::Result;
use crate::github::RepoSource;
use crate::models::{RepoPage, Repository};
use crate::username::validate_username;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    LoadingMore,
    Exhausted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub username: String,
    /// Next page to request (1-based).
    pub current_page: u32,
    pub has_more: bool,
    pub is_loading: bool,
    /// In API order, append-only until the next submit.
    pub repositories: Vec<Repository>,
    /// Error shown next to the username field.
    pub error: Option<String>,
    pub generation: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            username: String::new(),
            current_page: 1,
            has_more: false,
            is_loading: false,
            repositories: Vec::new(),
            error: None,
            generation: 0,
        }
    }
}

/// Identifies one in-flight page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub username: String,
    pub page: u32,
}

impl QueryState {
    pub fn phase(&self) -> Phase {
        if self.username.is_empty() {
            Phase::Idle
        } else if self.is_loading && self.current_page == 1 {
            Phase::Loading
        } else if self.is_loading {
            Phase::LoadingMore
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.has_more {
            Phase::Loaded
        } else {
            Phase::Exhausted
        }
    }

    /// Fresh state for a new username, loading page 1 under a new generation.
    pub fn submitted(&self, username: &str) -> (QueryState, FetchTicket) {
        let generation = self.generation + 1;
        let next = QueryState {
            username: username.to_string(),
            current_page: 1,
            has_more: true,
            is_loading: true,
            repositories: Vec::new(),
            error: None,
            generation,
        };
        let ticket = FetchTicket {
            generation,
            username: next.username.clone(),
            page: 1,
        };
        (next, ticket)
    }

    /// `None` while busy, before any submit or once the last page was seen.
    pub fn load_more_requested(&self) -> Option<(QueryState, FetchTicket)> {
        if self.is_loading || !self.has_more || self.username.is_empty() {
            return None;
        }
        let ticket = FetchTicket {
            generation: self.generation,
            username: self.username.clone(),
            page: self.current_page,
        };
        let next = QueryState {
            is_loading: true,
            ..self.clone()
        };
        Some((next, ticket))
    }

    /// Applies the outcome of `ticket`'s request. Returns `None` when the
    /// ticket is stale and the result must be ignored.
    pub fn completed(&self, ticket: &FetchTicket, result: Result<RepoPage>) -> Option<QueryState> {
        if ticket.generation != self.generation || !self.is_loading {
            return None;
        }

        let next = match result {
            Ok(page) => {
                let mut repositories = self.repositories.clone();
                repositories.extend(page.repositories);
                QueryState {
                    current_page: ticket.page + 1,
                    has_more: page.has_more,
                    is_loading: false,
                    repositories,
                    error: None,
                    ..self.clone()
                }
            }
            Err(e) if ticket.page == 1 => {
                warn!(username = %ticket.username, error = %e.detail(), "Error fetching repositories");
                QueryState {
                    has_more: false,
                    is_loading: false,
                    repositories: Vec::new(),
                    error: Some(e.to_string()),
                    ..self.clone()
                }
            }
            Err(e) => {
                // A failed "load more" just ends the list.
                warn!(
                    username = %ticket.username,
                    page = ticket.page,
                    error = %e.detail(),
                    "Error loading more repositories"
                );
                QueryState {
                    has_more: false,
                    is_loading: false,
                    ..self.clone()
                }
            }
        };
        Some(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The state was replaced with the result of the request.
    Updated,
    /// A request is already in flight; nothing was sent.
    Busy,
    /// The last page has been seen, or nothing was submitted yet.
    NothingMore,
    /// A newer submit overtook this request and its result was dropped.
    Stale,
}

/// Drives a [`QueryState`] against a [`RepoSource`].
///
/// The state lock is never held across a request, so a new submit can
/// replace the state while an older request is still in flight.
pub struct Session<S> {
    source: S,
    state: Mutex<QueryState>,
}

impl<S: RepoSource> Session<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(QueryState::default()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn state(&self) -> QueryState {
        self.state.lock().await.clone()
    }

    /// Starts over with `raw` and loads its first page. An invalid username
    /// is rejected before any request and leaves the state untouched.
    pub async fn submit(&self, raw: &str) -> Result<ActionOutcome> {
        let username = validate_username(raw)?;

        let ticket = {
            let mut state = self.state.lock().await;
            let (next, ticket) = state.submitted(username);
            *state = next;
            ticket
        };

        info!(username, generation = ticket.generation, "Fetching repositories");
        let result = self.source.fetch_page(&ticket.username, ticket.page).await;
        Ok(self.finish(ticket, result).await)
    }

    pub async fn load_more(&self) -> ActionOutcome {
        let ticket = {
            let mut state = self.state.lock().await;
            if state.is_loading {
                return ActionOutcome::Busy;
            }
            match state.load_more_requested() {
                Some((next, ticket)) => {
                    *state = next;
                    ticket
                }
                None => return ActionOutcome::NothingMore,
            }
        };

        debug!(username = %ticket.username, page = ticket.page, "Loading more repositories");
        let result = self.source.fetch_page(&ticket.username, ticket.page).await;
        self.finish(ticket, result).await
    }

    async fn finish(&self, ticket: FetchTicket, result: Result<RepoPage>) -> ActionOutcome {
        let mut state = self.state.lock().await;
        match state.completed(&ticket, result) {
            Some(next) => {
                *state = next;
                ActionOutcome::Updated
            }
            None => {
                debug!(
                    generation = ticket.generation,
                    current = state.generation,
                    "Discarding stale repository page"
                );
                ActionOutcome::Stale
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoListerError;

    fn repos(ids: std::ops::Range<u64>) -> Vec<Repository> {
        ids.map(|id| Repository {
            id,
            name: format!("repo-{id}"),
            description: None,
            language: None,
            star_count: 0,
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        })
        .collect()
    }

    #[test]
    fn default_state_is_idle() {
        let state = QueryState::default();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.current_page, 1);
        assert!(state.load_more_requested().is_none());
    }

    #[test]
    fn walks_through_pages_until_exhausted() {
        let (loading, first) = QueryState::default().submitted("octocat");
        assert_eq!(loading.phase(), Phase::Loading);

        let loaded = loading
            .completed(&first, Ok(RepoPage::new(1, repos(0..100))))
            .unwrap();
        assert_eq!(loaded.phase(), Phase::Loaded);
        assert_eq!(loaded.current_page, 2);

        let (more, second) = loaded.load_more_requested().unwrap();
        assert_eq!(more.phase(), Phase::LoadingMore);
        assert_eq!(second.page, 2);
        assert!(more.load_more_requested().is_none());

        let done = more
            .completed(&second, Ok(RepoPage::new(2, repos(100..130))))
            .unwrap();
        assert_eq!(done.phase(), Phase::Exhausted);
        assert_eq!(done.repositories.len(), 130);
        assert!(done.load_more_requested().is_none());
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let (first_state, first) = QueryState::default().submitted("alice");
        let (second_state, _second) = first_state.submitted("bob");

        assert!(second_state
            .completed(&first, Ok(RepoPage::new(1, repos(0..3))))
            .is_none());
    }

    #[test]
    fn submit_failure_clears_repositories() {
        let (loading, ticket) = QueryState::default().submitted("ghost");
        let failed = loading
            .completed(&ticket, Err(RepoListerError::fetch_failed("404")))
            .unwrap();

        assert_eq!(failed.phase(), Phase::Failed);
        assert_eq!(failed.error.as_deref(), Some("Failed to fetch repositories."));
        assert!(failed.repositories.is_empty());
    }

    #[test]
    fn load_more_failure_keeps_data() {
        let (loading, first) = QueryState::default().submitted("octocat");
        let loaded = loading
            .completed(&first, Ok(RepoPage::new(1, repos(0..100))))
            .unwrap();
        let (more, second) = loaded.load_more_requested().unwrap();
        let ended = more
            .completed(&second, Err(RepoListerError::fetch_failed("boom")))
            .unwrap();

        assert_eq!(ended.phase(), Phase::Exhausted);
        assert!(ended.error.is_none());
        assert_eq!(ended.repositories.len(), 100);
    }
}
