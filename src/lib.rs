pub mod error;
pub mod export;
pub mod github;
pub mod models;
pub mod repl;
pub mod session;
pub mod table;
pub mod types;
pub mod username;

pub use error::{RepoListerError, Result};
pub use github::{GitHubClient, GitHubClientConfig, RepoSource};
pub use models::{RepoPage, Repository};
pub use session::{ActionOutcome, Phase, QueryState, Session};
