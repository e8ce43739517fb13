use clap::{Parser, Subcommand};
use repo_lister::github::{GitHubClientConfig, API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "repo-lister")]
#[command(about = "Lists a GitHub user's repositories and exports them as CSV")]
#[command(version)]
pub struct Cli {
    /// GitHub token, raises the API rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = API_BASE_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a user's repositories as a table
    List {
        username: String,
        /// Fetch every page instead of just the first
        #[arg(long)]
        all: bool,
    },
    /// Fetch every page and save it as CSV
    Export {
        username: String,
        #[arg(short, long, default_value = repo_lister::export::CSV_FILE_NAME)]
        output: PathBuf,
    },
    /// Browse page by page: `user`, `more`, `download`
    Interactive,
}

impl Cli {
    pub fn client_config(&self) -> GitHubClientConfig {
        GitHubClientConfig {
            base_url: self.api_url.clone(),
            token: self.token.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
