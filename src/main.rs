mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use repo_lister::export::{save_csv, CSV_FILE_NAME};
use repo_lister::github::{fetch_all, GitHubClient, RepoSource};
use repo_lister::repl::{parse_command, ReplCommand, HELP};
use repo_lister::table::{render_state, render_table};
use repo_lister::{ActionOutcome, RepoListerError, Session};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Logs go to stderr so they never mix with the table output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = GitHubClient::with_config(cli.client_config())
        .context("Failed to create GitHub client")?;

    match cli.command {
        Commands::List { username, all } => list(&client, &username, all).await,
        Commands::Export { username, output } => export(&client, &username, &output).await,
        Commands::Interactive => interactive(client).await,
    }
}

async fn list(client: &GitHubClient, username: &str, all: bool) -> anyhow::Result<()> {
    let result = if all {
        fetch_all(client, username).await
    } else {
        client.fetch_page(username, 1).await.map(|page| {
            if page.has_more {
                println!("{}", "Showing the first page only, pass --all for everything".dimmed());
            }
            page.repositories
        })
    };

    let repositories = result.map_err(|e| field_error(username, e))?;
    if repositories.is_empty() {
        println!("{} has no public repositories", username.bold());
        return Ok(());
    }

    print!("{}", render_table(&repositories));
    println!("{}", format!("{} repositories", repositories.len()).green());
    Ok(())
}

async fn export(client: &GitHubClient, username: &str, output: &Path) -> anyhow::Result<()> {
    println!("🔍 Fetching repositories for {}...", username.bold());
    let repositories = fetch_all(client, username)
        .await
        .map_err(|e| field_error(username, e))?;

    save_csv(output, &repositories)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "✅ Saved {} repositories to {}",
        repositories.len(),
        output.display()
    );
    Ok(())
}

async fn interactive(client: GitHubClient) -> anyhow::Result<()> {
    let session = Session::new(client);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", "Show me Repos".bold().cyan());
    println!("{}\n", HELP.dimmed());

    loop {
        print!("{} ", ">".cyan());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message.yellow());
                continue;
            }
        };

        match command {
            ReplCommand::User(name) => match session.submit(&name).await {
                Ok(_) => print!("{}", render_state(&session.state().await)),
                Err(e) => println!("{}: {}", name.bold(), e.to_string().red()),
            },
            ReplCommand::More => match session.load_more().await {
                ActionOutcome::Busy => println!("{}", "Still loading...".yellow()),
                ActionOutcome::NothingMore => println!("{}", "No more repositories to load".dimmed()),
                ActionOutcome::Updated | ActionOutcome::Stale => {
                    print!("{}", render_state(&session.state().await))
                }
            },
            ReplCommand::Download(path) => {
                let state = session.state().await;
                if state.repositories.is_empty() {
                    println!("{}", "Nothing to download yet".dimmed());
                    continue;
                }
                let path = path.unwrap_or_else(|| PathBuf::from(CSV_FILE_NAME));
                match save_csv(&path, &state.repositories).await {
                    Ok(()) => println!(
                        "✅ Saved {} repositories to {}",
                        state.repositories.len(),
                        path.display()
                    ),
                    Err(e) => println!("{}", format!("Could not save {}: {}", path.display(), e).red()),
                }
            }
            ReplCommand::Show => print!("{}", render_state(&session.state().await)),
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
        }
    }

    Ok(())
}

/// Shows the error next to the username, the way the form does.
fn field_error(username: &str, err: RepoListerError) -> anyhow::Error {
    if err.is_fetch_error() {
        tracing::error!(username, error = %err.detail(), "Error fetching repositories");
    }
    anyhow::anyhow!("{}: {}", username, err)
}
