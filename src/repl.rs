use std::path::PathBuf;

/// A line typed into the interactive front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Submit a username. The argument is kept verbatim, so stray
    /// whitespace reaches validation and is rejected there.
    User(String),
    More,
    Download(Option<PathBuf>),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  user <id>         list repositories for a GitHub user
  more              load the next page
  download [path]   save the list as CSV (default: repositories.csv)
  show              print the current list
  help              show this message
  quit              exit";

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let (word, rest) = match line.trim_start().split_once(' ') {
        Some((word, rest)) => (word, Some(rest).filter(|r| !r.trim().is_empty())),
        None => (line.trim(), None),
    };

    match (word, rest) {
        ("user" | "u", Some(name)) => Ok(ReplCommand::User(name.to_string())),
        ("user" | "u", None) => Err("usage: user <id>".to_string()),
        ("more" | "m", None) => Ok(ReplCommand::More),
        ("download" | "d", None) => Ok(ReplCommand::Download(None)),
        ("download" | "d", Some(path)) => Ok(ReplCommand::Download(Some(PathBuf::from(path.trim())))),
        ("show" | "s", None) => Ok(ReplCommand::Show),
        ("help" | "h" | "?", None) => Ok(ReplCommand::Help),
        ("quit" | "q" | "exit", None) => Ok(ReplCommand::Quit),
        _ => Err(format!("unknown command: {}", line.trim())),
    }
}
