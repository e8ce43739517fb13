use crate::export::CSV_HEADER;
use crate::models::Repository;
use crate::session::{Phase, QueryState};
use colored::*;

const DESCRIPTION_WIDTH: usize = 48;

/// Plain-text table of repositories, one per line, in list order.
pub fn render_table(repositories: &[Repository]) -> String {
    let rows: Vec<[String; 5]> = repositories
        .iter()
        .map(|repo| {
            [
                repo.name.clone(),
                truncate(repo.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
                repo.language.clone().unwrap_or_default(),
                repo.star_count.to_string(),
                repo.updated_at_parsed()
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| repo.updated_at.clone()),
            ]
        })
        .collect();

    let mut widths = CSV_HEADER.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &CSV_HEADER.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            let pad = width.saturating_sub(cell.chars().count());
            // Stars column is right-aligned.
            if i == 3 {
                format!("{}{}", " ".repeat(pad), cell)
            } else {
                format!("{}{}", cell, " ".repeat(pad))
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace(['\r', '\n'], " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let mut cut: String = single_line.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Status line plus table for the current session state.
pub fn render_state(state: &QueryState) -> String {
    let mut out = String::new();

    match state.phase() {
        Phase::Idle => {
            out.push_str(&format!("{}\n", "Enter a GitHub user ID with `user <id>`".dimmed()));
            return out;
        }
        Phase::Loading => {
            out.push_str(&format!("⏳ Loading repositories for {}...\n", state.username.bold()));
            return out;
        }
        Phase::Failed => {
            let message = state.error.as_deref().unwrap_or_default();
            out.push_str(&format!("{}: {}\n", state.username.bold(), message.red()));
            return out;
        }
        Phase::Loaded | Phase::LoadingMore | Phase::Exhausted => {}
    }

    if state.repositories.is_empty() {
        out.push_str(&format!("{} has no public repositories\n", state.username.bold()));
        return out;
    }

    out.push_str(&render_table(&state.repositories));
    let footer = format!(
        "{} repositories for {}",
        state.repositories.len(),
        state.username
    );
    let hint = match state.phase() {
        Phase::Loaded => " (type `more` to load the next page)",
        Phase::LoadingMore => " (loading more...)",
        _ => "",
    };
    out.push_str(&format!("{}{}\n", footer.green(), hint.dimmed()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, description: Option<&str>, stars: u32) -> Repository {
        Repository {
            id: 1,
            name: name.to_string(),
            description: description.map(str::to_string),
            language: Some("Rust".to_string()),
            star_count: stars,
            updated_at: "2024-02-03T04:05:06Z".to_string(),
        }
    }

    #[test]
    fn renders_header_and_rows() {
        let table = render_table(&[repo("alpha", Some("first"), 5), repo("b", None, 1234)]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[0].contains("Description"));
        assert!(lines[2].starts_with("alpha"));
        assert!(lines[2].contains("2024-02-03"));
        assert!(lines[3].contains("1234"));
    }

    #[test]
    fn long_descriptions_are_cut() {
        let long = "x".repeat(200);
        let table = render_table(&[repo("a", Some(&long), 0)]);
        assert!(table.contains('…'));
        assert!(!table.contains(&long));
    }

    #[test]
    fn failed_state_shows_error_next_to_username() {
        colored::control::set_override(false);
        let state = QueryState {
            username: "ghost".to_string(),
            error: Some("Failed to fetch repositories.".to_string()),
            ..Default::default()
        };
        assert_eq!(render_state(&state), "ghost: Failed to fetch repositories.\n");
    }
}
