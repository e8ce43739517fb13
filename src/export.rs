//! CSV export of repository lists.
//!
//! Formatting is pure; [`save_csv`] is the only function that touches the
//! filesystem.

use crate::error::{RepoListerError, Result};
use crate::models::Repository;
use std::path::Path;
use tracing::info;

pub const CSV_FILE_NAME: &str = "repositories.csv";
pub const CSV_MIME_TYPE: &str = "text/csv";
pub const CSV_HEADER: [&str; 5] = ["Name", "Description", "Language", "Stars", "Updated"];

/// Renders the header row and one row per repository. Every field is
/// quoted, embedded quotes are doubled and missing description or
/// language become empty fields.
pub fn to_csv(repositories: &[Repository]) -> String {
    let mut out = String::new();
    write_row(&mut out, CSV_HEADER);

    for repo in repositories {
        let stars = repo.star_count.to_string();
        write_row(
            &mut out,
            [
                repo.name.as_str(),
                repo.description.as_deref().unwrap_or(""),
                repo.language.as_deref().unwrap_or(""),
                stars.as_str(),
                repo.updated_at.as_str(),
            ],
        );
    }

    out
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}

/// Reads RFC 4180 text back into rows of fields. Accepts quoted and bare
/// fields, doubled quotes, embedded separators and `\r\n` line endings.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            '"' => {
                return Err(RepoListerError::CsvError(format!(
                    "unexpected quote in row {}",
                    rows.len() + 1
                )))
            }
            _ if quoted && !matches!(c, ',' | '\n' | '\r') => {
                return Err(RepoListerError::CsvError(format!(
                    "text after closing quote in row {}",
                    rows.len() + 1
                )))
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RepoListerError::CsvError("unterminated quoted field".into()));
    }
    if quoted || !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

/// Writes the CSV for `repositories` to `path` as UTF-8.
pub async fn save_csv(path: impl AsRef<Path>, repositories: &[Repository]) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, to_csv(repositories).as_bytes()).await?;
    info!(path = %path.display(), rows = repositories.len(), "Saved CSV export");
    Ok(())
}
