//! Local validation of GitHub user IDs.
//!
//! A valid ID is one or more ASCII alphanumeric segments joined by single
//! hyphens: no leading, trailing or doubled hyphen and no whitespace.

use crate::error::{RepoListerError, Result};

pub fn is_valid_username(input: &str) -> bool {
    !input.is_empty()
        && input
            .split('-')
            .all(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Returns the username unchanged if it is valid.
pub fn validate_username(input: &str) -> Result<&str> {
    if is_valid_username(input) {
        Ok(input)
    } else {
        Err(RepoListerError::InvalidUsername(input.to_string()))
    }
}
