use thiserror::Error;

/// Message shown to the user for every failed page fetch.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch repositories.";

/// Message shown next to the username field when it does not validate.
pub const INVALID_USERNAME_MESSAGE: &str = "Please write a valid ID";

#[derive(Error, Debug)]
pub enum RepoListerError {
    #[error("Please write a valid ID")]
    InvalidUsername(String),

    /// Non-success status, network failure or undecodable body. The detail
    /// is for logs; the user only ever sees [`FETCH_FAILED_MESSAGE`].
    #[error("Failed to fetch repositories.")]
    FetchFailed { detail: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RepoListerError {
    pub fn fetch_failed(detail: impl Into<String>) -> Self {
        RepoListerError::FetchFailed {
            detail: detail.into(),
        }
    }

    /// Underlying cause, suitable for logging.
    pub fn detail(&self) -> String {
        match self {
            RepoListerError::FetchFailed { detail } => detail.clone(),
            RepoListerError::InvalidUsername(username) => {
                format!("invalid username {:?}", username)
            }
            other => other.to_string(),
        }
    }

    pub fn is_fetch_error(&self) -> bool {
        matches!(self, RepoListerError::FetchFailed { .. })
    }
}

impl From<reqwest::Error> for RepoListerError {
    fn from(err: reqwest::Error) -> Self {
        RepoListerError::fetch_failed(format!("network error: {}", err))
    }
}

impl From<serde_json::Error> for RepoListerError {
    fn from(err: serde_json::Error) -> Self {
        RepoListerError::fetch_failed(format!("JSON parsing error: {}", err))
    }
}

impl From<url::ParseError> for RepoListerError {
    fn from(err: url::ParseError) -> Self {
        RepoListerError::ConfigError(format!("invalid URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, RepoListerError>;
