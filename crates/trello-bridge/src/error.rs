//! Error types for Trello API calls.

use thiserror::Error;

/// Errors that can occur when talking to the Trello API.
#[derive(Error, Debug)]
pub enum TrelloError {
    /// HTTP request failed. The request URL is stripped, since it carries credentials.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required setting is missing.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for TrelloError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

impl TrelloError {
    /// HTTP status returned by Trello, if the failure came from an API response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
