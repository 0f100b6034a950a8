//! Error types for chat delivery.

use thiserror::Error;

/// Errors that can occur when sending to a chat channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed (URL stripped)
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// Channel is not configured
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    /// The target channel does not exist or the bot cannot see it
    #[error("Channel {0} not found")]
    ChannelNotFound(u64),

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}
