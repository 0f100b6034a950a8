//! Configuration for the Trello bridge.

use std::env;

use notify::channels::discord::DEFAULT_API_BASE as DEFAULT_DISCORD_API_BASE;

use crate::trello::DEFAULT_API_BASE as DEFAULT_TRELLO_API_BASE;

/// Default HTTP listen port.
const DEFAULT_PORT: u16 = 8080;

/// Bridge configuration, read once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Discord bot token.
    pub discord_token: Option<String>,
    /// Discord channel that receives notifications (0 when unset).
    pub discord_channel_id: u64,
    /// Discord REST API base URL.
    pub discord_api_base: String,
    /// Trello API key.
    pub trello_api_key: Option<String>,
    /// Trello API token.
    pub trello_token: Option<String>,
    /// Trello REST API base URL.
    pub trello_api_base: String,
    /// Webhook signing secret; verification is skipped when unset.
    pub webhook_secret: Option<String>,
    /// Public base URL this service is reachable at.
    pub webhook_url: Option<String>,
}

impl Config {
    /// Read configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|s| !s.is_empty());

        Self {
            port: get("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            discord_token: get("DISCORD_TOKEN"),
            discord_channel_id: get("DISCORD_CHANNEL_ID")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
            discord_api_base: get("DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE.to_string()),
            trello_api_key: get("TRELLO_API_KEY"),
            trello_token: get("TRELLO_TOKEN"),
            trello_api_base: get("TRELLO_API_BASE")
                .unwrap_or_else(|| DEFAULT_TRELLO_API_BASE.to_string()),
            webhook_secret: get("TRELLO_WEBHOOK_SECRET"),
            webhook_url: get("WEBHOOK_URL"),
        }
    }

    /// The URL Trello should call back, i.e. `WEBHOOK_URL` + `/webhook`.
    #[must_use]
    pub fn callback_url(&self) -> Option<String> {
        self.webhook_url
            .as_deref()
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')))
    }

    /// Whether inbound webhook signatures are checked.
    #[must_use]
    pub const fn verifies_signatures(&self) -> bool {
        self.webhook_secret.is_some()
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("discord_token", &self.discord_token.as_ref().map(|_| "<set>"))
            .field("discord_channel_id", &self.discord_channel_id)
            .field("discord_api_base", &self.discord_api_base)
            .field("trello_api_key", &self.trello_api_key.as_ref().map(|_| "<set>"))
            .field("trello_token", &self.trello_token.as_ref().map(|_| "<set>"))
            .field("trello_api_base", &self.trello_api_base)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<set>"))
            .field("webhook_url", &self.webhook_url)
            .finish()
    }
}
