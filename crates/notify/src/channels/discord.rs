//! Discord bot channel, posting through the Discord REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::NotifyChannel;
use crate::error::ChannelError;
use crate::message::{Field, NotificationMessage};

/// Default base URL for the Discord REST API.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fallback wait when a 429 carries no usable `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Discord channel authenticated with a bot token.
#[derive(Clone)]
pub struct DiscordChannel {
    token: Option<String>,
    api_base: String,
    client: Client,
}

impl DiscordChannel {
    /// Create a Discord channel for the given bot token.
    ///
    /// A missing token leaves the channel disabled; every send then fails
    /// with [`ChannelError::NotConfigured`].
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(token: Option<String>) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        if token.is_some() {
            debug!("Discord delivery enabled");
        } else {
            debug!("Discord delivery disabled (DISCORD_TOKEN not set)");
        }

        Ok(Self {
            token,
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        })
    }

    /// Point the channel at a different API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Post a plain text message to a channel.
    ///
    /// # Errors
    /// Returns error if the channel is unknown or the request fails.
    pub async fn send_text(&self, channel_id: u64, text: &str) -> Result<(), ChannelError> {
        let payload = DiscordPayload {
            content: Some(text.to_string()),
            embeds: vec![],
        };
        self.post_message(channel_id, &payload).await
    }

    /// Fetch the display name of a channel.
    ///
    /// # Errors
    /// Returns [`ChannelError::ChannelNotFound`] if Discord does not know the channel.
    pub async fn channel_name(&self, channel_id: u64) -> Result<String, ChannelError> {
        let token = self.token(channel_id)?;
        let url = format!("{}/channels/{channel_id}", self.api_base);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bot {token}"))
            .send()
            .await?;

        let channel: DiscordChannelInfo = Self::check(response, Some(channel_id))
            .await?
            .json()
            .await?;

        Ok(channel.name.unwrap_or_else(|| channel_id.to_string()))
    }

    /// Fetch the username the bot token belongs to.
    ///
    /// # Errors
    /// Returns error if the token is missing or rejected.
    pub async fn current_user(&self) -> Result<String, ChannelError> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| ChannelError::NotConfigured("DISCORD_TOKEN".to_string()))?;
        let url = format!("{}/users/@me", self.api_base);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bot {token}"))
            .send()
            .await?;

        let user: DiscordUser = Self::check(response, None).await?.json().await?;
        Ok(user.username)
    }

    /// Format a notification as a Discord message payload.
    fn format_payload(message: &NotificationMessage) -> DiscordPayload {
        let embed = DiscordEmbed {
            title: message.title.clone(),
            description: message.description.clone(),
            color: message.color.rgb(),
            timestamp: message.timestamp.map(|ts| ts.to_rfc3339()),
            fields: message.fields.iter().map(DiscordField::from).collect(),
        };

        DiscordPayload {
            content: None,
            embeds: vec![embed],
        }
    }

    fn token(&self, channel_id: u64) -> Result<&str, ChannelError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ChannelError::NotConfigured("DISCORD_TOKEN".to_string()))?;
        if channel_id == 0 {
            return Err(ChannelError::NotConfigured(
                "DISCORD_CHANNEL_ID".to_string(),
            ));
        }
        Ok(token)
    }

    async fn post_message(
        &self,
        channel_id: u64,
        payload: &DiscordPayload,
    ) -> Result<(), ChannelError> {
        let token = self.token(channel_id)?;
        let url = format!("{}/channels/{channel_id}/messages", self.api_base);
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {token}"))
            .json(payload)
            .send()
            .await?;

        Self::check(response, Some(channel_id)).await?;
        debug!(channel = "discord", channel_id, "Message posted");
        Ok(())
    }

    /// Map a non-success response to a [`ChannelError`].
    async fn check(response: Response, channel_id: Option<u64>) -> Result<Response, ChannelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = channel_id {
                return Err(ChannelError::ChannelNotFound(id));
            }
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            // Discord sends fractional seconds
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok())
                .map_or(DEFAULT_RETRY_AFTER_SECS, |secs| secs.ceil() as u64);

            warn!(
                channel = "discord",
                retry_after_secs = retry_after,
                "Rate limited by Discord"
            );

            return Err(ChannelError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            channel = "discord",
            status = %status,
            body = %body,
            "Discord request failed"
        );

        Err(ChannelError::Other(format!(
            "Discord returned {status}: {body}"
        )))
    }
}

#[async_trait]
impl NotifyChannel for DiscordChannel {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn enabled(&self) -> bool {
        self.token.is_some()
    }

    async fn send(
        &self,
        channel_id: u64,
        message: &NotificationMessage,
    ) -> Result<(), ChannelError> {
        debug!(channel = "discord", title = %message.title, "Sending notification");
        let payload = Self::format_payload(message);
        self.post_message(channel_id, &payload).await
    }
}

// =============================================================================
// Discord API types
// =============================================================================

#[derive(Debug, Serialize)]
struct DiscordPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<DiscordField>,
}

#[derive(Debug, Serialize)]
struct DiscordField {
    name: String,
    value: String,
    inline: bool,
}

impl From<&Field> for DiscordField {
    fn from(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            value: field.value.clone(),
            inline: field.inline,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiscordChannelInfo {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Color;
    use chrono::TimeZone;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_message() -> NotificationMessage {
        NotificationMessage {
            title: "New Card Created".to_string(),
            description: "**Sprint Plan**".to_string(),
            color: Color::Success,
            timestamp: Some(chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
            fields: vec![Field::inline("List", "Backlog")],
        }
    }

    fn channel(server: &MockServer) -> DiscordChannel {
        DiscordChannel::new(Some("bot-token".to_string()))
            .unwrap()
            .with_api_base(server.uri())
    }

    #[test]
    fn test_format_payload() {
        let payload = DiscordChannel::format_payload(&sample_message());
        let json = serde_json::to_value(&payload).unwrap();

        assert!(json.get("content").is_none());
        let embed = &json["embeds"][0];
        assert_eq!(embed["title"], "New Card Created");
        assert_eq!(embed["color"], 0x00ff00);
        assert_eq!(embed["timestamp"], "2024-01-15T10:30:00+00:00");
        assert_eq!(embed["fields"][0]["name"], "List");
        assert_eq!(embed["fields"][0]["inline"], true);
    }

    #[test]
    fn test_format_payload_without_timestamp() {
        let mut message = sample_message();
        message.timestamp = None;
        let json = serde_json::to_value(DiscordChannel::format_payload(&message)).unwrap();
        assert!(json["embeds"][0].get("timestamp").is_none());
    }

    #[tokio::test]
    async fn test_send_posts_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .and(header("authorization", "Bot bot-token"))
            .and(body_partial_json(serde_json::json!({
                "embeds": [{ "title": "New Card Created" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        channel(&server).send(42, &sample_message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_unknown_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = channel(&server).send(42, &sample_message()).await.unwrap_err();
        assert!(matches!(err, ChannelError::ChannelNotFound(42)));
    }

    #[tokio::test]
    async fn test_send_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/42/messages"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1.5"))
            .mount(&server)
            .await;

        let err = channel(&server).send(42, &sample_message()).await.unwrap_err();
        assert!(matches!(
            err,
            ChannelError::RateLimited {
                retry_after_secs: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_hides_url() {
        let channel = DiscordChannel::new(Some("bot-token".to_string()))
            .unwrap()
            .with_api_base("http://127.0.0.1:1");

        let err = channel.send(42, &sample_message()).await.unwrap_err();
        assert!(matches!(err, ChannelError::Http(_)));
        let text = err.to_string();
        assert!(!text.contains("127.0.0.1"), "{text}");
        assert!(!text.contains("/channels/42"), "{text}");
    }

    #[tokio::test]
    async fn test_send_without_token() {
        let channel = DiscordChannel::new(None).unwrap();
        assert!(!channel.enabled());
        let err = channel.send(42, &sample_message()).await.unwrap_err();
        assert!(matches!(err, ChannelError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_send_without_channel_id() {
        let channel = DiscordChannel::new(Some("bot-token".to_string())).unwrap();
        let err = channel.send(0, &sample_message()).await.unwrap_err();
        assert!(matches!(err, ChannelError::NotConfigured(ref v) if v == "DISCORD_CHANNEL_ID"));
    }

    #[tokio::test]
    async fn test_send_text_and_channel_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/7/messages"))
            .and(body_partial_json(serde_json::json!({ "content": "hello" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/channels/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "7", "name": "trello-feed"})),
            )
            .mount(&server)
            .await;

        let channel = channel(&server);
        channel.send_text(7, "hello").await.unwrap();
        assert_eq!(channel.channel_name(7).await.unwrap(), "trello-feed");
    }

    #[tokio::test]
    async fn test_current_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "1", "username": "trello-bot"})),
            )
            .mount(&server)
            .await;

        assert_eq!(channel(&server).current_user().await.unwrap(), "trello-bot");
    }
}
