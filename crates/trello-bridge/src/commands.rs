//! Administrative commands for managing the Trello subscription.
//!
//! Every command resolves to a human-readable reply. Failures are part of the
//! reply, never a panic or an error return, so the operator always sees what
//! Trello or Discord said.

use notify::{ChannelError, DiscordChannel};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::TrelloError;
use crate::trello::{TrelloClient, Webhook};

/// Text posted by [`test_channel`].
pub const TEST_MESSAGE: &str = "🧪 Test message from Trello bot!";

/// Register a Trello webhook for `board_id` pointing at this service.
pub async fn setup_webhook(config: &Config, board_id: &str) -> String {
    match create_webhook(config, board_id).await {
        Ok(webhook) => {
            info!(webhook_id = %webhook.id, board_id = %board_id, "Trello webhook created");
            format!("✅ Webhook created successfully! ID: {}", webhook.id)
        }
        Err(e) => {
            warn!(board_id = %board_id, error = %e, "Failed to create Trello webhook");
            failure_reply("create webhook", &e)
        }
    }
}

/// List the webhooks owned by the configured Trello token.
pub async fn list_webhooks(config: &Config) -> String {
    let result = match TrelloClient::from_config(config) {
        Ok(client) => client.list_webhooks().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(webhooks) if webhooks.is_empty() => "📋 No webhooks found.".to_string(),
        Ok(webhooks) => format!("📋 Active webhooks:\n```{}```", render_webhooks(&webhooks)),
        Err(e) => {
            warn!(error = %e, "Failed to list Trello webhooks");
            failure_reply("fetch webhooks", &e)
        }
    }
}

/// Delete a Trello webhook by ID.
pub async fn delete_webhook(config: &Config, webhook_id: &str) -> String {
    let result = match TrelloClient::from_config(config) {
        Ok(client) => client.delete_webhook(webhook_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            info!(webhook_id = %webhook_id, "Trello webhook deleted");
            format!("✅ Webhook {webhook_id} deleted successfully!")
        }
        Err(e) => {
            warn!(webhook_id = %webhook_id, error = %e, "Failed to delete Trello webhook");
            failure_reply("delete webhook", &e)
        }
    }
}

/// Post a test message to the configured Discord channel.
pub async fn test_channel(config: &Config) -> String {
    let channel_id = config.discord_channel_id;
    let discord = match DiscordChannel::new(config.discord_token.clone()) {
        Ok(discord) => discord.with_api_base(&config.discord_api_base),
        Err(e) => return format!("❌ Error: {e}"),
    };

    let name = match discord.channel_name(channel_id).await {
        Ok(name) => name,
        Err(ChannelError::ChannelNotFound(_)) => return channel_not_found(channel_id),
        Err(_) if channel_id == 0 => return channel_not_found(channel_id),
        Err(e) => return format!("❌ Error: {e}"),
    };

    match discord.send_text(channel_id, TEST_MESSAGE).await {
        Ok(()) => format!("✅ Test message sent to {name}"),
        Err(e) => {
            warn!(channel_id, error = %e, "Failed to send test message");
            format!("❌ Error: {e}")
        }
    }
}

async fn create_webhook(config: &Config, board_id: &str) -> Result<Webhook, TrelloError> {
    let callback_url = config
        .callback_url()
        .ok_or(TrelloError::NotConfigured("WEBHOOK_URL"))?;
    let client = TrelloClient::from_config(config)?;
    client.create_webhook(board_id, &callback_url).await
}

fn render_webhooks(webhooks: &[Webhook]) -> String {
    webhooks
        .iter()
        .map(|w| format!("ID: {}, Board: {}", w.id, w.id_model))
        .collect::<Vec<_>>()
        .join("\n")
}

fn failure_reply(what: &str, error: &TrelloError) -> String {
    match error.status() {
        Some(status) => format!("❌ Failed to {what}. Status: {status}"),
        None => format!("❌ Error: {error}"),
    }
}

fn channel_not_found(channel_id: u64) -> String {
    format!("❌ Channel with ID {channel_id} not found")
}
