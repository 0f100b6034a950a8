//! Chat channel implementations.

pub mod discord;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::message::NotificationMessage;

/// Trait for chat channels that accept notification messages.
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Post a notification to the given channel. Called once per event, never retried.
    async fn send(
        &self,
        channel_id: u64,
        message: &NotificationMessage,
    ) -> Result<(), ChannelError>;
}
