//! Chat delivery for Trello board notifications.
//!
//! This crate owns the outbound side of the bridge: the
//! [`NotificationMessage`] model and the channels that post it.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{Color, DiscordChannel, NotificationMessage, NotifyChannel};
//!
//! # async fn example() -> Result<(), notify::ChannelError> {
//! let discord = DiscordChannel::new(Some("bot-token".to_string()))?;
//!
//! let message = NotificationMessage {
//!     title: "New Card Created".to_string(),
//!     description: "**Sprint Plan**".to_string(),
//!     color: Color::Success,
//!     timestamp: Some(chrono::Utc::now()),
//!     fields: vec![],
//! };
//! discord.send(123_456_789, &message).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for chat channels
//! - [`DiscordChannel`] implements it on top of the Discord REST API

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod message;

pub use channels::discord::DiscordChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;
pub use message::{Color, Field, NotificationMessage};
