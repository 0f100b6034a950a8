//! Trello to Discord bridge.
//!
//! This crate provides:
//! - Webhook signature verification and tolerant payload parsing
//! - Classification of Trello actions into a closed set of event kinds
//! - Formatting of events into chat notifications
//! - HTTP server for webhook handling (standalone service)
//! - Trello API client and administrative commands for webhook management

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Many async API methods can fail

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod server;
pub mod trello;
pub mod webhooks;

pub use config::Config;
pub use error::TrelloError;
pub use events::{classify, EventKind};
pub use format::format_event;
pub use trello::TrelloClient;
pub use webhooks::{verify_webhook_signature, TrelloEvent};
