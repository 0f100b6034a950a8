//! Trello integration.
//!
//! Provides the REST client used by the administrative commands to manage
//! webhook subscriptions. Inbound webhook payloads live in [`crate::webhooks`].
//!
//! # Example
//!
//! ```no_run
//! use trello_bridge::trello::TrelloClient;
//!
//! # async fn example() -> Result<(), trello_bridge::TrelloError> {
//! let client = TrelloClient::new("api-key", "token")?;
//! let webhook = client
//!     .create_webhook("board-id", "https://bridge.example.com/webhook")
//!     .await?;
//! println!("Created {}", webhook.id);
//! # Ok(())
//! # }
//! ```

mod client;
mod models;

pub use client::{TrelloClient, DEFAULT_API_BASE, WEBHOOK_DESCRIPTION};
pub use models::Webhook;
