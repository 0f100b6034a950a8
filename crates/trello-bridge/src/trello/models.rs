//! Trello webhook API models.

use serde::{Deserialize, Serialize};

/// A webhook subscription registered with Trello.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    /// Webhook ID.
    pub id: String,
    /// ID of the watched model (board).
    pub id_model: String,
    /// URL Trello posts events to.
    #[serde(rename = "callbackURL", default)]
    pub callback_url: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether Trello is still delivering to this webhook.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Form body for creating a webhook.
#[derive(Debug, Serialize)]
pub(crate) struct CreateWebhookForm<'a> {
    pub key: &'a str,
    pub token: &'a str,
    #[serde(rename = "callbackURL")]
    pub callback_url: &'a str,
    #[serde(rename = "idModel")]
    pub id_model: &'a str,
    pub description: &'a str,
}
