//! Trello webhook payload parsing and signature verification.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::events::{classify, EventKind};

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-trello-webhook";

/// Compute the hex-encoded HMAC-SHA1 of a body.
///
/// Returns `None` if the MAC cannot be keyed with `secret`.
#[must_use]
pub fn compute_signature(body: &[u8], secret: &str) -> Option<String> {
    let Ok(mut mac) = HmacSha1::new_from_slice(secret.as_bytes()) else {
        return None;
    };
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a Trello webhook signature using HMAC-SHA1.
///
/// # Arguments
/// * `body` - Raw, unparsed webhook body bytes
/// * `signature` - Hex-encoded signature from the `X-Trello-Webhook` header
/// * `secret` - Webhook signing secret
///
/// # Returns
/// `true` if no secret is configured (verification disabled) or the signature
/// matches exactly, `false` otherwise
#[must_use]
pub fn verify_webhook_signature(
    body: &[u8],
    signature: Option<&str>,
    secret: Option<&str>,
) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return true;
    };

    let Some(signature) = signature else {
        return false;
    };

    let Some(expected) = compute_signature(body, secret) else {
        return false;
    };

    // Constant-time comparison to prevent timing attacks
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// A decoded Trello action.
///
/// Wraps the `action` object of a webhook body. Every accessor tolerates a
/// missing or mistyped field by returning `None`, so sparse and malformed
/// payloads still flow through classification and formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct TrelloEvent {
    action: Value,
}

impl TrelloEvent {
    /// Extract the action from a full webhook body.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        Self::from_action(payload.get("action").cloned().unwrap_or(Value::Null))
    }

    /// Wrap an already-extracted action object.
    #[must_use]
    pub const fn from_action(action: Value) -> Self {
        Self { action }
    }

    /// The raw action type tag (e.g. `createCard`).
    #[must_use]
    pub fn action_type(&self) -> Option<&str> {
        self.action.get("type").and_then(Value::as_str)
    }

    /// Classify this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        classify(self.action_type())
    }

    /// ISO-8601 timestamp of the action.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.action.get("date").and_then(Value::as_str)
    }

    /// Full name of the member who triggered the action.
    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        self.action
            .get("memberCreator")
            .and_then(|m| m.get("fullName"))
            .and_then(Value::as_str)
    }

    /// Name of the card the action touched.
    #[must_use]
    pub fn card_name(&self) -> Option<&str> {
        self.data_str(&["card", "name"])
    }

    /// Name of the list the card lives in.
    #[must_use]
    pub fn list_name(&self) -> Option<&str> {
        self.data_str(&["list", "name"])
    }

    /// Comment body for `commentCard` actions.
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        self.data_str(&["text"])
    }

    /// Previous value of a card attribute for `updateCard` actions.
    ///
    /// Present (possibly `null`) only when Trello reports the key as changed.
    #[must_use]
    pub fn old_value(&self, key: &str) -> Option<&Value> {
        self.data().and_then(|d| d.get("old")).and_then(|o| o.get(key))
    }

    fn data(&self) -> Option<&Value> {
        self.action.get("data")
    }

    fn data_str(&self, path: &[&str]) -> Option<&str> {
        path.iter()
            .try_fold(self.data()?, |value, key| value.get(*key))
            .and_then(Value::as_str)
    }
}

/// Parsed webhook headers
#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    /// HMAC signature
    pub signature: Option<String>,
}

impl WebhookHeaders {
    /// Parse headers from a request
    #[must_use]
    pub fn from_header_map(get_header: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            signature: get_header(SIGNATURE_HEADER),
        }
    }
}
