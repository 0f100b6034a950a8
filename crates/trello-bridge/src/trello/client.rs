//! Trello REST API client for webhook management.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{CreateWebhookForm, Webhook};
use crate::config::Config;
use crate::error::TrelloError;

/// Base URL for the Trello API.
pub const DEFAULT_API_BASE: &str = "https://api.trello.com/1";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Description attached to webhooks this service creates.
pub const WEBHOOK_DESCRIPTION: &str = "Discord Bot Webhook";

/// Trello API client authenticated with an API key and token.
#[derive(Clone)]
pub struct TrelloClient {
    /// HTTP client.
    client: Client,
    /// API key.
    api_key: String,
    /// API token.
    token: String,
    /// API base URL.
    api_base: String,
}

impl TrelloClient {
    /// Create a new Trello client.
    ///
    /// # Arguments
    /// * `api_key` - Trello API key
    /// * `token` - Trello token
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Result<Self, TrelloError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Create a client from bridge configuration.
    ///
    /// # Errors
    /// Returns [`TrelloError::NotConfigured`] if the key or token is missing.
    pub fn from_config(config: &Config) -> Result<Self, TrelloError> {
        let api_key = config
            .trello_api_key
            .as_deref()
            .ok_or(TrelloError::NotConfigured("TRELLO_API_KEY"))?;
        let token = config
            .trello_token
            .as_deref()
            .ok_or(TrelloError::NotConfigured("TRELLO_TOKEN"))?;

        Ok(Self::new(api_key, token)?.with_api_base(&config.trello_api_base))
    }

    /// Point the client at a different API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Register a webhook for a board.
    ///
    /// # Errors
    /// Returns error if Trello rejects the subscription (it probes the
    /// callback URL first) or the request fails.
    pub async fn create_webhook(
        &self,
        board_id: &str,
        callback_url: &str,
    ) -> Result<Webhook, TrelloError> {
        let url = format!("{}/webhooks", self.api_base);
        debug!(board_id = %board_id, callback_url = %callback_url, "Creating Trello webhook");

        let form = CreateWebhookForm {
            key: &self.api_key,
            token: &self.token,
            callback_url,
            id_model: board_id,
            description: WEBHOOK_DESCRIPTION,
        };

        let response = self.client.post(&url).form(&form).send().await?;
        Self::handle_response(response).await
    }

    /// List every webhook owned by the configured token.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_webhooks(&self) -> Result<Vec<Webhook>, TrelloError> {
        let url = format!("{}/tokens/{}/webhooks", self.api_base, self.token);
        debug!("Listing Trello webhooks");

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Delete a webhook.
    ///
    /// # Errors
    /// Returns error if Trello does not know the webhook or the request fails.
    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<(), TrelloError> {
        let url = format!("{}/webhooks/{webhook_id}", self.api_base);
        debug!(webhook_id = %webhook_id, "Deleting Trello webhook");

        let response = self
            .client
            .delete(&url)
            .query(&[("key", self.api_key.as_str()), ("token", self.token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(TrelloError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    /// Handle API response, parsing JSON or error.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, TrelloError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse Trello response");
                TrelloError::Serialization(e)
            })
        } else {
            Err(TrelloError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TrelloClient {
        TrelloClient::new("api-key", "api-token")
            .unwrap()
            .with_api_base(server.uri())
    }

    #[tokio::test]
    async fn test_create_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks"))
            .and(body_string_contains("idModel=board-1"))
            .and(body_string_contains("key=api-key"))
            .and(body_string_contains("token=api-token"))
            .and(body_string_contains(
                "callbackURL=https%3A%2F%2Fbridge.example.com%2Fwebhook",
            ))
            .and(body_string_contains("description=Discord+Bot+Webhook"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "wh-1",
                "idModel": "board-1",
                "callbackURL": "https://bridge.example.com/webhook",
                "description": "Discord Bot Webhook",
                "active": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let webhook = client(&server)
            .create_webhook("board-1", "https://bridge.example.com/webhook")
            .await
            .unwrap();

        assert_eq!(webhook.id, "wh-1");
        assert_eq!(webhook.id_model, "board-1");
        assert!(webhook.active);
    }

    #[tokio::test]
    async fn test_create_webhook_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid value for idModel"))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_webhook("nope", "https://bridge.example.com/webhook")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("invalid value for idModel"));
    }

    #[tokio::test]
    async fn test_list_webhooks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tokens/api-token/webhooks"))
            .and(query_param("key", "api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "wh-1", "idModel": "board-1" },
                { "id": "wh-2", "idModel": "board-2", "active": false }
            ])))
            .mount(&server)
            .await;

        let webhooks = client(&server).list_webhooks().await.unwrap();
        assert_eq!(webhooks.len(), 2);
        assert_eq!(webhooks[1].id_model, "board-2");
        assert!(!webhooks[1].active);
    }

    #[tokio::test]
    async fn test_delete_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/webhooks/wh-1"))
            .and(query_param("key", "api-key"))
            .and(query_param("token", "api-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_value": null})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).delete_webhook("wh-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/webhooks/wh-404"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let err = client(&server).delete_webhook("wh-404").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = Config::from_lookup(|_| None);
        assert!(matches!(
            TrelloClient::from_config(&config),
            Err(TrelloError::NotConfigured("TRELLO_API_KEY"))
        ));

        let config = Config::from_lookup(|key| (key == "TRELLO_API_KEY").then(|| "k".to_string()));
        assert!(matches!(
            TrelloClient::from_config(&config),
            Err(TrelloError::NotConfigured("TRELLO_TOKEN"))
        ));
    }
}
