//! HTTP server for Trello webhooks.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use notify::NotifyChannel;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::format::format_event;
use crate::webhooks::{verify_webhook_signature, TrelloEvent, WebhookHeaders};

/// Body returned by the health check.
pub const HEALTH_BODY: &str = "Bot is running!";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Arc<Config>,
    /// Chat channel notifications are delivered to.
    pub channel: Arc<dyn NotifyChannel>,
}

impl AppState {
    /// Bundle configuration and a delivery channel.
    pub fn new(config: Config, channel: Arc<dyn NotifyChannel>) -> Self {
        Self {
            config: Arc::new(config),
            channel,
        }
    }
}

/// Build the HTTP router for the bridge.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Trello probes the callback with HEAD before accepting a subscription
        .route("/webhook", post(trello_webhook_handler).head(webhook_probe))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `0.0.0.0:<port>` and serve until the process stops.
///
/// # Errors
///
/// Returns an error if the server fails to bind or stops unexpectedly.
pub async fn run_server(state: AppState) -> Result<()> {
    let port = state.config.port;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, stopping webhook server");
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    HEALTH_BODY
}

/// Callback probe endpoint.
async fn webhook_probe() -> StatusCode {
    StatusCode::OK
}

/// Handle incoming Trello webhooks.
///
/// This handler:
/// 1. Verifies the webhook signature (if a secret is configured)
/// 2. Decodes the JSON body
/// 3. Classifies the action and, for actionable kinds, posts a notification
///
/// Delivery failures are logged and still answered with 200.
pub async fn trello_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let webhook_headers = WebhookHeaders::from_header_map(|name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    });

    if !verify_webhook_signature(
        &body,
        webhook_headers.signature.as_deref(),
        state.config.webhook_secret.as_deref(),
    ) {
        info!(
            signature_present = webhook_headers.signature.is_some(),
            "Rejected Trello webhook with invalid signature"
        );
        return (StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, body_len = body.len(), "Failed to parse Trello webhook payload");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    let event = TrelloEvent::from_payload(&payload);
    process_event(&state, &event).await;

    (StatusCode::OK, "OK")
}

/// Route a decoded event to the chat channel.
async fn process_event(state: &AppState, event: &TrelloEvent) {
    let kind = event.kind();

    if !kind.is_actionable() {
        info!(
            kind = %kind,
            action_type = ?event.action_type(),
            "Ignoring non-actionable Trello event"
        );
        return;
    }

    let message = format_event(event);
    let channel_id = state.config.discord_channel_id;

    debug!(kind = %kind, title = %message.title, channel_id, "Delivering notification");

    match state.channel.send(channel_id, &message).await {
        Ok(()) => {
            info!(
                kind = %kind,
                channel = state.channel.name(),
                channel_id,
                "Notification delivered"
            );
        }
        Err(e) => {
            error!(
                kind = %kind,
                channel = state.channel.name(),
                channel_id,
                error = %e,
                "Failed to deliver notification"
            );
        }
    }
}
