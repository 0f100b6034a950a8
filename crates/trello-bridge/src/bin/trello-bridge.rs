//! Trello bridge binary.
//!
//! Runs the webhook service, or one of the administrative commands that
//! manage the Trello subscription.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notify::DiscordChannel;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trello_bridge::{commands, config::Config, server};

/// Relay Trello board events to a Discord channel.
#[derive(Parser)]
#[command(name = "trello-bridge")]
#[command(about = "Relay Trello board events to a Discord channel")]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server (default).
    Serve,

    /// Register a Trello webhook for a board, calling back to `WEBHOOK_URL`.
    SetupWebhook {
        /// Trello board ID.
        board_id: String,
    },

    /// List active Trello webhooks.
    ListWebhooks,

    /// Delete a Trello webhook.
    DeleteWebhook {
        /// Webhook ID (from `list-webhooks`).
        webhook_id: String,
    },

    /// Send a test message to the configured Discord channel.
    TestChannel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter(rust_log.as_deref(), cli.verbose))
        .init();

    // Load configuration
    let config = Config::from_env();

    let reply = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => return serve(config).await,
        Commands::SetupWebhook { board_id } => commands::setup_webhook(&config, &board_id).await,
        Commands::ListWebhooks => commands::list_webhooks(&config).await,
        Commands::DeleteWebhook { webhook_id } => {
            commands::delete_webhook(&config, &webhook_id).await
        }
        Commands::TestChannel => commands::test_channel(&config).await,
    };

    println!("{reply}");
    Ok(())
}

/// `RUST_LOG` wins when set and valid; otherwise both crates log at the CLI level.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(format!("trello_bridge={level},notify={level}")))
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Trello bridge...");

    if config.verifies_signatures() {
        info!("Webhook signature verification enabled");
    } else {
        warn!("TRELLO_WEBHOOK_SECRET not set - webhook signatures will not be verified");
    }

    if config.discord_channel_id == 0 {
        error!("DISCORD_CHANNEL_ID is not set. Notifications cannot be delivered.");
    }

    let discord = DiscordChannel::new(config.discord_token.clone())
        .context("Failed to create Discord client")?
        .with_api_base(&config.discord_api_base);

    // Non-fatal - the webhook endpoint still answers Trello
    match discord.current_user().await {
        Ok(user) => info!(user = %user, "Connected to Discord"),
        Err(e) => error!(error = %e, "Could not authenticate with Discord"),
    }

    let state = server::AppState::new(config, Arc::new(discord));
    server::run_server(state).await
}
