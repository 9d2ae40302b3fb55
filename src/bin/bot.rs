//! Memosync bot binary.
//!
//! Bootstraps the note repository exactly once, starts the liveness
//! endpoint, then polls the configured Discord channel for messages to
//! capture.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use memosync::api;
use memosync::config::{Config, ConfigError};
use memosync::listener::{ChatApi, ChatError, DiscordApi, MessageHandler};
use memosync::notes::NoteStore;
use memosync::sync::{RealGit, RemoteSpec, SyncManager};
use miette::Diagnostic;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(memosync::binary::config))]
    Config(#[from] ConfigError),

    #[error("Chat API error: {0}")]
    #[diagnostic(code(memosync::binary::chat))]
    Chat(#[from] ChatError),
}

#[derive(Parser)]
#[command(name = "memosync")]
#[command(author, version, about = "Discord-to-git memo bot", long_about = None)]
struct Cli {
    /// Host address for the liveness endpoint
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the liveness endpoint (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Data directory (defaults to XDG data directory: ~/.local/share/memosync)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// Initialize tracing subscriber with env filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memosync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let work_dir = config.work_dir();
    let manager = SyncManager::new(
        RealGit::new(),
        work_dir.clone(),
        RemoteSpec {
            url: config.remote_url.clone(),
            username: config.git_username.clone(),
            token: config.git_token.clone(),
            committer_name: config.committer_name.clone(),
            committer_email: config.committer_email.clone(),
        },
    );

    // Bootstrap runs exactly once, before any message is accepted.
    // A failure here leaves sync disabled; memo capture keeps working.
    if let Err(e) = manager.ensure_ready() {
        error!(error = %e, "repository bootstrap failed; running in local-only mode");
    }

    let chat = DiscordApi::new(config.bot_token.clone());
    let self_id = chat.current_user_id().await?;
    let channel_name = match chat.channel_name(&config.channel_id).await {
        Ok(name) => name,
        Err(e) => {
            warn!(error = %e, "could not resolve channel name; memos will omit it");
            String::new()
        }
    };
    info!(channel = %config.channel_id, "listening for memos");

    let host = cli.host;
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = api::serve(host, port).await {
            error!(error = %e, "liveness endpoint failed");
        }
    });

    let handler = MessageHandler::new(
        chat,
        NoteStore::new(work_dir),
        manager,
        self_id,
        config.channel_id.clone(),
        channel_name,
    );
    handler.run(config.poll_interval).await;

    Ok(())
}
