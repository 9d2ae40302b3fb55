//! Chat platform listener - captures messages from one Discord channel.
//!
//! The Discord REST API is reached through the `ChatApi` trait so the
//! message handler can be tested with a mock, mirroring how the sync
//! layer abstracts git behind `GitOps`.

mod discord;
mod handler;
#[cfg(test)]
mod handler_test;

pub use discord::DiscordApi;
pub use handler::MessageHandler;

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Errors that can occur talking to the chat platform.
#[derive(Error, Diagnostic, Debug)]
pub enum ChatError {
    #[error("Failed to reach the chat API")]
    #[diagnostic(
        code(memosync::listener::connection_failed),
        help("Check network connectivity and the DISCORD_BOT_TOKEN value.")
    )]
    ConnectionFailed {
        #[source]
        source: reqwest::Error,
    },

    #[error("Chat API error ({status}): {message}")]
    #[diagnostic(code(memosync::listener::api_error))]
    ApiError { status: u16, message: String },

    #[error("Invalid response from chat API: {message}")]
    #[diagnostic(code(memosync::listener::invalid_response))]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ChatError::ConnectionFailed { source: e }
        } else {
            ChatError::InvalidResponse {
                message: e.to_string(),
            }
        }
    }
}

/// One raw message fetched from the configured channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Snowflake id, used as the poll watermark.
    pub id: String,
    pub author_id: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A captured message, fully attributed, ready to become a memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceived {
    pub id: String,
    pub author: String,
    pub channel_id: String,
    pub channel_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Trait for chat platform operations. Can be mocked in tests.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, automock)]
pub trait ChatApi {
    /// Id of the bot's own user, used to filter out its messages.
    async fn current_user_id(&self) -> Result<String, ChatError>;

    /// Human-readable name of a channel.
    async fn channel_name(&self, channel_id: &str) -> Result<String, ChatError>;

    /// Fetch messages newer than `after` (all recent ones when `None`),
    /// ordered oldest first.
    async fn fetch_messages<'a>(
        &self,
        channel_id: &str,
        after: Option<&'a str>,
    ) -> Result<Vec<ChannelMessage>, ChatError>;

    /// React to a message with the given emoji.
    async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), ChatError>;
}
