//! Discord REST API client.
//!
//! Polls the channel's message list instead of holding a gateway
//! connection; the poll interval is configured at startup.

use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{ChannelMessage, ChatApi, ChatError};

const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";

/// Number of messages requested per poll.
const FETCH_LIMIT: usize = 50;

/// Discord REST client authenticated with a bot token.
pub struct DiscordApi {
    base_url: String,
    token: String,
    client: Client,
}

impl DiscordApi {
    /// Create a client against the production Discord API.
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            base_url,
            token,
            client: Client::new(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Handle API response with standardized error handling.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ChatError> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ChatError::InvalidResponse {
                    message: e.to_string(),
                })
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ChatError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    id: String,
    content: String,
    timestamp: String,
    author: ApiUser,
}

#[derive(Debug, Deserialize)]
struct ApiChannel {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSelf {
    id: String,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ChatError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ChatError::InvalidResponse {
            message: format!("bad timestamp {raw:?}: {e}"),
        })
}

/// Snowflake ids are u64s; numeric order is creation order.
fn snowflake(id: &str) -> u64 {
    id.parse().unwrap_or(0)
}

/// Percent-encode an emoji for use as a reaction URL path segment.
fn encode_emoji(emoji: &str) -> String {
    emoji.bytes().map(|b| format!("%{:02X}", b)).collect()
}

fn to_channel_message(raw: ApiMessage) -> Result<ChannelMessage, ChatError> {
    let created_at = parse_timestamp(&raw.timestamp)?;
    Ok(ChannelMessage {
        id: raw.id,
        author_id: raw.author.id,
        author: raw.author.username,
        content: raw.content,
        created_at,
    })
}

impl ChatApi for DiscordApi {
    async fn current_user_id(&self) -> Result<String, ChatError> {
        let url = format!("{}/users/@me", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        let me: ApiSelf = Self::handle_response(response).await?;
        Ok(me.id)
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, ChatError> {
        let url = format!("{}/channels/{}", self.base_url, channel_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        let channel: ApiChannel = Self::handle_response(response).await?;
        Ok(channel.name.unwrap_or_default())
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<ChannelMessage>, ChatError> {
        let mut url = format!(
            "{}/channels/{}/messages?limit={}",
            self.base_url, channel_id, FETCH_LIMIT
        );
        if let Some(after) = after {
            url.push_str(&format!("&after={}", after));
        }

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;
        let raw: Vec<ApiMessage> = Self::handle_response(response).await?;

        let mut messages = raw
            .into_iter()
            .map(to_channel_message)
            .collect::<Result<Vec<_>, _>>()?;
        // Discord returns newest first; deliver oldest first.
        messages.sort_by_key(|m| snowflake(&m.id));
        Ok(messages)
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), ChatError> {
        let url = format!(
            "{}/channels/{}/messages/{}/reactions/{}/@me",
            self.base_url,
            channel_id,
            message_id,
            encode_emoji(emoji)
        );
        let response = self
            .client
            .put(&url)
            .header("Authorization", self.auth_header())
            .header("Content-Length", "0")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ChatError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}
