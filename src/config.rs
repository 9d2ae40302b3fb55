//! Process configuration.
//!
//! All settings come from environment variables at process start and
//! are treated as immutable for the process lifetime.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use crate::sync::get_data_dir;

/// Errors that can occur while loading configuration.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    #[diagnostic(
        code(memosync::config::missing_var),
        help("Set {name} before starting memosync.")
    )]
    MissingVar { name: &'static str },

    #[error("Invalid value for {name}: {message}")]
    #[diagnostic(code(memosync::config::invalid_var))]
    InvalidVar {
        name: &'static str,
        message: String,
    },
}

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTPS URL of the note repository on GitHub.
    pub remote_url: String,
    /// GitHub username embedded into the authenticated remote URL.
    pub git_username: String,
    /// Pre-formed access token; no auth flow happens here.
    pub git_token: String,
    pub committer_name: String,
    pub committer_email: String,
    pub bot_token: String,
    /// The one channel being listened to.
    pub channel_id: String,
    pub data_dir: PathBuf,
    pub port: u16,
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a lookup function (testable without
    /// mutating the process environment).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match get(name) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ConfigError::MissingVar { name }),
            }
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidVar {
                name: "PORT",
                message: format!("{e}"),
            })?,
            None => 8080,
        };

        let poll_secs: u64 = match get("MEMOSYNC_POLL_INTERVAL_SECS") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidVar {
                name: "MEMOSYNC_POLL_INTERVAL_SECS",
                message: format!("{e}"),
            })?,
            None => 10,
        };

        let data_dir = get("MEMOSYNC_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(get_data_dir);

        Ok(Self {
            remote_url: required("MEMOSYNC_REMOTE_URL")?,
            git_username: required("MEMOSYNC_GIT_USERNAME")?,
            git_token: required("MEMOSYNC_GIT_TOKEN")?,
            committer_name: required("MEMOSYNC_COMMITTER_NAME")?,
            committer_email: required("MEMOSYNC_COMMITTER_EMAIL")?,
            bot_token: required("DISCORD_BOT_TOKEN")?,
            channel_id: required("DISCORD_CHANNEL_ID")?,
            data_dir,
            port,
            poll_interval: Duration::from_secs(poll_secs),
        })
    }

    /// The working-copy path (data_dir/notes).
    pub fn work_dir(&self) -> PathBuf {
        self.data_dir.join("notes")
    }
}
