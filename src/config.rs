use std::{
    env::{self, VarError},
    str::FromStr,
};

use teloxide::types::UserId;
use thiserror::Error;

use crate::destination::{Destination, DestinationParseError};

const DEFAULT_DATABASE_URL: &str = "sqlite:data/crypto_news.db";
const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_SOURCE_DELAY: u64 = 2;
const DEFAULT_ALERT_CHECK_INTERVAL: u64 = 3600;
const DEFAULT_CALENDAR_REFRESH_INTERVAL: u64 = 6 * 3600;
const DEFAULT_DIGEST_CHECK_INTERVAL: u64 = 60;
const DEFAULT_MAX_MESSAGE_LENGTH: usize = 1000;
const DEFAULT_MAX_PARAGRAPHS: usize = 15;

/// Errors raised while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Environment variable {0} is required")]
    Missing(&'static str),
    /// No destination is configured.
    #[error("At least one destination is required (DESTINATIONS or CHANNEL_ID)")]
    NoDestinations,
    /// A destination could not be parsed.
    #[error("Invalid destination: {0}")]
    InvalidDestination(#[from] DestinationParseError),
    /// An admin id is not a number.
    #[error("Invalid admin id: {0}")]
    InvalidAdminId(String),
    /// A loop interval is set to zero.
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// Represents the application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The Telegram bot token.
    pub telegram_bot_token: String,
    /// Chats (and optional forum topics) that receive news, alerts and digests.
    pub destinations: Vec<Destination>,
    /// Users allowed to open the admin panel. Empty means everyone.
    pub admin_ids: Vec<UserId>,
    /// The URL of the database.
    pub database_url: String,
    /// Groq API key, can be replaced at runtime from the admin panel.
    pub groq_api_key: Option<String>,
    /// Base URL of the Groq OpenAI-compatible API.
    pub groq_api_url: String,
    /// Model used for Groq completions.
    pub groq_model: String,
    /// OpenAI API key, used as a fallback for completions.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI API.
    pub openai_api_url: String,
    /// Model used for OpenAI completions.
    pub openai_model: String,
    /// Seconds to wait between two sources in a fetch cycle.
    pub source_delay: u64,
    /// Seconds between two event alert checks.
    pub alert_check_interval: u64,
    /// Seconds between two calendar refreshes.
    pub calendar_refresh_interval: u64,
    /// Seconds between two checks for due scheduled digests.
    pub digest_check_interval: u64,
    /// Maximum number of characters of article body in a post.
    pub max_message_length: usize,
    /// Maximum number of paragraphs of article body in a post.
    pub max_paragraphs: usize,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_bot_token = first_var(&["TELOXIDE_TOKEN", "TELEGRAM_TOKEN", "TOKEN"])
            .ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let destinations = first_var(&["DESTINATIONS", "CHANNEL_ID", "TELEGRAM_CHANNEL"])
            .map(|raw| parse_list::<Destination>(&raw))
            .transpose()?
            .unwrap_or_default();
        if destinations.is_empty() {
            return Err(ConfigError::NoDestinations);
        }

        let admin_ids = first_var(&["ADMIN_IDS", "ADMIN_ID"])
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<u64>()
                            .map(UserId)
                            .map_err(|_| ConfigError::InvalidAdminId(s.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            telegram_bot_token,
            destinations,
            admin_ids,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            groq_api_key: optional_var("GROQ_API_KEY"),
            groq_api_url: env::var("GROQ_API_URL")
                .unwrap_or_else(|_| DEFAULT_GROQ_API_URL.to_string()),
            groq_model: env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string()),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_api_url: env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string()),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            source_delay: parsed_var("SOURCE_DELAY").unwrap_or(DEFAULT_SOURCE_DELAY),
            alert_check_interval: interval_var(
                "ALERT_CHECK_INTERVAL",
                DEFAULT_ALERT_CHECK_INTERVAL,
            )?,
            calendar_refresh_interval: interval_var(
                "CALENDAR_REFRESH_INTERVAL",
                DEFAULT_CALENDAR_REFRESH_INTERVAL,
            )?,
            digest_check_interval: interval_var(
                "DIGEST_CHECK_INTERVAL",
                DEFAULT_DIGEST_CHECK_INTERVAL,
            )?,
            max_message_length: parsed_var("MAX_MESSAGE_LENGTH")
                .unwrap_or(DEFAULT_MAX_MESSAGE_LENGTH),
            max_paragraphs: parsed_var("MAX_PARAGRAPHS").unwrap_or(DEFAULT_MAX_PARAGRAPHS),
        })
    }
}

// Returns the first non-empty variable out of `names`.
fn first_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| optional_var(name))
}

fn optional_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        Ok(_) | Err(VarError::NotPresent) | Err(VarError::NotUnicode(_)) => None,
    }
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

// Loop periods feed `tokio::time::interval`, which rejects zero.
fn interval_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match parsed_var(name).unwrap_or(default) {
        0 => Err(ConfigError::ZeroInterval(name)),
        secs => Ok(secs),
    }
}

fn parse_list<T>(raw: &str) -> Result<Vec<T>, T::Err>
where
    T: FromStr,
{
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(T::from_str).collect()
}
