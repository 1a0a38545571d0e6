use std::{fmt, str::FromStr};

use teloxide::types::{ChatId, MessageId, Recipient, ThreadId};
use thiserror::Error;

/// Errors parsing a destination.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DestinationParseError {
    /// The value is blank.
    #[error("Destination is empty")]
    Empty,
    /// The chat part is neither a number nor a username.
    #[error("Invalid chat id '{0}', expected a number or @username")]
    InvalidChat(String),
    /// The topic part is not a number.
    #[error("Invalid topic id '{0}'")]
    InvalidTopic(String),
}

/// The chat part of a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DestinationChat {
    /// Numeric chat id.
    Id(ChatId),
    /// Public username, with the `@`.
    Username(String),
}

/// A chat that receives posts, optionally narrowed to a forum topic.
///
/// Parsed from `chat[:topic]`, where `chat` is a numeric id (`-1001234`) or a
/// public username (`@channel`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    /// Target chat.
    pub chat: DestinationChat,
    /// Forum topic (message thread) id.
    pub topic: Option<i32>,
}

impl Destination {
    /// The chat in the form teloxide requests expect.
    pub fn recipient(&self) -> Recipient {
        match &self.chat {
            DestinationChat::Id(id) => Recipient::Id(*id),
            DestinationChat::Username(name) => Recipient::ChannelUsername(name.clone()),
        }
    }

    /// The topic as a message thread id.
    pub fn thread_id(&self) -> Option<ThreadId> {
        self.topic.map(|topic| ThreadId(MessageId(topic)))
    }
}

impl FromStr for Destination {
    type Err = DestinationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DestinationParseError::Empty);
        }

        let (chat_part, topic_part) = match s.rsplit_once(':') {
            Some((chat, topic)) => (chat.trim(), Some(topic.trim())),
            None => (s, None),
        };

        let chat = if let Some(name) = chat_part.strip_prefix('@') {
            let valid = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(DestinationParseError::InvalidChat(chat_part.to_string()));
            }
            DestinationChat::Username(chat_part.to_string())
        } else {
            let id = chat_part
                .parse::<i64>()
                .map_err(|_| DestinationParseError::InvalidChat(chat_part.to_string()))?;
            DestinationChat::Id(ChatId(id))
        };

        let topic = topic_part
            .map(|t| {
                t.parse::<i32>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| DestinationParseError::InvalidTopic(t.to_string()))
            })
            .transpose()?;

        Ok(Self { chat, topic })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.chat {
            DestinationChat::Id(id) => write!(f, "{}", id.0)?,
            DestinationChat::Username(name) => write!(f, "{name}")?,
        }
        if let Some(topic) = self.topic {
            write!(f, ":{topic}")?;
        }
        Ok(())
    }
}
