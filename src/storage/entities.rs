use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Category of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Conferences and summits.
    Conference,
    /// Speeches and rate decisions.
    Speech,
    /// Mainnet and token launches.
    Launch,
    /// Network upgrades.
    Update,
    /// Airdrops.
    Airdrop,
    /// AMAs.
    Ama,
    /// Bitcoin halvings.
    Halving,
}

impl EventCategory {
    /// Every category.
    pub const ALL: [EventCategory; 7] = [
        Self::Conference,
        Self::Speech,
        Self::Launch,
        Self::Update,
        Self::Airdrop,
        Self::Ama,
        Self::Halving,
    ];

    /// Stored key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conference => "conference",
            Self::Speech => "speech",
            Self::Launch => "launch",
            Self::Update => "update",
            Self::Airdrop => "airdrop",
            Self::Ama => "ama",
            Self::Halving => "halving",
        }
    }

    /// Icon used in calendar texts.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Conference => "🎪",
            Self::Speech => "🎤",
            Self::Launch => "🚀",
            Self::Update => "⬆️",
            Self::Airdrop => "🎁",
            Self::Ama => "💬",
            Self::Halving => "⛏️",
        }
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown event category: {s}"))
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a calendar event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventOrigin {
    /// Built-in catalog shipped with the bot.
    Catalog,
    /// Entered by an admin.
    Manual,
    /// Scraped from coinmarketcal.com.
    CoinMarketCal,
}

impl EventOrigin {
    /// Stored key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Manual => "manual",
            Self::CoinMarketCal => "coinmarketcal",
        }
    }
}

impl FromStr for EventOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog" => Ok(Self::Catalog),
            "manual" => Ok(Self::Manual),
            "coinmarketcal" => Ok(Self::CoinMarketCal),
            other => Err(format!("Unknown event origin: {other}")),
        }
    }
}

/// A stored calendar event.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoEvent {
    /// Row id.
    pub id: i64,
    /// Event title.
    pub title: String,
    /// Free text details.
    pub description: Option<String>,
    /// Start time, UTC.
    pub starts_at: DateTime<Utc>,
    /// End time of multi-day events.
    pub ends_at: Option<DateTime<Utc>>,
    /// Event category.
    pub category: EventCategory,
    /// Related coin.
    pub coin: Option<String>,
    /// Where the event came from.
    pub origin: EventOrigin,
    /// Page with details.
    pub source_url: Option<String>,
    /// City and country.
    pub location: Option<String>,
    /// 1..=10
    pub importance: u8,
    /// The day-before alert went out.
    pub alert_1day_sent: bool,
    /// The one hour alert went out.
    pub alert_1hour_sent: bool,
}

/// An event that is not stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Event title.
    pub title: String,
    /// Free text details.
    pub description: Option<String>,
    /// Start time, UTC.
    pub starts_at: DateTime<Utc>,
    /// End time of multi-day events.
    pub ends_at: Option<DateTime<Utc>>,
    /// Event category.
    pub category: EventCategory,
    /// Related coin.
    pub coin: Option<String>,
    /// Where the event came from.
    pub origin: EventOrigin,
    /// Page with details.
    pub source_url: Option<String>,
    /// City and country.
    pub location: Option<String>,
    /// 1..=10
    pub importance: u8,
}

impl NewEvent {
    /// The stored form of this event once it got row id `id`.
    pub fn into_event(self, id: i64) -> CryptoEvent {
        CryptoEvent {
            id,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            category: self.category,
            coin: self.coin,
            origin: self.origin,
            source_url: self.source_url,
            location: self.location,
            importance: self.importance,
            alert_1day_sent: false,
            alert_1hour_sent: false,
        }
    }
}

/// The two alert windows of a calendar event. Each one is sent at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertWindow {
    /// The day before the event.
    OneDay,
    /// One hour before the event.
    OneHour,
}

impl AlertWindow {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::OneDay => "alert_1day_sent",
            Self::OneHour => "alert_1hour_sent",
        }
    }
}

/// A post that was published, kept for analytics and digests.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    /// Row id.
    pub id: i64,
    /// Message id in the first destination that accepted the post.
    pub message_id: Option<i32>,
    /// Source name.
    pub source: String,
    /// Posted title.
    pub title: String,
    /// Article link.
    pub link: String,
    /// Theme key.
    pub theme: String,
    /// Publication time, UTC.
    pub posted_at: DateTime<Utc>,
    /// Views. Bots cannot read them, so they stay at zero.
    pub views: i64,
    /// Forwards.
    pub forwards: i64,
    /// Reactions.
    pub reactions: i64,
}

/// A post about to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    /// Message id in the first destination that accepted the post.
    pub message_id: Option<i32>,
    /// Source name.
    pub source: String,
    /// Posted title.
    pub title: String,
    /// Article link.
    pub link: String,
    /// Theme key.
    pub theme: String,
}

/// A daily digest definition: at `hour:minute` UTC send the latest
/// `max_posts` posts of `theme`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPost {
    /// Row id.
    pub id: i64,
    /// Hour of day, UTC.
    pub hour: u8,
    /// Minute of the hour.
    pub minute: u8,
    /// Theme key.
    pub theme: String,
    /// Posts per digest.
    pub max_posts: u32,
    /// Whether the digest runs.
    pub enabled: bool,
    /// Day of the last run.
    pub last_run_on: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_category_from_str() {
        assert_eq!(EventCategory::from_str("Speech"), Ok(EventCategory::Speech));
        assert_eq!(EventCategory::from_str(" ama "), Ok(EventCategory::Ama));
        assert!(EventCategory::from_str("party").is_err());
    }

    #[test]
    fn test_event_origin_round_trip() {
        for origin in [EventOrigin::Catalog, EventOrigin::Manual, EventOrigin::CoinMarketCal] {
            assert_eq!(EventOrigin::from_str(origin.as_str()), Ok(origin));
        }
    }
}
