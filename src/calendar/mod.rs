/// Events shipped with the bot.
pub mod seed;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use mockall::automock;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    extractor::{FetchError, PageFetcher},
    storage::{CryptoEvent, EventCategory, EventOrigin, EventStorage, NewEvent, StorageError},
};

/// Page scraped for upcoming coin events.
pub const COINMARKETCAL_URL: &str = "https://coinmarketcal.com/en/";
const MAX_SCRAPED_EVENTS: usize = 20;
const SCRAPED_IMPORTANCE: u8 = 5;
const MANUAL_IMPORTANCE: u8 = 7;
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%B %d, %Y", "%d %B %Y"];

/// Errors of the calendar service.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// A storage call failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// CoinMarketCal could not be fetched or parsed.
    #[error("Failed to fetch events: {0}")]
    Fetch(#[from] FetchError),
    /// A manual event did not have the expected fields.
    #[error("Invalid format. Use: YYYY-MM-DD|Title|category|location")]
    InvalidFormat,
    /// A manual event date could not be parsed.
    #[error("Invalid date '{0}'. Use the format YYYY-MM-DD (e.g. 2026-03-15)")]
    InvalidDate(String),
}

/// Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Predefined windows of the calendar menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    /// Events of the current UTC day.
    Today,
    /// The next 7 days.
    Week,
    /// The next 30 days.
    Month,
    /// Speeches of the next 90 days.
    Speeches,
    /// Conferences of the next year.
    Conferences,
    /// Launches of the next 90 days.
    Launches,
}

impl CalendarView {
    /// Time range covered by the view at `now`, both ends inclusive.
    pub fn period(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::Today => {
                let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
                (start, start + Duration::days(1) - Duration::seconds(1))
            }
            Self::Week => (now, now + Duration::days(7)),
            Self::Month => (now, now + Duration::days(30)),
            Self::Speeches | Self::Launches => (now, now + Duration::days(90)),
            Self::Conferences => (now, now + Duration::days(365)),
        }
    }

    /// Category the view is narrowed to.
    pub fn category(&self) -> Option<EventCategory> {
        match self {
            Self::Speeches => Some(EventCategory::Speech),
            Self::Conferences => Some(EventCategory::Conference),
            Self::Launches => Some(EventCategory::Launch),
            Self::Today | Self::Week | Self::Month => None,
        }
    }

    /// Maximum number of events listed.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Month => Some(15),
            Self::Speeches | Self::Launches => Some(10),
            Self::Conferences => Some(12),
            Self::Today | Self::Week => None,
        }
    }
}

/// An event card found on CoinMarketCal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedEvent {
    /// Event title.
    pub title: String,
    /// Date as shown on the card.
    pub date: String,
    /// Coin name, if the card has one.
    pub coin: Option<String>,
}

/// Parse a scraped date in any of the known formats.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS.iter().find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Extract event cards from the CoinMarketCal front page.
pub fn parse_coinmarketcal(html: &str) -> Vec<ScrapedEvent> {
    let (Ok(card_sel), Ok(title_sel), Ok(date_sel), Ok(coin_sel)) = (
        Selector::parse("article.card, div.event-card"),
        Selector::parse("h4, h5, .card-title"),
        Selector::parse(".date, .card-date, time"),
        Selector::parse(".coin-name, .card-coin"),
    ) else {
        return Vec::new();
    };

    let text = |element: ElementRef<'_>| {
        element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
    };

    Html::parse_document(html)
        .select(&card_sel)
        .take(MAX_SCRAPED_EVENTS)
        .filter_map(|card| {
            let title = card.select(&title_sel).next().map(text).filter(|t| !t.is_empty())?;
            Some(ScrapedEvent {
                title,
                date: card.select(&date_sel).next().map(text).unwrap_or_default(),
                coin: card.select(&coin_sel).next().map(text).filter(|c| !c.is_empty()),
            })
        })
        .collect()
}

/// Parse admin input `YYYY-MM-DD|Title|category|location`. An unknown or
/// missing category becomes a conference.
pub fn parse_manual_event(text: &str) -> CalendarResult<NewEvent> {
    let parts: Vec<&str> = text.trim().split('|').map(str::trim).collect();
    if parts.len() < 2 || parts[1].is_empty() {
        return Err(CalendarError::InvalidFormat);
    }

    let day = NaiveDate::parse_from_str(parts[0], "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(parts[0].to_string()))?;
    let category = parts
        .get(2)
        .and_then(|c| c.parse::<EventCategory>().ok())
        .unwrap_or(EventCategory::Conference);
    let location = parts.get(3).filter(|l| !l.is_empty()).map(|l| l.to_string());

    Ok(NewEvent {
        title: parts[1].to_string(),
        description: None,
        starts_at: day.and_time(NaiveTime::MIN).and_utc(),
        ends_at: None,
        category,
        coin: None,
        origin: EventOrigin::Manual,
        source_url: None,
        location,
        importance: MANUAL_IMPORTANCE,
    })
}

/// Crypto events calendar.
#[automock]
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Load the built-in catalog and scrape CoinMarketCal. Returns the number
    /// of new events stored.
    async fn refresh_events(&self, now: DateTime<Utc>) -> CalendarResult<usize>;

    /// Events starting within `[start, end]`, ordered by date.
    async fn events_for_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category: Option<EventCategory>,
    ) -> CalendarResult<Vec<CryptoEvent>>;

    /// Events of a calendar view, unlimited.
    async fn view_events(
        &self,
        view: CalendarView,
        now: DateTime<Utc>,
    ) -> CalendarResult<Vec<CryptoEvent>>;

    /// Store an event entered by an admin.
    async fn add_manual_event(&self, text: &str) -> CalendarResult<CryptoEvent>;
}

/// Calendar backed by the event storage and CoinMarketCal.
pub struct DefaultCalendarService {
    storage: Arc<dyn EventStorage>,
    fetcher: Arc<dyn PageFetcher>,
}

impl DefaultCalendarService {
    /// Creates a calendar service.
    pub fn new(storage: Arc<dyn EventStorage>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { storage, fetcher }
    }

    async fn load_seed_events(&self) -> CalendarResult<usize> {
        let mut saved = 0;
        for seed in seed::SEED_EVENTS {
            let Some(event) = seed.to_new_event() else {
                tracing::warn!("Skipping catalog event with a bad date: {}", seed.title);
                continue;
            };

            match self.storage.find_event(seed.title, seed.day(), None).await? {
                Some(existing) if existing.source_url.is_none() => {
                    self.storage.set_event_url_if_missing(existing.id, seed.url).await?;
                }
                Some(_) => {}
                None => {
                    self.storage.insert_event(event).await?;
                    saved += 1;
                }
            }
        }
        Ok(saved)
    }

    async fn load_coinmarketcal_events(&self, now: DateTime<Utc>) -> CalendarResult<usize> {
        let html = self.fetcher.fetch(COINMARKETCAL_URL).await?;

        let mut saved = 0;
        for scraped in parse_coinmarketcal(&html) {
            let existing = self
                .storage
                .find_event(&scraped.title, None, Some(EventOrigin::CoinMarketCal))
                .await?;
            if existing.is_some() {
                continue;
            }

            let starts_at = parse_event_date(&scraped.date)
                .map(|day| day.and_time(NaiveTime::MIN).and_utc())
                .unwrap_or_else(|| now + Duration::days(30));

            self.storage
                .insert_event(NewEvent {
                    title: scraped.title,
                    description: None,
                    starts_at,
                    ends_at: None,
                    category: EventCategory::Launch,
                    coin: scraped.coin,
                    origin: EventOrigin::CoinMarketCal,
                    source_url: None,
                    location: None,
                    importance: SCRAPED_IMPORTANCE,
                })
                .await?;
            saved += 1;
        }
        Ok(saved)
    }
}

#[async_trait]
impl CalendarService for DefaultCalendarService {
    async fn refresh_events(&self, now: DateTime<Utc>) -> CalendarResult<usize> {
        let mut saved = self.load_seed_events().await?;

        match self.load_coinmarketcal_events(now).await {
            Ok(scraped) => saved += scraped,
            Err(e) => tracing::error!("Error scraping CoinMarketCal: {e}"),
        }

        tracing::info!("Calendar refreshed, {saved} new events");
        Ok(saved)
    }

    async fn events_for_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category: Option<EventCategory>,
    ) -> CalendarResult<Vec<CryptoEvent>> {
        Ok(self.storage.events_between(start, end, category).await?)
    }

    async fn view_events(
        &self,
        view: CalendarView,
        now: DateTime<Utc>,
    ) -> CalendarResult<Vec<CryptoEvent>> {
        let (start, end) = view.period(now);
        self.events_for_period(start, end, view.category()).await
    }

    async fn add_manual_event(&self, text: &str) -> CalendarResult<CryptoEvent> {
        let event = parse_manual_event(text)?;
        let id = self.storage.insert_event(event.clone()).await?;
        tracing::info!("Manual event added: {} ({})", event.title, event.starts_at.date_naive());
        Ok(event.into_event(id))
    }
}
