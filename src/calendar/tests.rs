use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use mockall::predicate::*;

use super::*;
use crate::{
    extractor::MockPageFetcher,
    storage::{MockEventStorage, sqlite::SqliteStorage},
};

const COINMARKETCAL_PAGE: &str = r#"
<html><body>
  <article class="card">
    <h5 class="card-title">Cardano Node 10 Release</h5>
    <span class="card-date">2026-11-02</span>
    <span class="coin-name">ADA</span>
  </article>
  <div class="event-card">
    <h4>Solana Breakpoint</h4>
    <time>December 11, 2026</time>
  </div>
  <div class="event-card"><span class="date">01/01/2027</span></div>
  <article class="card"><h5>Mystery Event</h5><span class="date">soon</span></article>
</body></html>
"#;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

#[test]
fn test_parse_event_date() {
    let expected = NaiveDate::from_ymd_opt(2026, 3, 15);
    assert_eq!(parse_event_date("2026-03-15"), expected);
    assert_eq!(parse_event_date("15/03/2026"), expected);
    assert_eq!(parse_event_date("March 15, 2026"), expected);
    assert_eq!(parse_event_date(" 15 March 2026 "), expected);
    assert_eq!(parse_event_date("next week"), None);
}

#[test]
fn test_parse_coinmarketcal() {
    let events = parse_coinmarketcal(COINMARKETCAL_PAGE);

    assert_eq!(
        events,
        vec![
            ScrapedEvent {
                title: "Cardano Node 10 Release".to_string(),
                date: "2026-11-02".to_string(),
                coin: Some("ADA".to_string()),
            },
            ScrapedEvent {
                title: "Solana Breakpoint".to_string(),
                date: "December 11, 2026".to_string(),
                coin: None,
            },
            ScrapedEvent {
                title: "Mystery Event".to_string(),
                date: "soon".to_string(),
                coin: None,
            },
        ]
    );
}

#[test]
fn test_parse_manual_event() {
    let event = parse_manual_event("2026-03-15 | Bitcoin Meetup | ama | São Paulo").unwrap();

    assert_eq!(event.title, "Bitcoin Meetup");
    assert_eq!(event.category, EventCategory::Ama);
    assert_eq!(event.location.as_deref(), Some("São Paulo"));
    assert_eq!(event.importance, 7);
    assert_eq!(event.origin, EventOrigin::Manual);
    assert_eq!(event.starts_at, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
}

#[test]
fn test_parse_manual_event_defaults() {
    let event = parse_manual_event("2026-03-15|Meetup|party").unwrap();
    assert_eq!(event.category, EventCategory::Conference);
    assert_eq!(event.location, None);

    let event = parse_manual_event("2026-03-15|Meetup").unwrap();
    assert_eq!(event.category, EventCategory::Conference);
}

#[test]
fn test_parse_manual_event_errors() {
    assert!(matches!(parse_manual_event("2026-03-15"), Err(CalendarError::InvalidFormat)));
    assert!(matches!(parse_manual_event("2026-03-15| "), Err(CalendarError::InvalidFormat)));
    assert!(matches!(
        parse_manual_event("15/03/2026|Meetup"),
        Err(CalendarError::InvalidDate(d)) if d == "15/03/2026"
    ));
}

#[test]
fn test_calendar_view_periods() {
    let (start, end) = CalendarView::Today.period(now());
    assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    assert_eq!(end, Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 59).unwrap());

    let (start, end) = CalendarView::Conferences.period(now());
    assert_eq!(start, now());
    assert_eq!(end, now() + Duration::days(365));

    assert_eq!(CalendarView::Speeches.category(), Some(EventCategory::Speech));
    assert_eq!(CalendarView::Week.category(), None);
    assert_eq!(CalendarView::Month.limit(), Some(15));
    assert_eq!(CalendarView::Today.limit(), None);
}

#[test]
fn test_seed_events_are_valid() {
    assert_eq!(seed::SEED_EVENTS.len(), 26);
    for seed in seed::SEED_EVENTS {
        let event = seed.to_new_event().unwrap();
        assert!((1..=10).contains(&event.importance), "{}", seed.title);
        assert!(event.ends_at.is_none_or(|end| end >= event.starts_at), "{}", seed.title);
        assert_eq!(event.origin, EventOrigin::Catalog);
    }
}

#[tokio::test]
async fn test_refresh_events_is_idempotent() {
    let storage = Arc::new(SqliteStorage::new("sqlite::memory:").await.unwrap());
    let mut fetcher = MockPageFetcher::new();
    fetcher
        .expect_fetch()
        .with(eq(COINMARKETCAL_URL))
        .times(2)
        .returning(|_| Ok(COINMARKETCAL_PAGE.to_string()));
    let service = DefaultCalendarService::new(storage.clone(), Arc::new(fetcher));

    let first = service.refresh_events(now()).await.unwrap();
    let second = service.refresh_events(now()).await.unwrap();

    assert_eq!(first, seed::SEED_EVENTS.len() + 3);
    assert_eq!(second, 0);

    // Unparseable dates fall back to now + 30 days.
    let mystery = storage
        .find_event("Mystery Event", None, Some(EventOrigin::CoinMarketCal))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mystery.starts_at, now() + Duration::days(30));
    assert_eq!(mystery.category, EventCategory::Launch);
    assert_eq!(mystery.importance, 5);
}

#[tokio::test]
async fn test_refresh_events_survives_scrape_failure() {
    let storage = Arc::new(SqliteStorage::new("sqlite::memory:").await.unwrap());
    let mut fetcher = MockPageFetcher::new();
    fetcher
        .expect_fetch()
        .returning(|_| Err(FetchError::Status(reqwest::StatusCode::FORBIDDEN)));
    let service = DefaultCalendarService::new(storage, Arc::new(fetcher));

    let saved = service.refresh_events(now()).await.unwrap();

    assert_eq!(saved, seed::SEED_EVENTS.len());
}

#[tokio::test]
async fn test_refresh_events_backfills_missing_url() {
    let mut storage = MockEventStorage::new();
    let mut fetcher = MockPageFetcher::new();
    let updated = Arc::new(Mutex::new(Vec::new()));
    let updated_clone = updated.clone();

    storage.expect_find_event().returning(|title, _, _| {
        Ok(Some(CryptoEvent {
            id: 1,
            title: title.to_string(),
            description: None,
            starts_at: Utc::now(),
            ends_at: None,
            category: EventCategory::Conference,
            coin: None,
            origin: EventOrigin::Manual,
            source_url: None,
            location: None,
            importance: 5,
            alert_1day_sent: false,
            alert_1hour_sent: false,
        }))
    });
    storage.expect_insert_event().never();
    storage.expect_set_event_url_if_missing().returning(move |_, url| {
        updated_clone.lock().unwrap().push(url.to_string());
        Ok(true)
    });
    fetcher.expect_fetch().returning(|_| Ok(String::new()));

    let service = DefaultCalendarService::new(Arc::new(storage), Arc::new(fetcher));
    let saved = service.refresh_events(now()).await.unwrap();

    assert_eq!(saved, 0);
    let updated = updated.lock().unwrap();
    assert_eq!(updated.len(), seed::SEED_EVENTS.len());
    assert!(updated.contains(&"https://devcon.org/".to_string()));
}

#[tokio::test]
async fn test_view_events_filters_category() {
    let mut storage = MockEventStorage::new();
    storage
        .expect_events_between()
        .withf(|start, end, category| {
            *start == now()
                && *end == now() + Duration::days(90)
                && *category == Some(EventCategory::Launch)
        })
        .times(1)
        .returning(|_, _, _| Ok(vec![]));

    let service = DefaultCalendarService::new(Arc::new(storage), Arc::new(MockPageFetcher::new()));
    let events = service.view_events(CalendarView::Launches, now()).await.unwrap();

    assert!(events.is_empty());
}

#[tokio::test]
async fn test_add_manual_event() {
    let storage = Arc::new(SqliteStorage::new("sqlite::memory:").await.unwrap());
    let service = DefaultCalendarService::new(storage.clone(), Arc::new(MockPageFetcher::new()));

    let event = service.add_manual_event("2026-11-20|Rust Meetup|ama|Lisbon").await.unwrap();

    assert!(event.id > 0);
    assert!(!event.alert_1day_sent);
    let stored = storage
        .events_between(event.starts_at, event.starts_at, None)
        .await
        .unwrap();
    assert_eq!(stored, vec![event]);
}
