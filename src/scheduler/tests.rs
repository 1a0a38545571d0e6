use std::{str::FromStr, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use teloxide::{ApiError, RequestError, types::MessageId};

use super::{AlertScheduler, DigestScheduler, MAX_DIGEST_POSTS};
use crate::{
    calendar::MockCalendarService,
    destination::Destination,
    messaging::{MessagingError, MockMessagingService},
    settings::{BotSettings, MockSettingsService},
    storage::{
        AlertWindow, CryptoEvent, EventCategory, EventOrigin, EventStorage, MockAnalyticsStorage,
        MockEventStorage, MockScheduleStorage, NewEvent, PostRecord, ScheduledPost, StorageError,
        sqlite::SqliteStorage,
    },
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap()
}

fn destinations() -> Vec<Destination> {
    vec![Destination::from_str("-1001").unwrap(), Destination::from_str("@news:3").unwrap()]
}

fn new_event(title: &str, starts_at: DateTime<Utc>, category: EventCategory) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: Some("Yearly gathering".to_string()),
        starts_at,
        ends_at: None,
        category,
        coin: None,
        origin: EventOrigin::Manual,
        source_url: None,
        location: Some("Lisbon".to_string()),
        importance: 8,
    }
}

fn settings_service(settings: BotSettings) -> MockSettingsService {
    let mut service = MockSettingsService::new();
    service.expect_get().returning(move || Ok(settings.clone()));
    service
}

fn accepting_messaging(times: usize) -> MockMessagingService {
    let mut messaging = MockMessagingService::new();
    messaging.expect_publish().times(times).returning(|_, _, _| Ok(MessageId(1)));
    messaging
}

fn alert_scheduler(
    settings: BotSettings,
    storage: Arc<SqliteStorage>,
    messaging: MockMessagingService,
) -> AlertScheduler {
    AlertScheduler::new(
        Arc::new(settings_service(settings)),
        storage,
        Arc::new(MockCalendarService::new()),
        Arc::new(messaging),
        destinations(),
        Duration::from_secs(60),
        Duration::from_secs(3600),
    )
}

async fn storage_with(events: Vec<NewEvent>) -> Arc<SqliteStorage> {
    let storage = Arc::new(SqliteStorage::new("sqlite::memory:").await.unwrap());
    for event in events {
        storage.insert_event(event).await.unwrap();
    }
    storage
}

#[tokio::test]
async fn test_one_day_alert_is_sent_once() {
    let tomorrow = Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap();
    let storage =
        storage_with(vec![new_event("Web Summit", tomorrow, EventCategory::Conference)]).await;

    // Two destinations, first check only.
    let scheduler =
        alert_scheduler(BotSettings::default(), storage.clone(), accepting_messaging(2));

    assert_eq!(scheduler.check_and_send(now()).await.unwrap(), 1);
    assert_eq!(scheduler.check_and_send(now()).await.unwrap(), 0);

    let pending = storage
        .events_pending_alert(AlertWindow::OneHour, tomorrow, tomorrow)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1, "the 1-hour flag is independent");
}

#[tokio::test]
async fn test_one_day_alert_respects_category_toggles() {
    let tomorrow = Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap();
    let storage = storage_with(vec![
        new_event("Web Summit", tomorrow, EventCategory::Conference),
        new_event("Airdrop season", tomorrow, EventCategory::Airdrop),
    ])
    .await;

    let mut settings = BotSettings::default();
    settings.calendar.alert_conferences = false;
    let scheduler = alert_scheduler(settings, storage, accepting_messaging(2));

    // Only the airdrop goes out.
    assert_eq!(scheduler.check_and_send(now()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_one_hour_alert_window() {
    let soon = now() + chrono::TimeDelta::minutes(30);
    let later = now() + chrono::TimeDelta::minutes(90);
    let storage = storage_with(vec![
        new_event("FOMC decision", soon, EventCategory::Speech),
        new_event("Powell presser", later, EventCategory::Speech),
    ])
    .await;

    let mut messaging = MockMessagingService::new();
    messaging
        .expect_publish()
        .withf(|_, text, photo| text.starts_with("🔔 <b>IN 1 HOUR!</b>") && photo.is_none())
        .times(2)
        .returning(|_, _, _| Ok(MessageId(1)));

    let scheduler = alert_scheduler(BotSettings::default(), storage, messaging);

    assert_eq!(scheduler.check_and_send(now()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_event_in_both_windows_gets_both_alerts() {
    let late = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
    let just_after_midnight = Utc.with_ymd_and_hms(2026, 10, 20, 0, 10, 0).unwrap();
    let storage = storage_with(vec![new_event(
        "Token unlock",
        just_after_midnight,
        EventCategory::Launch,
    )])
    .await;

    let mut messaging = MockMessagingService::new();
    messaging
        .expect_publish()
        .withf(|_, text, _| text.contains("Token unlock"))
        .times(4)
        .returning(|_, _, _| Ok(MessageId(1)));
    let scheduler = alert_scheduler(BotSettings::default(), storage, messaging);

    // One alert per window, each reaching both destinations.
    assert_eq!(scheduler.check_and_send(late).await.unwrap(), 2);
    assert_eq!(scheduler.check_and_send(late).await.unwrap(), 0);
}

fn stored_event(id: i64, title: &str) -> CryptoEvent {
    CryptoEvent {
        id,
        title: title.to_string(),
        description: None,
        starts_at: Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap(),
        ends_at: None,
        category: EventCategory::Ama,
        coin: None,
        origin: EventOrigin::Manual,
        source_url: None,
        location: None,
        importance: 5,
        alert_1day_sent: false,
        alert_1hour_sent: false,
    }
}

#[tokio::test]
async fn test_flag_failure_does_not_stop_other_alerts() {
    let mut events = MockEventStorage::new();
    events.expect_events_pending_alert().returning(|window, _, _| match window {
        AlertWindow::OneDay => {
            Ok(vec![stored_event(1, "Mainnet launch"), stored_event(2, "Founder AMA")])
        }
        AlertWindow::OneHour => Ok(vec![]),
    });
    events.expect_mark_alert_sent().times(2).returning(|id, _| match id {
        1 => Err(StorageError::DbError("database is locked".to_string())),
        _ => Ok(true),
    });

    let scheduler = AlertScheduler::new(
        Arc::new(settings_service(BotSettings::default())),
        Arc::new(events),
        Arc::new(MockCalendarService::new()),
        Arc::new(accepting_messaging(4)),
        destinations(),
        Duration::from_secs(60),
        Duration::from_secs(3600),
    );

    assert_eq!(scheduler.check_and_send(now()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_failed_alert_keeps_flag_unset() {
    let tomorrow = Utc.with_ymd_and_hms(2026, 10, 20, 10, 0, 0).unwrap();
    let storage =
        storage_with(vec![new_event("Web Summit", tomorrow, EventCategory::Conference)]).await;

    let mut messaging = MockMessagingService::new();
    messaging.expect_publish().returning(|_, _, _| {
        Err(MessagingError::TeloxideRequest(RequestError::Api(ApiError::ChatNotFound)))
    });
    let scheduler = alert_scheduler(BotSettings::default(), storage.clone(), messaging);

    assert_eq!(scheduler.check_and_send(now()).await.unwrap(), 0);

    let pending = storage
        .events_pending_alert(AlertWindow::OneDay, tomorrow, tomorrow)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn test_alerts_disabled_globally() {
    let tomorrow = Utc.with_ymd_and_hms(2026, 10, 20, 10, 0, 0).unwrap();
    let storage =
        storage_with(vec![new_event("Web Summit", tomorrow, EventCategory::Conference)]).await;

    let mut settings = BotSettings::default();
    settings.calendar.alerts_enabled = false;
    let scheduler = alert_scheduler(settings, storage, accepting_messaging(0));

    assert_eq!(scheduler.check_and_send(now()).await.unwrap(), 0);
}

fn schedule(id: i64, hour: u8, last_run_on: Option<NaiveDate>) -> ScheduledPost {
    ScheduledPost {
        id,
        hour,
        minute: 30,
        theme: "news".to_string(),
        max_posts: 3,
        enabled: true,
        last_run_on,
    }
}

fn post(title: &str) -> PostRecord {
    PostRecord {
        id: 1,
        message_id: Some(1),
        source: "CoinDesk".to_string(),
        title: title.to_string(),
        link: "https://coindesk.com/story".to_string(),
        theme: "news".to_string(),
        posted_at: now() - chrono::TimeDelta::hours(2),
        views: 0,
        forwards: 0,
        reactions: 0,
    }
}

fn digest_scheduler(
    schedules: MockScheduleStorage,
    analytics: MockAnalyticsStorage,
    messaging: MockMessagingService,
) -> DigestScheduler {
    DigestScheduler::new(
        Arc::new(schedules),
        Arc::new(analytics),
        Arc::new(messaging),
        destinations(),
        Duration::from_secs(60),
    )
}

#[tokio::test]
async fn test_due_digest_is_claimed_and_sent() {
    let today = now().date_naive();
    let yesterday = today.pred_opt().unwrap();

    let mut schedules = MockScheduleStorage::new();
    schedules.expect_list_schedules().returning(move || {
        let mut disabled = schedule(4, 8, None);
        disabled.enabled = false;
        Ok(vec![
            schedule(1, 8, Some(yesterday)), // due
            schedule(2, 20, None),           // later today
            schedule(3, 9, Some(today)),     // already ran
            disabled,
        ])
    });
    schedules
        .expect_claim_schedule_run()
        .withf(move |id, day| *id == 1 && *day == today)
        .times(1)
        .returning(|_, _| Ok(true));

    let mut analytics = MockAnalyticsStorage::new();
    analytics
        .expect_recent_posts_by_theme()
        .withf(|theme, since, limit| {
            theme == "news" && *since == now() - chrono::TimeDelta::hours(24) && *limit == 3
        })
        .times(1)
        .returning(|_, _, _| Ok(vec![post("ETF inflows"), post("Halving math")]));

    let mut messaging = MockMessagingService::new();
    messaging
        .expect_publish()
        .withf(|_, text, _| text.contains("ETF inflows") && text.contains("Halving math"))
        .times(2)
        .returning(|_, _, _| Ok(MessageId(1)));

    let scheduler = digest_scheduler(schedules, analytics, messaging);

    assert_eq!(scheduler.run_due(now()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_digest_claimed_elsewhere_is_skipped() {
    let mut schedules = MockScheduleStorage::new();
    schedules.expect_list_schedules().returning(|| Ok(vec![schedule(1, 8, None)]));
    schedules.expect_claim_schedule_run().times(1).returning(|_, _| Ok(false));

    let mut analytics = MockAnalyticsStorage::new();
    analytics.expect_recent_posts_by_theme().times(0);

    let scheduler = digest_scheduler(schedules, analytics, accepting_messaging(0));

    assert_eq!(scheduler.run_due(now()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_digest_with_unknown_theme_is_skipped() {
    let mut schedules = MockScheduleStorage::new();
    schedules.expect_list_schedules().returning(|| {
        let mut stale = schedule(1, 8, None);
        stale.theme = "memes".to_string();
        Ok(vec![stale])
    });
    schedules.expect_claim_schedule_run().times(1).returning(|_, _| Ok(true));

    let mut analytics = MockAnalyticsStorage::new();
    analytics.expect_recent_posts_by_theme().never();

    let scheduler = digest_scheduler(schedules, analytics, accepting_messaging(0));

    assert_eq!(scheduler.run_due(now()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_digest_post_count_is_capped() {
    let mut schedules = MockScheduleStorage::new();
    schedules.expect_list_schedules().returning(|| {
        let mut greedy = schedule(1, 8, None);
        greedy.max_posts = 50;
        Ok(vec![greedy])
    });
    schedules.expect_claim_schedule_run().times(1).returning(|_, _| Ok(true));

    let mut analytics = MockAnalyticsStorage::new();
    analytics
        .expect_recent_posts_by_theme()
        .withf(|_, _, limit| *limit == MAX_DIGEST_POSTS)
        .times(1)
        .returning(|_, _, _| Ok(vec![post("ETF inflows")]));

    let scheduler = digest_scheduler(schedules, analytics, accepting_messaging(2));

    assert_eq!(scheduler.run_due(now()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_digest_without_posts_sends_nothing() {
    let mut schedules = MockScheduleStorage::new();
    schedules.expect_list_schedules().returning(|| Ok(vec![schedule(1, 8, None)]));
    schedules.expect_claim_schedule_run().times(1).returning(|_, _| Ok(true));

    let mut analytics = MockAnalyticsStorage::new();
    analytics.expect_recent_posts_by_theme().times(1).returning(|_, _, _| Ok(vec![]));

    let scheduler = digest_scheduler(schedules, analytics, accepting_messaging(0));

    assert_eq!(scheduler.run_due(now()).await.unwrap(), 0);
}
