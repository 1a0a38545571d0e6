use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Days, NaiveTime, TimeDelta, Utc};
use tokio::time::Instant;

use super::{SchedulerResult, broadcast};
use crate::{
    calendar::CalendarService,
    destination::Destination,
    messaging::{MessagingService, render},
    settings::{CalendarSettings, SettingsService},
    storage::{AlertWindow, CryptoEvent, EventCategory, EventStorage},
};

/// Sends "tomorrow" and "in one hour" alerts for calendar events and keeps
/// the calendar fresh.
pub struct AlertScheduler {
    settings: Arc<dyn SettingsService>,
    events: Arc<dyn EventStorage>,
    calendar: Arc<dyn CalendarService>,
    messaging_service: Arc<dyn MessagingService>,
    destinations: Vec<Destination>,
    check_interval: Duration,
    refresh_interval: Duration,
}

fn category_enabled(settings: &CalendarSettings, category: EventCategory) -> bool {
    match category {
        EventCategory::Conference => settings.alert_conferences,
        EventCategory::Speech => settings.alert_speeches,
        EventCategory::Launch => settings.alert_launches,
        _ => true,
    }
}

/// `[tomorrow 00:00:00, tomorrow 23:59:59]` in UTC.
fn tomorrow(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let day = now.date_naive().checked_add_days(Days::new(1))?;
    let start = day.and_time(NaiveTime::MIN).and_utc();
    Some((start, start + TimeDelta::days(1) - TimeDelta::seconds(1)))
}

impl AlertScheduler {
    /// Creates a scheduler. It does nothing until [`AlertScheduler::run`].
    pub fn new(
        settings: Arc<dyn SettingsService>,
        events: Arc<dyn EventStorage>,
        calendar: Arc<dyn CalendarService>,
        messaging_service: Arc<dyn MessagingService>,
        destinations: Vec<Destination>,
        check_interval: Duration,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            settings,
            events,
            calendar,
            messaging_service,
            destinations,
            check_interval,
            refresh_interval,
        }
    }

    /// Load events, then check alerts every `check_interval` and refresh the
    /// calendar every `refresh_interval`.
    pub async fn run(&self) {
        tracing::info!("Starting event alert scheduler");
        self.refresh().await;
        let mut last_refresh = Instant::now();

        let mut interval = tokio::time::interval(self.check_interval);
        loop {
            interval.tick().await;

            if last_refresh.elapsed() >= self.refresh_interval {
                self.refresh().await;
                last_refresh = Instant::now();
            }

            match self.check_and_send(Utc::now()).await {
                Ok(0) => {}
                Ok(sent) => tracing::info!("Sent {sent} event alert(s)"),
                Err(e) => tracing::error!("Event alert check failed: {e}"),
            }
        }
    }

    async fn refresh(&self) {
        match self.calendar.refresh_events(Utc::now()).await {
            Ok(added) => tracing::info!("Calendar refreshed, {added} new event(s)"),
            Err(e) => tracing::error!("Calendar refresh failed: {e}"),
        }
    }

    /// Send every due alert that was not sent yet. Returns the number of
    /// alerts delivered.
    pub async fn check_and_send(&self, now: DateTime<Utc>) -> SchedulerResult<usize> {
        let settings = self.settings.get().await?.calendar;
        if !settings.alerts_enabled {
            return Ok(0);
        }

        let mut sent = 0;

        if settings.alert_1day {
            if let Some((start, end)) = tomorrow(now) {
                let events =
                    self.events.events_pending_alert(AlertWindow::OneDay, start, end).await?;
                for event in events.iter().filter(|e| category_enabled(&settings, e.category)) {
                    if self.send_alert(event, AlertWindow::OneDay).await {
                        sent += 1;
                    }
                }
            }
        }

        if settings.alert_1hour {
            let end = now + TimeDelta::hours(1);
            let events = self.events.events_pending_alert(AlertWindow::OneHour, now, end).await?;
            for event in &events {
                if self.send_alert(event, AlertWindow::OneHour).await {
                    sent += 1;
                }
            }
        }

        Ok(sent)
    }

    /// The window flag is set only when at least one destination accepted the
    /// alert. Returns whether the alert was delivered.
    async fn send_alert(&self, event: &CryptoEvent, window: AlertWindow) -> bool {
        let text = render::event_alert(event, window);
        let delivered =
            broadcast(self.messaging_service.as_ref(), &self.destinations, &text).await;
        if delivered == 0 {
            tracing::warn!("Alert for '{}' reached no destination, will retry", event.title);
            return false;
        }

        match self.events.mark_alert_sent(event.id, window).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Alert flag for event {} was already set", event.id),
            Err(e) => {
                tracing::error!("Failed to flag {window:?} alert for event {}: {e}", event.id)
            }
        }
        tracing::info!("Sent {window:?} alert for '{}'", event.title);
        true
    }
}
