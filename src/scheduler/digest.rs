use std::{str::FromStr, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use super::{SchedulerResult, broadcast};
use crate::{
    destination::Destination,
    messaging::{MessagingService, render},
    settings::Theme,
    storage::{AnalyticsStorage, ScheduleStorage, ScheduledPost},
};

/// Upper bound on the posts of a single digest.
pub const MAX_DIGEST_POSTS: u32 = 20;

/// Sends the daily digests defined from the schedule menu.
pub struct DigestScheduler {
    schedules: Arc<dyn ScheduleStorage>,
    analytics: Arc<dyn AnalyticsStorage>,
    messaging_service: Arc<dyn MessagingService>,
    destinations: Vec<Destination>,
    check_interval: Duration,
}

/// Enabled, its time of day has passed and it did not run today.
fn is_due(schedule: &ScheduledPost, now: DateTime<Utc>) -> bool {
    let Some(at) = NaiveTime::from_hms_opt(schedule.hour.into(), schedule.minute.into(), 0) else {
        return false;
    };
    schedule.enabled && now.time() >= at && schedule.last_run_on != Some(now.date_naive())
}

impl DigestScheduler {
    /// Creates a scheduler. It does nothing until [`DigestScheduler::run`].
    pub fn new(
        schedules: Arc<dyn ScheduleStorage>,
        analytics: Arc<dyn AnalyticsStorage>,
        messaging_service: Arc<dyn MessagingService>,
        destinations: Vec<Destination>,
        check_interval: Duration,
    ) -> Self {
        Self { schedules, analytics, messaging_service, destinations, check_interval }
    }

    /// Check for due digests every `check_interval`.
    pub async fn run(&self) {
        tracing::info!("Starting digest scheduler");

        let mut interval = tokio::time::interval(self.check_interval);
        loop {
            interval.tick().await;
            if let Err(e) = self.run_due(Utc::now()).await {
                tracing::error!("Digest check failed: {e}");
            }
        }
    }

    /// Claim and send every due digest. Returns the number of digests that
    /// reached at least one destination.
    pub async fn run_due(&self, now: DateTime<Utc>) -> SchedulerResult<usize> {
        let mut sent = 0;

        for schedule in self.schedules.list_schedules().await? {
            if !is_due(&schedule, now) {
                continue;
            }
            if !self.schedules.claim_schedule_run(schedule.id, now.date_naive()).await? {
                continue;
            }

            let Ok(theme) = Theme::from_str(&schedule.theme) else {
                tracing::warn!("Schedule {} has unknown theme '{}'", schedule.id, schedule.theme);
                continue;
            };

            let posts = self
                .analytics
                .recent_posts_by_theme(
                    theme.as_str(),
                    now - TimeDelta::hours(24),
                    schedule.max_posts.min(MAX_DIGEST_POSTS),
                )
                .await?;
            if posts.is_empty() {
                tracing::info!("No recent {theme} posts for schedule {}", schedule.id);
                continue;
            }

            let text = render::digest(theme, &posts);
            if broadcast(self.messaging_service.as_ref(), &self.destinations, &text).await > 0 {
                sent += 1;
            }
        }

        Ok(sent)
    }
}
