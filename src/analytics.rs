use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use mockall::automock;

use crate::storage::{AnalyticsStorage, PostRecord, StorageResult};

const WEEK_TOP_SOURCES: usize = 5;

/// Sums over a set of posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    /// Number of posts.
    pub posts: usize,
    /// Sum of views.
    pub views: i64,
    /// Sum of forwards.
    pub forwards: i64,
    /// Sum of reactions.
    pub reactions: i64,
}

/// Posts and views grouped by a key (source, theme).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    /// Source name or theme.
    pub key: String,
    /// Number of posts.
    pub posts: usize,
    /// Sum of views.
    pub views: i64,
}

/// Report over the posts published today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyReport {
    /// Totals over all of today's posts.
    pub totals: Totals,
    /// Sorted by source name.
    pub by_source: Vec<Breakdown>,
}

/// Report over the posts of the last 7 days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyReport {
    /// Totals over the whole week.
    pub totals: Totals,
    /// Post count per day, oldest first.
    pub by_day: Vec<(NaiveDate, usize)>,
    /// Sources with the most views.
    pub top_sources: Vec<Breakdown>,
}

/// Sums `posts`.
pub fn totals(posts: &[PostRecord]) -> Totals {
    posts.iter().fold(Totals::default(), |mut acc, post| {
        acc.posts += 1;
        acc.views += post.views;
        acc.forwards += post.forwards;
        acc.reactions += post.reactions;
        acc
    })
}

/// Group posts by `key`, sorted by key.
pub fn group_by<F>(posts: &[PostRecord], key: F) -> Vec<Breakdown>
where
    F: Fn(&PostRecord) -> &str,
{
    let mut groups: BTreeMap<&str, (usize, i64)> = BTreeMap::new();
    for post in posts {
        let entry = groups.entry(key(post)).or_default();
        entry.0 += 1;
        entry.1 += post.views;
    }

    groups
        .into_iter()
        .map(|(key, (posts, views))| Breakdown { key: key.to_string(), posts, views })
        .collect()
}

/// Post count per UTC day, oldest first.
pub fn posts_by_day(posts: &[PostRecord]) -> Vec<(NaiveDate, usize)> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for post in posts {
        *days.entry(post.posted_at.date_naive()).or_default() += 1;
    }
    days.into_iter().collect()
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Reports over the posts recorded by the news pipeline.
#[automock]
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Posts published since midnight UTC.
    async fn today(&self, now: DateTime<Utc>) -> StorageResult<DailyReport>;

    /// Posts of the last 7 days.
    async fn week(&self, now: DateTime<Utc>) -> StorageResult<WeeklyReport>;

    /// The `limit` posts with the most views.
    async fn top_posts(&self, limit: u32) -> StorageResult<Vec<PostRecord>>;

    /// Last 7 days grouped by source, most posts first.
    async fn by_source(&self, now: DateTime<Utc>) -> StorageResult<Vec<Breakdown>>;

    /// Last 7 days grouped by theme, most posts first.
    async fn by_theme(&self, now: DateTime<Utc>) -> StorageResult<Vec<Breakdown>>;
}

/// Analytics computed from the stored post records.
pub struct DefaultAnalyticsService {
    storage: Arc<dyn AnalyticsStorage>,
}

impl DefaultAnalyticsService {
    /// Creates a service reading from `storage`.
    pub fn new(storage: Arc<dyn AnalyticsStorage>) -> Self {
        Self { storage }
    }

    async fn last_week(&self, now: DateTime<Utc>) -> StorageResult<Vec<PostRecord>> {
        self.storage.posts_since(now - Duration::days(7)).await
    }
}

fn most_posts_first(mut groups: Vec<Breakdown>) -> Vec<Breakdown> {
    groups.sort_by(|a, b| b.posts.cmp(&a.posts).then_with(|| a.key.cmp(&b.key)));
    groups
}

#[async_trait]
impl AnalyticsService for DefaultAnalyticsService {
    async fn today(&self, now: DateTime<Utc>) -> StorageResult<DailyReport> {
        let posts = self.storage.posts_since(start_of_day(now)).await?;
        Ok(DailyReport { totals: totals(&posts), by_source: group_by(&posts, |p| &p.source) })
    }

    async fn week(&self, now: DateTime<Utc>) -> StorageResult<WeeklyReport> {
        let posts = self.last_week(now).await?;

        let mut top_sources = group_by(&posts, |p| &p.source);
        top_sources.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.key.cmp(&b.key)));
        top_sources.truncate(WEEK_TOP_SOURCES);

        Ok(WeeklyReport { totals: totals(&posts), by_day: posts_by_day(&posts), top_sources })
    }

    async fn top_posts(&self, limit: u32) -> StorageResult<Vec<PostRecord>> {
        self.storage.top_posts(limit).await
    }

    async fn by_source(&self, now: DateTime<Utc>) -> StorageResult<Vec<Breakdown>> {
        let posts = self.last_week(now).await?;
        Ok(most_posts_first(group_by(&posts, |p| &p.source)))
    }

    async fn by_theme(&self, now: DateTime<Utc>) -> StorageResult<Vec<Breakdown>> {
        let posts = self.last_week(now).await?;
        Ok(most_posts_first(group_by(&posts, |p| &p.theme)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::storage::MockAnalyticsStorage;

    fn post(source: &str, theme: &str, day: u32, views: i64) -> PostRecord {
        PostRecord {
            id: 0,
            message_id: None,
            source: source.to_string(),
            title: format!("{source} post"),
            link: format!("https://{source}.example/{day}"),
            theme: theme.to_string(),
            posted_at: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
            views,
            forwards: 1,
            reactions: 2,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 15, 30, 0).unwrap()
    }

    fn sample_posts() -> Vec<PostRecord> {
        vec![
            post("CoinDesk", "news", 17, 10),
            post("Decrypt", "defi", 18, 50),
            post("CoinDesk", "news", 19, 5),
            post("CoinDesk", "analysis", 19, 0),
        ]
    }

    #[test]
    fn test_totals() {
        let totals = totals(&sample_posts());
        assert_eq!(totals, Totals { posts: 4, views: 65, forwards: 4, reactions: 8 });
    }

    #[test]
    fn test_group_by_and_days() {
        let posts = sample_posts();

        assert_eq!(
            group_by(&posts, |p| &p.source),
            vec![
                Breakdown { key: "CoinDesk".to_string(), posts: 3, views: 15 },
                Breakdown { key: "Decrypt".to_string(), posts: 1, views: 50 },
            ]
        );
        assert_eq!(
            posts_by_day(&posts),
            vec![
                (NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_today_starts_at_midnight() {
        let mut storage = MockAnalyticsStorage::new();
        storage
            .expect_posts_since()
            .withf(|since| *since == Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap())
            .times(1)
            .returning(|_| Ok(vec![post("CoinDesk", "news", 19, 5)]));

        let report = DefaultAnalyticsService::new(Arc::new(storage)).today(now()).await.unwrap();

        assert_eq!(report.totals.posts, 1);
        assert_eq!(report.by_source.len(), 1);
    }

    #[tokio::test]
    async fn test_week_ranks_sources_by_views() {
        let mut storage = MockAnalyticsStorage::new();
        storage
            .expect_posts_since()
            .withf(|since| *since == now() - Duration::days(7))
            .returning(|_| Ok(sample_posts()));

        let report = DefaultAnalyticsService::new(Arc::new(storage)).week(now()).await.unwrap();

        assert_eq!(report.totals.posts, 4);
        assert_eq!(report.by_day.len(), 3);
        assert_eq!(report.top_sources[0].key, "Decrypt");
    }

    #[tokio::test]
    async fn test_by_theme_ranks_by_post_count() {
        let mut storage = MockAnalyticsStorage::new();
        storage.expect_posts_since().returning(|_| Ok(sample_posts()));

        let themes =
            DefaultAnalyticsService::new(Arc::new(storage)).by_theme(now()).await.unwrap();

        let keys: Vec<_> = themes.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["news", "analysis", "defi"]);
    }
}
