use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{
    FromRow, Pool, Sqlite, migrate,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use super::{
    AlertWindow, AnalyticsStorage, CryptoEvent, EventCategory, EventOrigin, EventStorage, NewEvent,
    NewPost, PostRecord, PostedStorage, ScheduleStorage, ScheduledPost, SettingsStorage,
    StorageError, StorageResult,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const EVENT_COLUMNS: &str = "id, title, description, starts_at, ends_at, category, coin, origin, \
                             source_url, location, importance, alert_1day_sent, alert_1hour_sent";
const POST_COLUMNS: &str =
    "id, message_id, source, title, link, theme, posted_at, views, forwards, reactions";

/// SQLite backed storage shared by every loop of the bot.
pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

impl SqliteStorage {
    /// Connect to `database_url`, creating the file if needed, and run the
    /// embedded migrations.
    pub async fn new(database_url: &str) -> StorageResult<Self> {
        tracing::debug!("Connecting to SQLite database: {database_url}");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database is a separate database.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        migrate!("./migrations").run(&pool).await?;
        tracing::debug!("SQLite database migrated");

        Ok(Self { pool })
    }
}

#[derive(FromRow)]
struct EventRow {
    id: i64,
    title: String,
    description: Option<String>,
    starts_at: i64,
    ends_at: Option<i64>,
    category: String,
    coin: Option<String>,
    origin: String,
    source_url: Option<String>,
    location: Option<String>,
    importance: i64,
    alert_1day_sent: bool,
    alert_1hour_sent: bool,
}

impl TryFrom<EventRow> for CryptoEvent {
    type Error = StorageError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let invalid = |reason: String| StorageError::DataIntegrityError(row.title.clone(), reason);
        let starts_at = from_unix(row.starts_at)
            .ok_or_else(|| invalid(format!("bad start timestamp {}", row.starts_at)))?;
        let category = EventCategory::from_str(&row.category).map_err(invalid)?;
        let origin = EventOrigin::from_str(&row.origin).map_err(invalid)?;

        Ok(CryptoEvent {
            id: row.id,
            title: row.title.clone(),
            description: row.description,
            starts_at,
            ends_at: row.ends_at.and_then(from_unix),
            category,
            coin: row.coin,
            origin,
            source_url: row.source_url,
            location: row.location,
            importance: row.importance.clamp(1, 10) as u8,
            alert_1day_sent: row.alert_1day_sent,
            alert_1hour_sent: row.alert_1hour_sent,
        })
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    message_id: Option<i64>,
    source: String,
    title: String,
    link: String,
    theme: String,
    posted_at: i64,
    views: i64,
    forwards: i64,
    reactions: i64,
}

impl TryFrom<PostRow> for PostRecord {
    type Error = StorageError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let posted_at = from_unix(row.posted_at).ok_or_else(|| {
            StorageError::DataIntegrityError(
                row.link.clone(),
                format!("bad timestamp {}", row.posted_at),
            )
        })?;

        Ok(PostRecord {
            id: row.id,
            message_id: row.message_id.and_then(|id| i32::try_from(id).ok()),
            source: row.source,
            title: row.title,
            link: row.link,
            theme: row.theme,
            posted_at,
            views: row.views,
            forwards: row.forwards,
            reactions: row.reactions,
        })
    }
}

#[derive(FromRow)]
struct ScheduleRow {
    id: i64,
    hour: i64,
    minute: i64,
    theme: String,
    max_posts: i64,
    enabled: bool,
    last_run_on: Option<String>,
}

impl From<ScheduleRow> for ScheduledPost {
    fn from(row: ScheduleRow) -> Self {
        ScheduledPost {
            id: row.id,
            hour: row.hour.clamp(0, 23) as u8,
            minute: row.minute.clamp(0, 59) as u8,
            theme: row.theme,
            max_posts: row.max_posts.max(0) as u32,
            enabled: row.enabled,
            last_run_on: row
                .last_run_on
                .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
        }
    }
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

fn collect_events(rows: Vec<EventRow>) -> StorageResult<Vec<CryptoEvent>> {
    rows.into_iter().map(CryptoEvent::try_from).collect()
}

fn collect_posts(rows: Vec<PostRow>) -> StorageResult<Vec<PostRecord>> {
    rows.into_iter().map(PostRecord::try_from).collect()
}

#[async_trait]
impl SettingsStorage for SqliteStorage {
    async fn get_setting(&self, key: &str) -> StorageResult<Option<String>> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM bot_config WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value.map(|(v,)| v))
    }

    async fn set_setting(&self, key: &str, value: &str) -> StorageResult<()> {
        tracing::debug!("Saving setting {key}");
        sqlx::query(
            "INSERT INTO bot_config (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PostedStorage for SqliteStorage {
    async fn is_posted(&self, source_key: &str, item_hash: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posted_items WHERE source_key = ? AND item_hash = ?",
        )
        .bind(source_key)
        .bind(item_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn mark_posted(
        &self,
        source_key: &str,
        item_hash: &str,
        link: &str,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO posted_items (source_key, item_hash, link, posted_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(source_key)
        .bind(item_hash)
        .bind(link)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AnalyticsStorage for SqliteStorage {
    async fn record_post(&self, post: NewPost, posted_at: DateTime<Utc>) -> StorageResult<i64> {
        let result = sqlx::query(
            "INSERT INTO post_analytics (message_id, source, title, link, theme, posted_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(post.message_id)
        .bind(&post.source)
        .bind(&post.title)
        .bind(&post.link)
        .bind(&post.theme)
        .bind(posted_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn posts_since(&self, since: DateTime<Utc>) -> StorageResult<Vec<PostRecord>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM post_analytics WHERE posted_at >= ? ORDER BY posted_at, id"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(since.timestamp())
            .fetch_all(&self.pool)
            .await?;
        collect_posts(rows)
    }

    async fn top_posts(&self, limit: u32) -> StorageResult<Vec<PostRecord>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM post_analytics ORDER BY views DESC, posted_at DESC LIMIT ?"
        );
        let rows =
            sqlx::query_as::<_, PostRow>(&sql).bind(limit as i64).fetch_all(&self.pool).await?;
        collect_posts(rows)
    }

    async fn recent_posts_by_theme(
        &self,
        theme: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> StorageResult<Vec<PostRecord>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM post_analytics WHERE theme = ? AND posted_at >= ?
             ORDER BY posted_at DESC, id DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(theme)
            .bind(since.timestamp())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        collect_posts(rows)
    }
}

#[async_trait]
impl EventStorage for SqliteStorage {
    async fn find_event(
        &self,
        title: &str,
        day: Option<NaiveDate>,
        origin: Option<EventOrigin>,
    ) -> StorageResult<Option<CryptoEvent>> {
        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM crypto_events WHERE title = ?");
        if day.is_some() {
            sql.push_str(" AND starts_at >= ? AND starts_at < ?");
        }
        if origin.is_some() {
            sql.push_str(" AND origin = ?");
        }
        sql.push_str(" ORDER BY id LIMIT 1");

        let mut query = sqlx::query_as::<_, EventRow>(&sql).bind(title);
        if let Some(day) = day {
            let start = day.and_time(NaiveTime::MIN).and_utc().timestamp();
            query = query.bind(start).bind(start + 86_400);
        }
        if let Some(origin) = origin {
            query = query.bind(origin.as_str());
        }

        query.fetch_optional(&self.pool).await?.map(CryptoEvent::try_from).transpose()
    }

    async fn insert_event(&self, event: NewEvent) -> StorageResult<i64> {
        tracing::debug!("Inserting event: {}", event.title);
        let result = sqlx::query(
            "INSERT INTO crypto_events (title, description, starts_at, ends_at, category, coin,
             origin, source_url, location, importance, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.starts_at.timestamp())
        .bind(event.ends_at.map(|t| t.timestamp()))
        .bind(event.category.as_str())
        .bind(&event.coin)
        .bind(event.origin.as_str())
        .bind(&event.source_url)
        .bind(&event.location)
        .bind(i64::from(event.importance.clamp(1, 10)))
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn set_event_url_if_missing(&self, id: i64, url: &str) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE crypto_events SET source_url = ?
             WHERE id = ? AND (source_url IS NULL OR source_url = '')",
        )
        .bind(url)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category: Option<EventCategory>,
    ) -> StorageResult<Vec<CryptoEvent>> {
        let mut sql = format!(
            "SELECT {EVENT_COLUMNS} FROM crypto_events WHERE starts_at >= ? AND starts_at <= ?"
        );
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        sql.push_str(" ORDER BY starts_at, id");

        let mut query =
            sqlx::query_as::<_, EventRow>(&sql).bind(start.timestamp()).bind(end.timestamp());
        if let Some(category) = category {
            query = query.bind(category.as_str());
        }

        collect_events(query.fetch_all(&self.pool).await?)
    }

    async fn events_pending_alert(
        &self,
        window: AlertWindow,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<CryptoEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM crypto_events
             WHERE starts_at >= ? AND starts_at <= ? AND {} = 0 ORDER BY starts_at, id",
            window.column()
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(start.timestamp())
            .bind(end.timestamp())
            .fetch_all(&self.pool)
            .await?;
        collect_events(rows)
    }

    async fn mark_alert_sent(&self, id: i64, window: AlertWindow) -> StorageResult<bool> {
        let column = window.column();
        let sql = format!("UPDATE crypto_events SET {column} = 1 WHERE id = ? AND {column} = 0");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ScheduleStorage for SqliteStorage {
    async fn list_schedules(&self) -> StorageResult<Vec<ScheduledPost>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            "SELECT id, hour, minute, theme, max_posts, enabled, last_run_on
             FROM scheduled_posts ORDER BY hour, minute, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ScheduledPost::from).collect())
    }

    async fn add_schedule(
        &self,
        hour: u8,
        minute: u8,
        theme: &str,
        max_posts: u32,
    ) -> StorageResult<i64> {
        let result = sqlx::query(
            "INSERT INTO scheduled_posts (hour, minute, theme, max_posts) VALUES (?, ?, ?, ?)",
        )
        .bind(i64::from(hour))
        .bind(i64::from(minute))
        .bind(theme)
        .bind(i64::from(max_posts))
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn toggle_schedule(&self, id: i64) -> StorageResult<Option<bool>> {
        let enabled: Option<bool> = sqlx::query_scalar(
            "UPDATE scheduled_posts SET enabled = 1 - enabled WHERE id = ? RETURNING enabled",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enabled)
    }

    async fn claim_schedule_run(&self, id: i64, day: NaiveDate) -> StorageResult<bool> {
        let day = day.format(DATE_FORMAT).to_string();
        let result = sqlx::query(
            "UPDATE scheduled_posts SET last_run_on = ?
             WHERE id = ? AND (last_run_on IS NULL OR last_run_on <> ?)",
        )
        .bind(&day)
        .bind(id)
        .bind(&day)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
