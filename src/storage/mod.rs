mod entities;
/// SQLite implementation of the storage traits.
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
pub use entities::{
    AlertWindow, CryptoEvent, EventCategory, EventOrigin, NewEvent, NewPost, PostRecord,
    ScheduledPost,
};
use mockall::automock;
use thiserror::Error;

/// Errors of the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A query failed.
    #[error("Database error: {0}")]
    DbError(String),
    /// The schema could not be migrated.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    /// A stored row could not be converted.
    #[error("Data integrity error: Stored row '{0}' is invalid: {1}")]
    DataIntegrityError(String, String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::DbError(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Key/value store for runtime settings documents.
#[automock]
#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// Get the raw value stored under `key`.
    async fn get_setting(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace the value stored under `key`.
    async fn set_setting(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Per-source set of already published items.
#[automock]
#[async_trait]
pub trait PostedStorage: Send + Sync {
    /// Check whether `item_hash` was already published for `source_key`.
    async fn is_posted(&self, source_key: &str, item_hash: &str) -> StorageResult<bool>;

    /// Record `item_hash` as published for `source_key`. Returns `false` if it
    /// was already recorded.
    async fn mark_posted(
        &self,
        source_key: &str,
        item_hash: &str,
        link: &str,
    ) -> StorageResult<bool>;
}

/// Published posts, used for reports and digests.
#[automock]
#[async_trait]
pub trait AnalyticsStorage: Send + Sync {
    /// Record a published post and return its row id.
    async fn record_post(&self, post: NewPost, posted_at: DateTime<Utc>) -> StorageResult<i64>;

    /// All posts published at or after `since`, oldest first.
    async fn posts_since(&self, since: DateTime<Utc>) -> StorageResult<Vec<PostRecord>>;

    /// Posts with the most views, newest first on ties.
    async fn top_posts(&self, limit: u32) -> StorageResult<Vec<PostRecord>>;

    /// Latest posts of `theme` published at or after `since`, newest first.
    async fn recent_posts_by_theme(
        &self,
        theme: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> StorageResult<Vec<PostRecord>>;
}

/// Calendar events and their alert flags.
#[automock]
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Find an event by title, optionally narrowed to the day it starts on and
    /// to its origin.
    async fn find_event(
        &self,
        title: &str,
        day: Option<NaiveDate>,
        origin: Option<EventOrigin>,
    ) -> StorageResult<Option<CryptoEvent>>;

    /// Store a new event and return its row id.
    async fn insert_event(&self, event: NewEvent) -> StorageResult<i64>;

    /// Set the source URL of an event that has none. Returns `true` if the row
    /// was updated.
    async fn set_event_url_if_missing(&self, id: i64, url: &str) -> StorageResult<bool>;

    /// Events starting within `[start, end]`, ordered by start.
    async fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category: Option<EventCategory>,
    ) -> StorageResult<Vec<CryptoEvent>>;

    /// Events starting within `[start, end]` whose `window` alert was not sent.
    async fn events_pending_alert(
        &self,
        window: AlertWindow,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<CryptoEvent>>;

    /// Flip the `window` flag of an event from unset to set. Returns `false`
    /// when the flag was already set.
    async fn mark_alert_sent(&self, id: i64, window: AlertWindow) -> StorageResult<bool>;
}

/// Daily digest definitions.
#[automock]
#[async_trait]
pub trait ScheduleStorage: Send + Sync {
    /// Every schedule, ordered by time of day.
    async fn list_schedules(&self) -> StorageResult<Vec<ScheduledPost>>;

    /// Store a new enabled schedule and return its id.
    async fn add_schedule(
        &self,
        hour: u8,
        minute: u8,
        theme: &str,
        max_posts: u32,
    ) -> StorageResult<i64>;

    /// Flip the enabled flag. Returns the new state, or `None` when the
    /// schedule does not exist.
    async fn toggle_schedule(&self, id: i64) -> StorageResult<Option<bool>>;

    /// Claim today's run of a schedule. Returns `false` if it already ran on
    /// `day`.
    async fn claim_schedule_run(&self, id: i64, day: NaiveDate) -> StorageResult<bool>;
}
