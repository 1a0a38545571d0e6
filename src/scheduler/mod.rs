mod alerts;
mod digest;
#[cfg(test)]
mod tests;

pub use alerts::AlertScheduler;
pub use digest::{DigestScheduler, MAX_DIGEST_POSTS};
use futures::future::join_all;
use thiserror::Error;

use crate::{
    calendar::CalendarError, destination::Destination, messaging::MessagingService,
    settings::SettingsError, storage::StorageError,
};

/// Errors of the alert and digest checks.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Settings could not be loaded.
    #[error("Failed to read settings: {0}")]
    Settings(#[from] SettingsError),
    /// A storage call failed.
    #[error("Failed to access storage: {0}")]
    Storage(#[from] StorageError),
    /// The calendar could not be refreshed.
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

/// Result type for the schedulers.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Send `text` to every destination. Returns how many accepted it.
async fn broadcast(
    messaging_service: &dyn MessagingService,
    destinations: &[Destination],
    text: &str,
) -> usize {
    let sends = destinations.iter().map(|destination| async move {
        match messaging_service.publish(destination, text.to_string(), None).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Failed to send to {destination}: {e}");
                false
            }
        }
    });

    join_all(sends).await.into_iter().filter(|delivered| *delivered).count()
}
