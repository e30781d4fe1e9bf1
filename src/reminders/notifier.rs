use chrono::NaiveDateTime;
use thiserror::Error;

/// Identifies one scheduled notification inside a [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationHandle(pub i64);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("fire time {0} is not in the future")]
    PastFireTime(NaiveDateTime),
    #[error("notification storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// A local one-shot notification facility that keeps scheduled entries on its
/// own once accepted.
pub trait Notifier {
    fn schedule(
        &mut self,
        title: &str,
        body: &str,
        fire_at: NaiveDateTime,
    ) -> Result<NotificationHandle, NotifyError>;

    fn cancel_all(&mut self) -> Result<(), NotifyError>;
}
