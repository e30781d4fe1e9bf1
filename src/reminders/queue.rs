use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::path::Path;

use crate::db;
use crate::db::repository::{ReminderRepo, StoredReminder};
use crate::utils::clock;

use super::notifier::{NotificationHandle, NotifyError, Notifier};

/// Desktop stand-in for a platform's scheduled local notifications: accepted
/// reminders are persisted in `pending_reminders` and outlive the process.
/// A [`Dispatcher`](super::dispatcher::Dispatcher) raises them when due.
pub struct ReminderQueue {
    conn: Connection,
    clock: fn() -> NaiveDateTime,
}

impl ReminderQueue {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(db::open(db_path)?))
    }

    pub fn new(conn: Connection) -> Self {
        Self::with_clock(conn, clock::now)
    }

    pub fn with_clock(conn: Connection, clock: fn() -> NaiveDateTime) -> Self {
        Self { conn, clock }
    }

    pub fn pending(&self) -> Result<Vec<StoredReminder>> {
        ReminderRepo::pending(&self.conn)
    }
}

impl Notifier for ReminderQueue {
    fn schedule(
        &mut self,
        title: &str,
        body: &str,
        fire_at: NaiveDateTime,
    ) -> Result<NotificationHandle, NotifyError> {
        if fire_at <= (self.clock)() {
            return Err(NotifyError::PastFireTime(fire_at));
        }
        let id = ReminderRepo::insert(&self.conn, title, body, fire_at)?;
        log::debug!("queued reminder #{} '{}' at {}", id, title, fire_at);
        Ok(NotificationHandle(id))
    }

    fn cancel_all(&mut self) -> Result<(), NotifyError> {
        let removed = ReminderRepo::cancel_pending(&self.conn)?;
        log::debug!("cancelled {} pending reminder(s)", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::schedule::tests::{day, hm, sample};
    use crate::models::PreferenceSet;
    use crate::reminders::ReminderScheduler;

    fn one_pm() -> NaiveDateTime {
        day().and_time(hm(13, 0))
    }

    fn queue() -> ReminderQueue {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        ReminderQueue::with_clock(conn, one_pm)
    }

    #[test]
    fn rejects_fire_times_in_the_past() {
        let mut q = queue();
        let err = q.schedule("t", "b", day().and_time(hm(12, 0))).unwrap_err();
        assert!(matches!(err, NotifyError::PastFireTime(_)));
        assert!(q.schedule("t", "b", one_pm()).is_err());
        assert!(q.schedule("t", "b", day().and_time(hm(13, 1))).is_ok());
    }

    #[test]
    fn scheduler_over_queue_keeps_one_copy_per_prayer() {
        let mut scheduler = ReminderScheduler::new(queue());
        let prefs = PreferenceSet::all_enabled();
        scheduler.replan(&sample(), &prefs, one_pm()).unwrap();
        scheduler.replan(&sample(), &prefs, one_pm()).unwrap();

        let pending = scheduler.notifier().pending().unwrap();
        let titles: Vec<&str> = pending.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["İkindi Vakti", "Akşam Vakti", "Yatsı Vakti"]);
    }

    #[test]
    fn queued_reminders_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vakit.db");
        {
            let mut q = ReminderQueue::open(&path).unwrap();
            let far = chrono::NaiveDate::from_ymd_opt(2999, 1, 1).unwrap().and_time(hm(19, 50));
            q.schedule("Yatsı Vakti", "b", far).unwrap();
        }
        let q = ReminderQueue::open(&path).unwrap();
        assert_eq!(q.pending().unwrap().len(), 1);
    }
}
