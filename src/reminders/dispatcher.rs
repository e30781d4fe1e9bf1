use anyhow::Result;
use chrono::NaiveDateTime;
use notify_rust::Notification;
use rusqlite::Connection;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::settings::NotificationConfig;
use crate::db::repository::{ReminderRepo, ReminderStatus};
use crate::utils::clock;

use super::notifier::NotifyError;

/// Shows a reminder to the user.
pub trait Alert: Send {
    fn show(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Desktop notification through the platform notification service.
pub struct DesktopAlert {
    app_name: String,
}

impl DesktopAlert {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }
}

impl Alert for DesktopAlert {
    fn show(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        Notification::new()
            .summary(title)
            .body(body)
            .appname(&self.app_name)
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
    pub poll: Duration,
    /// Reminders found later than this after their fire time are expired
    /// instead of shown.
    pub late_grace: chrono::Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self {
            poll: config.poll(),
            late_grace: config.late_grace(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub expired: usize,
    pub failed: usize,
}

/// Delivers every due reminder once. Failed deliveries stay pending and are
/// retried on the next pass until they run out of grace.
pub fn deliver_due(
    conn: &Connection,
    alert: &dyn Alert,
    now: NaiveDateTime,
    late_grace: chrono::Duration,
) -> Result<DeliveryReport> {
    let mut report = DeliveryReport::default();
    for reminder in ReminderRepo::due(conn, now)? {
        if now - reminder.fire_at > late_grace {
            log::info!("reminder '{}' for {} expired", reminder.title, reminder.fire_at);
            ReminderRepo::mark(conn, reminder.id, ReminderStatus::Expired)?;
            report.expired += 1;
            continue;
        }
        match alert.show(&reminder.title, &reminder.body) {
            Ok(()) => {
                log::info!("delivered reminder '{}'", reminder.title);
                ReminderRepo::mark(conn, reminder.id, ReminderStatus::Delivered)?;
                report.delivered += 1;
            }
            Err(e) => {
                log::warn!("could not show reminder '{}': {}", reminder.title, e);
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Polls the queue until `stop` fires or its sender is dropped.
pub fn run(
    conn: &Connection,
    alert: &dyn Alert,
    settings: DispatchSettings,
    stop: &Receiver<()>,
) -> Result<()> {
    let purged = ReminderRepo::purge_finished(conn, clock::now() - chrono::Duration::days(7))?;
    if purged > 0 {
        log::debug!("purged {} finished reminder(s)", purged);
    }
    loop {
        if let Err(e) = deliver_due(conn, alert, clock::now(), settings.late_grace) {
            log::warn!("reminder delivery pass failed: {:#}", e);
        }
        match stop.recv_timeout(settings.poll) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}

/// Background delivery thread. Stopped on [`Dispatcher::stop`] or drop.
pub struct Dispatcher {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn spawn<A: Alert + 'static>(conn: Connection, alert: A, settings: DispatchSettings) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            if let Err(e) = run(&conn, &alert, settings, &stop_rx) {
                log::warn!("reminder dispatcher stopped: {:#}", e);
            }
        });
        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
