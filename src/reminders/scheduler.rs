use chrono::NaiveDateTime;

use crate::models::{PrayerMap, PrayerName, PreferenceSet, Schedule};

use super::notifier::{NotificationHandle, NotifyError, Notifier};
use super::planner::{plan, PlannedReminder};

/// A reminder the notifier accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledReminder {
    pub prayer: PrayerName,
    pub fire_at: NaiveDateTime,
    pub message: String,
    pub handle: NotificationHandle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub scheduled: Vec<PrayerName>,
    pub dropped: Vec<PrayerName>,
}

/// Owns the live set of reminders and keeps it equal to the latest plan.
///
/// Every [`apply`](Self::apply) cancels everything first and then submits the
/// whole plan, so no stale or duplicate reminder survives a change of
/// schedule, city or preferences.
pub struct ReminderScheduler<N: Notifier> {
    notifier: N,
    active: PrayerMap<Option<ScheduledReminder>>,
}

impl<N: Notifier> ReminderScheduler<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            active: PrayerMap::from_fn(|_| None),
        }
    }

    /// Replaces all pending reminders with `plan`.
    ///
    /// An entry the notifier rejects is dropped and the rest still apply. If
    /// the cancel step itself fails nothing is submitted and the error is
    /// returned.
    pub fn apply(&mut self, plan: &[PlannedReminder]) -> Result<ApplyReport, NotifyError> {
        self.notifier.cancel_all()?;
        self.active = PrayerMap::from_fn(|_| None);

        let mut report = ApplyReport::default();
        for entry in plan {
            if self.active[entry.prayer].is_some() {
                log::debug!("ignoring second {:?} entry in plan", entry.prayer);
                report.dropped.push(entry.prayer);
                continue;
            }
            match self.notifier.schedule(&entry.title, &entry.body, entry.fire_at) {
                Ok(handle) => {
                    self.active[entry.prayer] = Some(ScheduledReminder {
                        prayer: entry.prayer,
                        fire_at: entry.fire_at,
                        message: entry.body.clone(),
                        handle,
                    });
                    report.scheduled.push(entry.prayer);
                }
                Err(e) => {
                    log::warn!("reminder for {:?} at {} dropped: {}", entry.prayer, entry.fire_at, e);
                    report.dropped.push(entry.prayer);
                }
            }
        }
        log::info!(
            "reminders applied: {} scheduled, {} dropped",
            report.scheduled.len(),
            report.dropped.len()
        );
        Ok(report)
    }

    /// Plans against `schedule` and applies the result.
    pub fn replan(
        &mut self,
        schedule: &Schedule,
        prefs: &PreferenceSet,
        now: NaiveDateTime,
    ) -> Result<ApplyReport, NotifyError> {
        self.apply(&plan(schedule, prefs, now))
    }

    pub fn active(&self) -> impl Iterator<Item = &ScheduledReminder> {
        self.active.values().iter().flatten()
    }

    pub fn active_for(&self, prayer: PrayerName) -> Option<&ScheduledReminder> {
        self.active[prayer].as_ref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}
