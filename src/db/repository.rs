use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::models::{DateInfo, PrayerName, Schedule};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Schedule cache ─────────────────────────────────────────────────────────

pub struct CacheRepo;

impl CacheRepo {
    /// Last good schedule for a city and day. A row that no longer validates
    /// is treated as absent.
    pub fn get(conn: &Connection, city_key: &str, date: NaiveDate) -> Result<Option<Schedule>> {
        let row = conn
            .query_row(
                "SELECT fajr, sunrise, dhuhr, asr, maghrib, isha, date_info
                 FROM schedule_cache WHERE city_key = ?1 AND date = ?2",
                params![city_key, date.format(DATE_FMT).to_string()],
                |row| {
                    let mut timings = Vec::with_capacity(6);
                    for i in 0..6 {
                        timings.push(row.get::<_, String>(i)?);
                    }
                    Ok((timings, row.get::<_, Option<String>>(6)?))
                },
            )
            .optional()?;

        let Some((timings, date_info)) = row else {
            return Ok(None);
        };
        let date_info: DateInfo = date_info
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();

        match Schedule::from_timings(date, |name| Some(timings[name.index()].as_str()), date_info) {
            Ok(schedule) => Ok(Some(schedule)),
            Err(e) => {
                log::warn!("ignoring cached schedule for {} on {}: {}", city_key, date, e);
                Ok(None)
            }
        }
    }

    pub fn store(conn: &Connection, city_key: &str, schedule: &Schedule) -> Result<()> {
        let t = schedule.timings();
        let date_info = serde_json::to_string(schedule.date_info())?;
        conn.execute(
            "INSERT OR REPLACE INTO schedule_cache
                (city_key, date, fajr, sunrise, dhuhr, asr, maghrib, isha, date_info)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                city_key,
                schedule.calendar_date().format(DATE_FMT).to_string(),
                t[PrayerName::Fajr],
                t[PrayerName::Sunrise],
                t[PrayerName::Dhuhr],
                t[PrayerName::Asr],
                t[PrayerName::Maghrib],
                t[PrayerName::Isha],
                date_info,
            ],
        )?;
        Ok(())
    }

    /// Drops cached days older than `date`. Returns the number of rows removed.
    pub fn prune_before(conn: &Connection, date: NaiveDate) -> Result<usize> {
        let removed = conn.execute(
            "DELETE FROM schedule_cache WHERE date < ?1",
            params![date.format(DATE_FMT).to_string()],
        )?;
        Ok(removed)
    }
}

// ─── Pending reminders ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderStatus {
    Pending,
    Delivered,
    Expired,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Delivered => "delivered",
            ReminderStatus::Expired => "expired",
        }
    }
}

impl FromStr for ReminderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReminderStatus::Pending),
            "delivered" => Ok(ReminderStatus::Delivered),
            "expired" => Ok(ReminderStatus::Expired),
            _ => Err(anyhow!("Unknown reminder status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReminder {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub fire_at: NaiveDateTime,
    pub status: ReminderStatus,
}

pub struct ReminderRepo;

impl ReminderRepo {
    pub fn insert(
        conn: &Connection,
        title: &str,
        body: &str,
        fire_at: NaiveDateTime,
    ) -> rusqlite::Result<i64> {
        conn.execute(
            "INSERT INTO pending_reminders (title, body, fire_at, status)
             VALUES (?1, ?2, ?3, 'pending')",
            params![title, body, fire_at.format(DATETIME_FMT).to_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Removes every reminder that has not fired yet.
    pub fn cancel_pending(conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute("DELETE FROM pending_reminders WHERE status = 'pending'", [])
    }

    pub fn pending(conn: &Connection) -> Result<Vec<StoredReminder>> {
        Self::query(
            conn,
            "SELECT id, title, body, fire_at, status FROM pending_reminders
             WHERE status = 'pending' ORDER BY fire_at, id",
            None,
        )
    }

    /// Pending reminders whose fire time is at or before `now`.
    pub fn due(conn: &Connection, now: NaiveDateTime) -> Result<Vec<StoredReminder>> {
        Self::query(
            conn,
            "SELECT id, title, body, fire_at, status FROM pending_reminders
             WHERE status = 'pending' AND fire_at <= ?1 ORDER BY fire_at, id",
            Some(now),
        )
    }

    pub fn mark(conn: &Connection, id: i64, status: ReminderStatus) -> Result<()> {
        conn.execute(
            "UPDATE pending_reminders SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(())
    }

    /// Forgets delivered and expired reminders that fired before `before`.
    pub fn purge_finished(conn: &Connection, before: NaiveDateTime) -> Result<usize> {
        let removed = conn.execute(
            "DELETE FROM pending_reminders WHERE status != 'pending' AND fire_at < ?1",
            params![before.format(DATETIME_FMT).to_string()],
        )?;
        Ok(removed)
    }

    fn query(
        conn: &Connection,
        sql: &str,
        now: Option<NaiveDateTime>,
    ) -> Result<Vec<StoredReminder>> {
        let mut stmt = conn.prepare(sql)?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(i64, String, String, String, String)> {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        };
        let rows = match now {
            Some(now) => stmt
                .query_map(params![now.format(DATETIME_FMT).to_string()], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt.query_map([], map_row)?.collect::<rusqlite::Result<Vec<_>>>()?,
        };

        let mut result = Vec::with_capacity(rows.len());
        for (id, title, body, fire_at, status) in rows {
            result.push(StoredReminder {
                id,
                title,
                body,
                fire_at: NaiveDateTime::parse_from_str(&fire_at, DATETIME_FMT)
                    .map_err(|e| anyhow!("Bad fire time '{}': {}", fire_at, e))?,
                status: ReminderStatus::from_str(&status)?,
            });
        }
        Ok(result)
    }
}

// ─── App meta ───────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}
