use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE TABLE IF NOT EXISTS schedule_cache (
            city_key   TEXT NOT NULL,
            date       TEXT NOT NULL,
            fajr       TEXT NOT NULL,
            sunrise    TEXT NOT NULL,
            dhuhr      TEXT NOT NULL,
            asr        TEXT NOT NULL,
            maghrib    TEXT NOT NULL,
            isha       TEXT NOT NULL,
            date_info  TEXT,
            fetched_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (city_key, date)
        );

        CREATE TABLE IF NOT EXISTS pending_reminders (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            body        TEXT NOT NULL,
            fire_at     TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'pending'
                        CHECK(status IN ('pending','delivered','expired')),
            created_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_pending_reminders_due
            ON pending_reminders (status, fire_at);
    ")?;
    Ok(())
}
