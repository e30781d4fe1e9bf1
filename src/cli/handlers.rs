use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::str::FromStr;
use std::sync::mpsc;

use crate::cli::args::NotifyCommands;
use crate::config::AppConfig;
use crate::models::city::{builtin_cities, find, search};
use crate::models::{City, PrayerName, PreferenceSet, Schedule};
use crate::prayer_times::{CachedSource, Fetched, Origin, ScheduleSource};
use crate::reminders::dispatcher::{deliver_due, run};
use crate::reminders::{DesktopAlert, DispatchSettings, Notifier, ReminderQueue, ReminderScheduler};
use crate::storage::{load_preferences, save_city, save_preferences, KeyValueStore};
use crate::timeline::compute;
use crate::utils::clock;
use crate::utils::format::{format_time, pad_right, progress_bar};
use crate::utils::hijri::hijri_line;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn parse_prayer(raw: &str) -> Result<PrayerName> {
    PrayerName::from_str(raw).map_err(|_| {
        anyhow!(
            "Unknown prayer '{}'. Use: fajr, sunrise, dhuhr, asr, maghrib, isha",
            raw
        )
    })
}

/// Rebuilds the reminder set for `schedule`, reporting the outcome in one line.
fn replan<N: Notifier>(
    scheduler: &mut ReminderScheduler<N>,
    schedule: &Schedule,
    prefs: &PreferenceSet,
    now: NaiveDateTime,
) {
    match scheduler.replan(schedule, prefs, now) {
        Ok(report) => {
            if !report.dropped.is_empty() {
                log::info!("reminders not scheduled: {:?}", report.dropped);
            }
        }
        Err(e) => {
            log::warn!("could not reschedule reminders: {}", e);
            println_colored!(RED, "  ✗ Reminders could not be updated: {}", e);
        }
    }
}

fn warn_if_cached(fetched: &Fetched) {
    if fetched.origin == Origin::Cached {
        println_colored!(AMBER, "  Could not refresh prayer times, showing the stored copy");
    }
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times<S: ScheduleSource, N: Notifier>(
    source: &CachedSource<S>,
    scheduler: &mut ReminderScheduler<N>,
    city: &City,
    prefs: &PreferenceSet,
) -> Result<()> {
    let now = clock::now();
    let fetched = source
        .fetch_tracked(city, now.date())
        .with_context(|| format!("Fetching prayer times for {}", city.label))?;
    warn_if_cached(&fetched);
    let schedule = fetched.schedule;
    replan(scheduler, &schedule, prefs, now);

    let view = compute(&schedule, now.time());

    println!();
    println_colored!(
        GOLD,
        "  Namaz Vakitleri: {} ({})",
        city.label,
        schedule.calendar_date().format("%d.%m.%Y")
    );
    if let Some(hijri) = hijri_line(&schedule) {
        println_colored!(DIM, "  {}", hijri);
    }
    println!();

    for name in PrayerName::ALL {
        let bell = if prefs.is_enabled(name) { "🔔" } else { "  " };
        let label = pad_right(name.display_name(), 8);
        let time = format_time(schedule.instant(name));
        if name == view.active_prayer {
            println_colored!(AMBER, "  ▸ {}  {}  {}", label, time, bell);
        } else if schedule.instant(name) <= now.time() {
            println_colored!(DIM, "    {}  {}  {}", label, time, bell);
        } else {
            println_colored!(BOLD, "    {}  {}  {}", label, time, bell);
        }
    }

    println!();
    println_colored!(
        AMBER,
        "  {} vaktine {} kaldı",
        view.active_prayer.display_name(),
        view.remaining_label()
    );
    println_colored!(DIM, "  {} {}%", progress_bar(view.progress, 24), view.percent());
    println!();
    Ok(())
}

// ─── City ────────────────────────────────────────────────────────────────────

pub fn handle_city<S: ScheduleSource, N: Notifier>(
    store: &impl KeyValueStore,
    source: &CachedSource<S>,
    scheduler: &mut ReminderScheduler<N>,
    current: &City,
    name: Option<&str>,
) -> Result<()> {
    let Some(name) = name else {
        println_colored!(GOLD, "  {} ({})", current.label, current.country);
        return Ok(());
    };
    let city = find(&builtin_cities(), name)
        .ok_or_else(|| anyhow!("Unknown city '{}'. Try `vakit cities {}`", name, name))?;
    save_city(store, &city)?;
    println_colored!(GREEN, "  ✓ City set to {}", city.label);

    // Reminders for the previous city must not fire.
    if let Err(e) = scheduler.apply(&[]) {
        log::warn!("could not cancel reminders: {}", e);
        println_colored!(RED, "  ✗ Old reminders could not be cancelled: {}", e);
    }

    let now = clock::now();
    let prefs = load_preferences(store);
    match source.fetch_tracked(&city, now.date()) {
        Ok(fetched) => {
            warn_if_cached(&fetched);
            replan(scheduler, &fetched.schedule, &prefs, now);
        }
        Err(e) => {
            log::warn!("fetch after city change failed: {}", e);
            println_colored!(AMBER, "  Prayer times for {} are not available yet: {}", city.label, e);
        }
    }
    Ok(())
}

pub fn handle_cities(query: Option<&str>) -> Result<()> {
    let cities = search(&builtin_cities(), query.unwrap_or(""));
    if cities.is_empty() {
        println_colored!(DIM, "  No matching city");
        return Ok(());
    }
    for city in cities {
        println!("  {}", city.label);
    }
    Ok(())
}

// ─── Notify ──────────────────────────────────────────────────────────────────

/// Applies a preference change, persists the whole set and replans against
/// the cached schedule when there is one.
pub fn update_preference<S: ScheduleSource, N: Notifier>(
    store: &impl KeyValueStore,
    source: &CachedSource<S>,
    scheduler: &mut ReminderScheduler<N>,
    city: &City,
    now: NaiveDateTime,
    change: impl FnOnce(&mut PreferenceSet),
) -> Result<PreferenceSet> {
    let mut prefs = load_preferences(store);
    change(&mut prefs);
    save_preferences(store, &prefs)?;
    if let Some(schedule) = source.cached(city, now.date()) {
        replan(scheduler, &schedule, &prefs, now);
    }
    Ok(prefs)
}

pub fn handle_notify<S: ScheduleSource, N: Notifier>(
    store: &impl KeyValueStore,
    source: &CachedSource<S>,
    scheduler: &mut ReminderScheduler<N>,
    city: &City,
    action: &NotifyCommands,
) -> Result<()> {
    let now = clock::now();
    let (prefs, changed) = match action {
        NotifyCommands::List => (load_preferences(store), None),
        NotifyCommands::Toggle { prayer } => {
            let name = parse_prayer(prayer)?;
            let prefs = update_preference(store, source, scheduler, city, now, |p| {
                p.toggle(name);
            })?;
            (prefs, Some(name))
        }
        NotifyCommands::Enable { prayer } => {
            let name = parse_prayer(prayer)?;
            let prefs =
                update_preference(store, source, scheduler, city, now, |p| p.set(name, true))?;
            (prefs, Some(name))
        }
        NotifyCommands::Disable { prayer } => {
            let name = parse_prayer(prayer)?;
            let prefs =
                update_preference(store, source, scheduler, city, now, |p| p.set(name, false))?;
            (prefs, Some(name))
        }
    };

    if let Some(name) = changed {
        let state = if prefs.is_enabled(name) { "on" } else { "off" };
        println_colored!(GREEN, "  ✓ {} reminder {}", name.display_name(), state);
    }
    println!();
    println_colored!(DIM, "  {}/{} reminders on", prefs.enabled_count(), PrayerName::ALL.len());
    for (name, enabled) in prefs.iter() {
        if enabled {
            println_colored!(BOLD, "  🔔 {}", name.display_name());
        } else {
            println_colored!(DIM, "  🔕 {}", name.display_name());
        }
    }
    println!();
    Ok(())
}

// ─── Reminders ───────────────────────────────────────────────────────────────

pub fn handle_reminders(queue: &ReminderQueue) -> Result<()> {
    let pending = queue.pending()?;
    println!();
    if pending.is_empty() {
        println_colored!(DIM, "  No reminders waiting");
    } else {
        println_colored!(GOLD, "  Waiting reminders ({})", pending.len());
        println!();
        for reminder in pending {
            println!(
                "  {}  {}  {}",
                reminder.fire_at.format("%d.%m %H:%M"),
                pad_right(&reminder.title, 14),
                reminder.body
            );
        }
    }
    println!();
    Ok(())
}

// ─── Deliver ─────────────────────────────────────────────────────────────────

pub fn handle_deliver(conn: &Connection, config: &AppConfig, once: bool) -> Result<()> {
    let alert = DesktopAlert::new(&config.notifications.app_name);
    let settings = DispatchSettings::from_config(&config.notifications);

    if once {
        let report = deliver_due(conn, &alert, clock::now(), settings.late_grace)?;
        println_colored!(
            GREEN,
            "  ✓ {} delivered, {} expired, {} failed",
            report.delivered,
            report.expired,
            report.failed
        );
        return Ok(());
    }

    println_colored!(DIM, "  Delivering reminders, Ctrl+C to stop");
    let (_stop_tx, stop_rx) = mpsc::channel();
    run(conn, &alert, settings, &stop_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::schedule::tests::{day, hm, sample};
    use crate::prayer_times::client::FetchError;
    use crate::storage::load_city;
    use crate::reminders::scheduler::tests::FakeNotifier;
    use chrono::NaiveDate;

    struct Fixed;

    impl ScheduleSource for Fixed {
        fn fetch(&self, _city: &City, _date: NaiveDate) -> Result<Schedule, FetchError> {
            Ok(sample())
        }
    }

    struct Down;

    impl ScheduleSource for Down {
        fn fetch(&self, _city: &City, _date: NaiveDate) -> Result<Schedule, FetchError> {
            Err(FetchError::Status(503))
        }
    }

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn preference_change_is_saved_and_replanned() {
        let store = db();
        let source = CachedSource::new(Fixed, db());
        let mut scheduler = ReminderScheduler::new(FakeNotifier::default());
        let city = City::default();
        source.fetch(&city, day()).unwrap();

        let now = day().and_time(hm(13, 0));
        let prefs = update_preference(&store, &source, &mut scheduler, &city, now, |p| {
            p.set(PrayerName::Asr, false);
        })
        .unwrap();

        assert!(!prefs.is_enabled(PrayerName::Asr));
        assert!(!load_preferences(&store).is_enabled(PrayerName::Asr));
        let active: Vec<_> = scheduler.active().map(|r| r.prayer).collect();
        assert_eq!(active, vec![PrayerName::Maghrib, PrayerName::Isha]);
    }

    #[test]
    fn preference_change_without_schedule_only_saves() {
        let store = db();
        let source = CachedSource::new(Fixed, db());
        let mut scheduler = ReminderScheduler::new(FakeNotifier::default());
        let now = day().and_time(hm(13, 0));

        update_preference(&store, &source, &mut scheduler, &City::default(), now, |p| {
            p.toggle(PrayerName::Sunrise);
        })
        .unwrap();

        assert!(load_preferences(&store).is_enabled(PrayerName::Sunrise));
        assert!(scheduler.notifier().calls.is_empty());
    }

    #[test]
    fn city_change_cancels_reminders_even_when_fetch_fails() {
        let store = db();
        let source = CachedSource::new(Down, db());
        let mut scheduler = ReminderScheduler::new(FakeNotifier::default());
        let early = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_time(hm(0, 0));
        scheduler
            .replan(&sample(), &PreferenceSet::all_enabled(), early)
            .unwrap();
        assert_eq!(scheduler.notifier().pending.len(), 6);

        handle_city(&store, &source, &mut scheduler, &City::default(), Some("Konya")).unwrap();

        assert!(scheduler.notifier().pending.is_empty());
        assert_eq!(scheduler.active().count(), 0);
        assert_eq!(load_city(&store, &City::default()).name, "Konya");
    }

    #[test]
    fn prayer_names_parse_in_both_languages() {
        assert_eq!(parse_prayer("asr").unwrap(), PrayerName::Asr);
        assert_eq!(parse_prayer("Yatsı").unwrap(), PrayerName::Isha);
        assert!(parse_prayer("witr").is_err());
    }
}
