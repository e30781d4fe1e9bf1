use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::Mutex;

use crate::db::repository::CacheRepo;
use crate::models::{City, Schedule};

use super::client::{FetchError, Fetched, Origin, ScheduleSource};

/// Read-through cache in front of another source. Good answers are stored in
/// `schedule_cache`; when the source fails the last stored schedule for the
/// same city and day is served instead.
pub struct CachedSource<S> {
    inner: S,
    conn: Mutex<Connection>,
}

impl<S: ScheduleSource> CachedSource<S> {
    pub fn new(inner: S, conn: Connection) -> Self {
        Self {
            inner,
            conn: Mutex::new(conn),
        }
    }

    /// Cached schedule only, without asking the source.
    pub fn cached(&self, city: &City, date: NaiveDate) -> Option<Schedule> {
        let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match CacheRepo::get(&conn, &city.key(), date) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("reading cached schedule failed: {:#}", e);
                None
            }
        }
    }
}

impl<S: ScheduleSource> ScheduleSource for CachedSource<S> {
    fn fetch(&self, city: &City, date: NaiveDate) -> Result<Schedule, FetchError> {
        self.fetch_tracked(city, date).map(|fetched| fetched.schedule)
    }

    fn fetch_tracked(&self, city: &City, date: NaiveDate) -> Result<Fetched, FetchError> {
        match self.inner.fetch(city, date) {
            Ok(schedule) => {
                let conn = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Err(e) = CacheRepo::store(&conn, &city.key(), &schedule) {
                    log::warn!("caching schedule for {} failed: {:#}", city.label, e);
                }
                if let Err(e) = CacheRepo::prune_before(&conn, date - chrono::Duration::days(7)) {
                    log::debug!("pruning schedule cache failed: {:#}", e);
                }
                Ok(Fetched {
                    schedule,
                    origin: Origin::Live,
                })
            }
            Err(e) => match self.cached(city, date) {
                Some(schedule) => {
                    log::warn!("fetch for {} failed ({}), using cached schedule", city.label, e);
                    Ok(Fetched {
                        schedule,
                        origin: Origin::Cached,
                    })
                }
                None => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::schedule::tests::{day, sample};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Flaky {
        up: AtomicBool,
    }

    impl ScheduleSource for Flaky {
        fn fetch(&self, _city: &City, _date: NaiveDate) -> Result<Schedule, FetchError> {
            if self.up.load(Ordering::SeqCst) {
                Ok(sample())
            } else {
                Err(FetchError::Status(503))
            }
        }
    }

    fn cached_source(up: bool) -> CachedSource<Flaky> {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        CachedSource::new(Flaky { up: AtomicBool::new(up) }, conn)
    }

    #[test]
    fn failure_with_empty_cache_is_reported() {
        let source = cached_source(false);
        assert!(matches!(
            source.fetch(&City::default(), day()),
            Err(FetchError::Status(503))
        ));
    }

    #[test]
    fn last_good_schedule_survives_an_outage() {
        let source = cached_source(true);
        let city = City::default();
        source.fetch(&city, day()).unwrap();

        assert_eq!(source.fetch_tracked(&city, day()).unwrap().origin, Origin::Live);

        source.inner.up.store(false, Ordering::SeqCst);
        let fallback = source.fetch_tracked(&city, day()).unwrap();
        assert_eq!(fallback.schedule, sample());
        assert_eq!(fallback.origin, Origin::Cached);
        assert_eq!(source.fetch(&city, day()).unwrap(), sample());
        assert!(source.fetch(&City::new("Konya", "Turkey", "Konya"), day()).is_err());
    }

    #[test]
    fn cached_reads_without_fetching() {
        let source = cached_source(true);
        assert!(source.cached(&City::default(), day()).is_none());
        source.fetch(&City::default(), day()).unwrap();
        assert_eq!(source.cached(&City::default(), day()), Some(sample()));
    }
}
