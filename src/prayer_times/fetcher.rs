use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::models::City;

use super::client::{FetchError, Fetched, ScheduleSource};

#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub city: City,
    pub date: NaiveDate,
    pub result: Result<Fetched, FetchError>,
}

/// Runs schedule fetches off the calling thread. Every request gets a higher
/// sequence number than the last; only the outcome of the latest request is
/// current, so a slow answer for a previous city can never overwrite a newer one.
pub struct ScheduleFetcher {
    source: Arc<dyn ScheduleSource>,
    latest: Arc<AtomicU64>,
}

impl ScheduleFetcher {
    pub fn new(source: Arc<dyn ScheduleSource>) -> Self {
        Self {
            source,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts a fetch and returns its sequence number. `deliver` runs on the
    /// worker thread with the outcome unless a newer request superseded it first.
    pub fn request<F>(&self, city: City, date: NaiveDate, deliver: F) -> u64
    where
        F: FnOnce(FetchOutcome) + Send + 'static,
    {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let source = Arc::clone(&self.source);
        let latest = Arc::clone(&self.latest);
        log::info!("fetching schedule #{} for {} on {}", seq, city.label, date);

        thread::spawn(move || {
            let result = source.fetch_tracked(&city, date);
            if latest.load(Ordering::SeqCst) != seq {
                log::debug!("schedule #{} superseded before it arrived", seq);
                return;
            }
            deliver(FetchOutcome {
                seq,
                city,
                date,
                result,
            });
        });
        seq
    }

    /// Whether `outcome` answers the most recent request.
    pub fn is_current(&self, outcome: &FetchOutcome) -> bool {
        self.latest.load(Ordering::SeqCst) == outcome.seq
    }
}
