use chrono::NaiveDateTime;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::calculator::{compute, TimelineView};
use super::SharedSchedule;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// What one tick of the loop publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshTick {
    pub at: NaiveDateTime,
    /// `None` while no schedule has been loaded.
    pub view: Option<TimelineView>,
    /// The loaded schedule belongs to a different day than `at`.
    pub stale: bool,
}

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodically recomputes the timeline from the shared schedule. Only one
/// ticking thread exists per loop; it is stopped on [`RefreshLoop::stop`] or drop.
pub struct RefreshLoop {
    period: Duration,
    worker: Option<Worker>,
}

impl RefreshLoop {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Publishes a tick right away and then once per period. Returns `false`
    /// without spawning anything if the loop is already running. The thread
    /// exits on its own once `publish` returns `false`.
    pub fn start<C, P>(&mut self, schedule: SharedSchedule, clock: C, mut publish: P) -> bool
    where
        C: Fn() -> NaiveDateTime + Send + 'static,
        P: FnMut(RefreshTick) -> bool + Send + 'static,
    {
        if self.is_running() {
            log::debug!("refresh loop already running");
            return false;
        }
        // reap a worker that exited on its own
        self.stop();

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let period = self.period;
        let handle = thread::spawn(move || {
            loop {
                let tick = tick(&schedule, clock());
                if !publish(tick) {
                    log::debug!("refresh subscriber gone, stopping");
                    break;
                }
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        log::debug!("refresh loop started ({:?} period)", period);
        self.worker = Some(Worker { stop_tx, handle });
        true
    }

    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if worker.handle.join().is_err() {
                log::warn!("refresh loop thread panicked");
            }
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick(schedule: &SharedSchedule, at: NaiveDateTime) -> RefreshTick {
    let guard = schedule.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    match guard.as_ref() {
        Some(s) => RefreshTick {
            at,
            view: Some(compute(s, at.time())),
            stale: !s.is_for(at.date()),
        },
        None => RefreshTick {
            at,
            view: None,
            stale: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::tests::{day, hm, sample};
    use crate::models::PrayerName;
    use std::sync::{Arc, RwLock};

    fn shared(schedule: Option<crate::models::Schedule>) -> SharedSchedule {
        Arc::new(RwLock::new(schedule))
    }

    #[test]
    fn publishes_immediately_and_then_periodically() {
        let mut refresh = RefreshLoop::new(Duration::from_millis(10));
        let (tx, rx) = mpsc::channel();
        let at = day().and_time(hm(14, 0));
        assert!(refresh.start(shared(Some(sample())), move || at, move |t| tx.send(t).is_ok()));

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, second);
        let view = first.view.unwrap();
        assert_eq!(view.active_prayer, PrayerName::Asr);
        assert!(!first.stale);
        refresh.stop();
        assert!(!refresh.is_running());
    }

    #[test]
    fn second_start_is_a_no_op() {
        let mut refresh = RefreshLoop::new(Duration::from_secs(60));
        let at = day().and_time(hm(1, 0));
        assert!(refresh.start(shared(None), move || at, |_| true));
        assert!(!refresh.start(shared(None), move || at, |_| true));
        assert!(refresh.is_running());
        refresh.stop();
        // restart after stop is allowed
        assert!(refresh.start(shared(None), move || at, |_| true));
    }

    #[test]
    fn empty_schedule_publishes_no_view() {
        let mut refresh = RefreshLoop::new(Duration::from_secs(60));
        let (tx, rx) = mpsc::channel();
        let at = day().and_time(hm(1, 0));
        refresh.start(shared(None), move || at, move |t| tx.send(t).is_ok());
        let tick = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(tick.view.is_none());
        assert!(!tick.stale);
    }

    #[test]
    fn schedule_from_another_day_is_flagged_stale() {
        let mut refresh = RefreshLoop::new(Duration::from_secs(60));
        let (tx, rx) = mpsc::channel();
        let tomorrow = day().succ_opt().unwrap().and_time(hm(0, 5));
        refresh.start(shared(Some(sample())), move || tomorrow, move |t| tx.send(t).is_ok());
        let tick = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(tick.stale);
        assert_eq!(tick.view.unwrap().active_prayer, PrayerName::Fajr);
    }

    #[test]
    fn sees_schedule_replacement() {
        let mut refresh = RefreshLoop::new(Duration::from_millis(10));
        let (tx, rx) = mpsc::channel();
        let slot = shared(None);
        let at = day().and_time(hm(14, 0));
        refresh.start(slot.clone(), move || at, move |t| tx.send(t).is_ok());
        assert!(rx.recv_timeout(Duration::from_secs(2)).unwrap().view.is_none());

        *slot.write().unwrap() = Some(sample());
        let view = loop {
            let tick = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            if let Some(view) = tick.view {
                break view;
            }
        };
        assert_eq!(view.active_prayer, PrayerName::Asr);
    }

    #[test]
    fn stops_when_subscriber_is_gone() {
        let mut refresh = RefreshLoop::new(Duration::from_millis(5));
        let at = day().and_time(hm(1, 0));
        refresh.start(shared(None), move || at, |_| false);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while refresh.is_running() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!refresh.is_running());
    }
}
