use chrono::{Duration, NaiveTime, Timelike};

use crate::models::{PrayerName, Schedule};
use crate::utils::format::format_remaining;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// A wall-clock position in minutes relative to today's midnight. Negative
/// values fall on the previous day, values of 1440 and above on the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayMinute(pub i32);

impl DayMinute {
    pub fn of(t: NaiveTime) -> Self {
        DayMinute((t.hour() * 60 + t.minute()) as i32)
    }

    pub fn minutes(self) -> i32 {
        self.0
    }

    /// -1 for yesterday, 0 for today, 1 for tomorrow.
    pub fn day_offset(self) -> i32 {
        self.0.div_euclid(MINUTES_PER_DAY)
    }

    pub fn time(self) -> NaiveTime {
        let m = self.0.rem_euclid(MINUTES_PER_DAY) as u32;
        NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap_or_default()
    }
}

/// Where `now` sits in the day's prayer sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineView {
    /// The prayer being counted down to.
    pub active_prayer: PrayerName,
    pub interval_start: DayMinute,
    pub interval_end: DayMinute,
    pub remaining: Duration,
    /// Elapsed share of the interval, in `[0, 1]`.
    pub progress: f64,
}

impl TimelineView {
    /// "1sa 5dk", or "45dk" under an hour.
    pub fn remaining_label(&self) -> String {
        format_remaining(self.remaining)
    }

    pub fn percent(&self) -> u16 {
        (self.progress * 100.0).round() as u16
    }
}

/// Maps a schedule and the current wall-clock time to the live countdown.
///
/// Intervals are half-open: at exactly a prayer's instant that prayer counts
/// as passed. Before Fajr the interval starts at yesterday's Isha and after
/// Isha it ends at tomorrow's Fajr. Both wrap-arounds reuse today's Isha and
/// Fajr instants, a known approximation of up to a couple of minutes that is
/// corrected once the next day's schedule is loaded.
pub fn compute(schedule: &Schedule, now: NaiveTime) -> TimelineView {
    let now_min = DayMinute::of(now).minutes();
    let minute_of = |name: PrayerName| DayMinute::of(schedule.instant(name)).minutes();

    let next = PrayerName::ALL
        .into_iter()
        .find(|name| minute_of(*name) > now_min);

    let (start, end, active) = match next {
        None => (
            minute_of(PrayerName::Isha),
            minute_of(PrayerName::Fajr) + MINUTES_PER_DAY,
            PrayerName::Fajr,
        ),
        Some(PrayerName::Fajr) => (
            minute_of(PrayerName::Isha) - MINUTES_PER_DAY,
            minute_of(PrayerName::Fajr),
            PrayerName::Fajr,
        ),
        Some(name) => {
            let previous = PrayerName::ALL[name.index() - 1];
            (minute_of(previous), minute_of(name), name)
        }
    };

    let span = (end - start) as f64;
    let progress = if span > 0.0 {
        ((now_min - start) as f64 / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    TimelineView {
        active_prayer: active,
        interval_start: DayMinute(start),
        interval_end: DayMinute(end),
        remaining: Duration::minutes((end - now_min) as i64),
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::tests::{hm, sample};
    use proptest::prelude::*;

    #[test]
    fn after_isha_wraps_to_tomorrows_fajr() {
        let view = compute(&sample(), hm(23, 0));
        assert_eq!(view.active_prayer, PrayerName::Fajr);
        assert_eq!(view.interval_start, DayMinute(19 * 60 + 50));
        assert_eq!(view.interval_start.day_offset(), 0);
        assert_eq!(view.interval_end, DayMinute(5 * 60 + MINUTES_PER_DAY));
        assert_eq!(view.interval_end.day_offset(), 1);
        assert_eq!(view.interval_end.time(), hm(5, 0));
        assert_eq!(view.remaining, Duration::hours(6));
        assert_eq!(view.remaining_label(), "6sa 0dk");
    }

    #[test]
    fn after_isha_uses_todays_fajr_for_tomorrow() {
        // Tomorrow's real Fajr may differ slightly; today's instant stands in for it.
        let view = compute(&sample(), hm(19, 50));
        assert_eq!(view.interval_end.time(), sample().instant(PrayerName::Fajr));
        assert_eq!(view.remaining, Duration::minutes(550));
        assert_eq!(view.progress, 0.0);
    }

    #[test]
    fn before_fajr_starts_at_yesterdays_isha() {
        let view = compute(&sample(), hm(4, 30));
        assert_eq!(view.active_prayer, PrayerName::Fajr);
        assert_eq!(view.interval_start, DayMinute(19 * 60 + 50 - MINUTES_PER_DAY));
        assert_eq!(view.interval_start.day_offset(), -1);
        assert_eq!(view.interval_start.time(), hm(19, 50));
        assert_eq!(view.interval_end, DayMinute(5 * 60));
        assert_eq!(view.remaining, Duration::minutes(30));
        assert_eq!(view.remaining_label(), "30dk");
        // 19:50 yesterday -> 04:30 is 520 of 550 minutes.
        assert!((view.progress - 520.0 / 550.0).abs() < 1e-9);
    }

    #[test]
    fn normal_interval_between_two_prayers() {
        let view = compute(&sample(), hm(14, 0));
        assert_eq!(view.active_prayer, PrayerName::Asr);
        assert_eq!(view.interval_start.time(), hm(12, 30));
        assert_eq!(view.interval_end.time(), hm(15, 45));
        assert_eq!(view.remaining, Duration::minutes(105));
        assert_eq!(view.remaining_label(), "1sa 45dk");
        assert!((view.progress - 90.0 / 195.0).abs() < 1e-9);
    }

    #[test]
    fn exact_instant_belongs_to_the_next_interval() {
        let view = compute(&sample(), hm(12, 30));
        assert_eq!(view.active_prayer, PrayerName::Asr);
        assert_eq!(view.progress, 0.0);

        let view = compute(&sample(), hm(5, 0));
        assert_eq!(view.active_prayer, PrayerName::Sunrise);
    }

    #[test]
    fn seconds_are_ignored() {
        let with_secs = NaiveTime::from_hms_opt(14, 0, 59).unwrap();
        assert_eq!(compute(&sample(), with_secs), compute(&sample(), hm(14, 0)));
    }

    #[test]
    fn midnight_is_pre_fajr() {
        let view = compute(&sample(), hm(0, 0));
        assert_eq!(view.active_prayer, PrayerName::Fajr);
        assert_eq!(view.remaining, Duration::hours(5));
    }

    #[test]
    fn day_minute_renders_wall_clock() {
        assert_eq!(DayMinute(-1).time(), hm(23, 59));
        assert_eq!(DayMinute(-1).day_offset(), -1);
        assert_eq!(DayMinute(1440).time(), hm(0, 0));
        assert_eq!(DayMinute::of(hm(7, 5)).minutes(), 425);
    }

    fn minute_of_day() -> impl Strategy<Value = NaiveTime> {
        (0u32..24, 0u32..60).prop_map(|(h, m)| hm(h, m))
    }

    proptest! {
        #[test]
        fn same_input_same_view(now in minute_of_day()) {
            let schedule = sample();
            prop_assert_eq!(compute(&schedule, now), compute(&schedule, now));
        }

        #[test]
        fn progress_is_bounded_and_remaining_positive(now in minute_of_day()) {
            let view = compute(&sample(), now);
            prop_assert!((0.0..=1.0).contains(&view.progress));
            prop_assert!(view.remaining > Duration::zero());
            prop_assert!(view.interval_start < view.interval_end);
        }

        #[test]
        fn progress_never_decreases_within_an_interval(a in minute_of_day(), b in minute_of_day()) {
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let schedule = sample();
            let (v1, v2) = (compute(&schedule, early), compute(&schedule, late));
            if v1.interval_start == v2.interval_start && v1.interval_end == v2.interval_end {
                prop_assert!(v1.progress <= v2.progress);
                prop_assert!(v1.remaining >= v2.remaining);
            }
        }

        #[test]
        fn at_an_instant_the_next_prayer_is_active(i in 0usize..6) {
            let schedule = sample();
            let name = PrayerName::ALL[i];
            let view = compute(&schedule, schedule.instant(name));
            let expected = PrayerName::ALL.get(i + 1).copied().unwrap_or(PrayerName::Fajr);
            prop_assert_eq!(view.active_prayer, expected);
            prop_assert_eq!(view.interval_start.time(), schedule.instant(name));
        }
    }
}
