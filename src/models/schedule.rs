use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prayer::{PrayerMap, PrayerName};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("no timing for {0:?}")]
    Missing(PrayerName),
    #[error("malformed instant for {name:?}: '{value}'")]
    Malformed { name: PrayerName, value: String },
    #[error("{later:?} ({later_at}) is not after {earlier:?} ({earlier_at})")]
    OutOfOrder {
        earlier: PrayerName,
        earlier_at: NaiveTime,
        later: PrayerName,
        later_at: NaiveTime,
    },
}

/// Hijri date as reported by the prayer-time source. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HijriDay {
    pub day: String,
    pub month_en: String,
    pub month_ar: String,
    pub year: String,
}

impl HijriDay {
    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_en, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateInfo {
    pub readable: Option<String>,
    pub hijri: Option<HijriDay>,
}

/// One calendar day's six prayer instants. Immutable once built; a new day or
/// city produces a new `Schedule`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    calendar_date: NaiveDate,
    instants: PrayerMap<NaiveTime>,
    date_info: DateInfo,
}

impl Schedule {
    /// Fajr < Sunrise < Dhuhr < Asr < Maghrib < Isha must hold.
    pub fn new(
        calendar_date: NaiveDate,
        instants: PrayerMap<NaiveTime>,
        date_info: DateInfo,
    ) -> Result<Self, ScheduleError> {
        for pair in PrayerName::ALL.windows(2) {
            let (earlier, later) = (pair[0], pair[1]);
            if instants[later] <= instants[earlier] {
                return Err(ScheduleError::OutOfOrder {
                    earlier,
                    earlier_at: instants[earlier],
                    later,
                    later_at: instants[later],
                });
            }
        }
        Ok(Self {
            calendar_date,
            instants,
            date_info,
        })
    }

    /// Builds a schedule from "HH:MM" strings. A single missing or malformed
    /// value rejects the whole schedule.
    pub fn from_timings<'a>(
        calendar_date: NaiveDate,
        lookup: impl Fn(PrayerName) -> Option<&'a str>,
        date_info: DateInfo,
    ) -> Result<Self, ScheduleError> {
        let instants = PrayerMap::try_from_fn(|name| {
            let raw = lookup(name).ok_or(ScheduleError::Missing(name))?;
            parse_instant(raw).ok_or_else(|| ScheduleError::Malformed {
                name,
                value: raw.to_string(),
            })
        })?;
        Self::new(calendar_date, instants, date_info)
    }

    pub fn calendar_date(&self) -> NaiveDate {
        self.calendar_date
    }

    pub fn instant(&self, name: PrayerName) -> NaiveTime {
        self.instants[name]
    }

    pub fn date_info(&self) -> &DateInfo {
        &self.date_info
    }

    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.calendar_date == date
    }

    /// The instants rendered back to "HH:MM", as stored in the schedule cache.
    pub fn timings(&self) -> PrayerMap<String> {
        self.instants.map(|_, t| t.format("%H:%M").to_string())
    }
}

/// Parses an "HH:MM" instant. The source may append a zone marker after a
/// space ("05:12 (+03)"); only the leading token is read.
pub fn parse_instant(raw: &str) -> Option<NaiveTime> {
    let token = raw.split_whitespace().next()?;
    let (h, m) = token.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}
