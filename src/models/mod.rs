pub mod city;
pub mod prayer;
pub mod preferences;
pub mod schedule;

pub use city::City;
pub use prayer::{PrayerMap, PrayerName};
pub use preferences::PreferenceSet;
pub use schedule::{DateInfo, HijriDay, Schedule, ScheduleError};
