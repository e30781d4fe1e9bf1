use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use hijri_date::HijriDate;

use crate::models::{HijriDay, Schedule};

/// Islamic month names (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[(&str, &str)] = &[
    ("Muharram", "مُحَرَّم"),
    ("Safar", "صَفَر"),
    ("Rabi' al-Awwal", "رَبيع الأوّل"),
    ("Rabi' al-Thani", "رَبيع الثاني"),
    ("Jumada al-Awwal", "جُمادى الأولى"),
    ("Jumada al-Thani", "جُمادى الآخرة"),
    ("Rajab", "رَجَب"),
    ("Sha'ban", "شَعْبان"),
    ("Ramadan", "رَمَضان"),
    ("Shawwal", "شَوّال"),
    ("Dhu al-Qi'dah", "ذوالقعدة"),
    ("Dhu al-Hijjah", "ذوالحجة"),
];

fn hijri_month_names(month: usize) -> (&'static str, &'static str) {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        ("Unknown", "")
    }
}

/// Local tabular conversion, used when the source sent no Hijri date.
pub fn to_hijri(date: NaiveDate) -> Result<HijriDay> {
    let hd = HijriDate::from_gr(
        date.year() as usize,
        date.month() as usize,
        date.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    let (month_en, month_ar) = hijri_month_names(hd.month());
    Ok(HijriDay {
        day: hd.day().to_string(),
        month_en: month_en.to_string(),
        month_ar: month_ar.to_string(),
        year: hd.year().to_string(),
    })
}

/// The Hijri line for a schedule: the source's own date when it sent one,
/// otherwise a local conversion of the calendar date.
pub fn hijri_line(schedule: &Schedule) -> Option<String> {
    if let Some(hijri) = &schedule.date_info().hijri {
        return Some(hijri.formatted());
    }
    match to_hijri(schedule.calendar_date()) {
        Ok(hijri) => Some(hijri.formatted()),
        Err(e) => {
            log::debug!("no Hijri date for {}: {:#}", schedule.calendar_date(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::tests::sample;
    use crate::models::{DateInfo, PrayerMap, Schedule};

    #[test]
    fn converts_a_known_date() {
        let hijri = to_hijri(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()).unwrap();
        assert_eq!(hijri.year, "1445");
        assert_eq!(hijri.month_en, "Ramadan");
    }

    #[test]
    fn source_date_wins() {
        let source = HijriDay {
            day: "6".to_string(),
            month_en: "Jumādá al-ūlá".to_string(),
            month_ar: String::new(),
            year: "1448".to_string(),
        };
        let base = sample();
        let schedule = Schedule::new(
            base.calendar_date(),
            PrayerMap::from_fn(|name| base.instant(name)),
            DateInfo {
                readable: None,
                hijri: Some(source),
            },
        )
        .unwrap();
        assert_eq!(hijri_line(&schedule).as_deref(), Some("6 Jumādá al-ūlá 1448"));
    }

    #[test]
    fn falls_back_to_local_conversion() {
        assert!(hijri_line(&sample()).is_some());
    }
}
