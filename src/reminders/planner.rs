use chrono::NaiveDateTime;

use crate::models::{PrayerName, PreferenceSet, Schedule};

/// One reminder the scheduler should hand to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReminder {
    pub prayer: PrayerName,
    pub fire_at: NaiveDateTime,
    pub title: String,
    pub body: String,
}

pub fn title_for(prayer: PrayerName) -> String {
    format!("{} Vakti", prayer.display_name())
}

pub fn message_for(prayer: PrayerName) -> &'static str {
    match prayer {
        PrayerName::Fajr => {
            "Gözlerini aç ve ruhunu uyandır. Sabahın bereketi seni bekliyor. Namaz, uykudan hayırlıdır."
        }
        PrayerName::Sunrise => "Güneş doğdu, günün aydınlandı. Şükürle başla, günün bereketlensin.",
        PrayerName::Dhuhr => {
            "Dünya telaşına kısa bir mola. Ruhunu dinlendir, Rabbine yönel. Öğle vakti, yenilenme vaktidir."
        }
        PrayerName::Asr => {
            "Günün yorgunluğunu secdeyle at. Zaman hızla akıp gidiyor. İkindi vakti, huzur vaktidir."
        }
        PrayerName::Maghrib => {
            "Güneş batarken hüzün değil, huzur dolsun kalbine. Günün şükrünü eda etme vakti."
        }
        PrayerName::Isha => {
            "Gecenin karanlığında nurunu ara. Günü huzurla kapat, yarına umutla uyan. Yatsı namazı, ruhun miracıdır."
        }
    }
}

/// Reminders for every enabled prayer of `schedule` that is still ahead of
/// `now`, in daily order. Prayers that already passed are left out; the next
/// day's reminders come from planning against the next day's schedule.
pub fn plan(schedule: &Schedule, prefs: &PreferenceSet, now: NaiveDateTime) -> Vec<PlannedReminder> {
    PrayerName::ALL
        .into_iter()
        .filter(|name| prefs.is_enabled(*name))
        .filter_map(|name| {
            let fire_at = schedule.calendar_date().and_time(schedule.instant(name));
            (fire_at > now).then(|| PlannedReminder {
                prayer: name,
                fire_at,
                title: title_for(name),
                body: message_for(name).to_string(),
            })
        })
        .collect()
}
