use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// The six named instants of a day, in their fixed daily order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Sunrise,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn index(self) -> usize {
        match self {
            PrayerName::Fajr => 0,
            PrayerName::Sunrise => 1,
            PrayerName::Dhuhr => 2,
            PrayerName::Asr => 3,
            PrayerName::Maghrib => 4,
            PrayerName::Isha => 5,
        }
    }

    /// Key used by the prayer-time API and the stored preference JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PrayerName::Fajr => "İmsak",
            PrayerName::Sunrise => "Güneş",
            PrayerName::Dhuhr => "Öğle",
            PrayerName::Asr => "İkindi",
            PrayerName::Maghrib => "Akşam",
            PrayerName::Isha => "Yatsı",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" | "imsak" | "i̇msak" => Ok(PrayerName::Fajr),
            "sunrise" | "gunes" | "güneş" => Ok(PrayerName::Sunrise),
            "dhuhr" | "zuhr" | "ogle" | "öğle" => Ok(PrayerName::Dhuhr),
            "asr" | "ikindi" | "i̇kindi" => Ok(PrayerName::Asr),
            "maghrib" | "aksam" | "akşam" => Ok(PrayerName::Maghrib),
            "isha" | "yatsi" | "yatsı" => Ok(PrayerName::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer: {}", s)),
        }
    }
}

/// A total mapping from every [`PrayerName`] to a value. There is no way to
/// build one with a missing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrayerMap<T>([T; 6]);

impl<T> PrayerMap<T> {
    pub fn from_fn(f: impl FnMut(PrayerName) -> T) -> Self {
        PrayerMap(PrayerName::ALL.map(f))
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(PrayerName) -> Result<T, E>) -> Result<Self, E> {
        let [a, b, c, d, e, g] = PrayerName::ALL;
        Ok(PrayerMap([f(a)?, f(b)?, f(c)?, f(d)?, f(e)?, f(g)?]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, &T)> {
        PrayerName::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> &[T; 6] {
        &self.0
    }

    pub fn map<U>(self, mut f: impl FnMut(PrayerName, T) -> U) -> PrayerMap<U> {
        let PrayerMap([a, b, c, d, e, g]) = self;
        PrayerMap([
            f(PrayerName::Fajr, a),
            f(PrayerName::Sunrise, b),
            f(PrayerName::Dhuhr, c),
            f(PrayerName::Asr, d),
            f(PrayerName::Maghrib, e),
            f(PrayerName::Isha, g),
        ])
    }
}

impl<T> Index<PrayerName> for PrayerMap<T> {
    type Output = T;

    fn index(&self, name: PrayerName) -> &T {
        &self.0[name.index()]
    }
}

impl<T> IndexMut<PrayerName> for PrayerMap<T> {
    fn index_mut(&mut self, name: PrayerName) -> &mut T {
        &mut self.0[name.index()]
    }
}
