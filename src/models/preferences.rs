use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::prayer::{PrayerMap, PrayerName};

/// Which prayers the user wants a reminder for.
///
/// Stored as a JSON object keyed by API prayer name (`{"Fajr":true,...}`).
/// Keys missing from a stored object take their default value, so a loaded set
/// is always total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PrayerName, bool>", into = "BTreeMap<PrayerName, bool>")]
pub struct PreferenceSet {
    enabled: PrayerMap<bool>,
}

impl PreferenceSet {
    pub fn default_for(name: PrayerName) -> bool {
        name != PrayerName::Sunrise
    }

    pub fn all_enabled() -> Self {
        Self {
            enabled: PrayerMap::from_fn(|_| true),
        }
    }

    pub fn is_enabled(&self, name: PrayerName) -> bool {
        self.enabled[name]
    }

    pub fn set(&mut self, name: PrayerName, enabled: bool) {
        self.enabled[name] = enabled;
    }

    /// Flips one prayer and returns its new state.
    pub fn toggle(&mut self, name: PrayerName) -> bool {
        self.enabled[name] = !self.enabled[name];
        self.enabled[name]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, bool)> + '_ {
        self.enabled.iter().map(|(name, on)| (name, *on))
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled.values().iter().filter(|on| **on).count()
    }
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            enabled: PrayerMap::from_fn(Self::default_for),
        }
    }
}

impl From<BTreeMap<PrayerName, bool>> for PreferenceSet {
    fn from(stored: BTreeMap<PrayerName, bool>) -> Self {
        Self {
            enabled: PrayerMap::from_fn(|name| {
                stored
                    .get(&name)
                    .copied()
                    .unwrap_or_else(|| Self::default_for(name))
            }),
        }
    }
}

impl From<PreferenceSet> for BTreeMap<PrayerName, bool> {
    fn from(prefs: PreferenceSet) -> Self {
        prefs.iter().collect()
    }
}
