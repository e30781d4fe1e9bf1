use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::de::DeserializeOwned;

use crate::db::repository::MetaRepo;
use crate::models::{City, PreferenceSet};

pub const PREFERENCES_KEY: &str = "notification_prefs";
pub const CITY_KEY: &str = "selected_city";

/// String-keyed persistent storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// The `app_meta` table.
impl KeyValueStore for Connection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        MetaRepo::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        MetaRepo::set(self, key, value)
    }
}

fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("reading '{}' failed: {:#}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("stored '{}' is unreadable, using default: {}", key, e);
            None
        }
    }
}

/// Stored reminder preferences, or the defaults when none are stored.
pub fn load_preferences(store: &impl KeyValueStore) -> PreferenceSet {
    load_json(store, PREFERENCES_KEY).unwrap_or_default()
}

pub fn save_preferences(store: &impl KeyValueStore, prefs: &PreferenceSet) -> Result<()> {
    let json = serde_json::to_string(prefs).context("Serializing preferences")?;
    store.set(PREFERENCES_KEY, &json).context("Saving preferences")
}

/// Last selected city, or `fallback` when none is stored.
pub fn load_city(store: &impl KeyValueStore, fallback: &City) -> City {
    load_json(store, CITY_KEY).unwrap_or_else(|| fallback.clone())
}

pub fn save_city(store: &impl KeyValueStore, city: &City) -> Result<()> {
    let json = serde_json::to_string(city).context("Serializing city")?;
    store.set(CITY_KEY, &json).context("Saving city")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::PrayerName;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore(RefCell<HashMap<String, String>>);

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[test]
    fn absent_values_fall_back_to_defaults() {
        let store = MemoryStore::default();
        assert_eq!(load_preferences(&store), PreferenceSet::default());
        assert_eq!(load_city(&store, &City::default()), City::default());
    }

    #[test]
    fn saved_values_are_loaded_back() {
        let store = MemoryStore::default();
        let mut prefs = PreferenceSet::default();
        prefs.toggle(PrayerName::Sunrise);
        save_preferences(&store, &prefs).unwrap();
        assert_eq!(load_preferences(&store), prefs);

        let ankara = City::new("Ankara", "Turkey", "Ankara");
        save_city(&store, &ankara).unwrap();
        assert_eq!(load_city(&store, &City::default()), ankara);
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        let store = MemoryStore::default();
        store.set(PREFERENCES_KEY, "{not json").unwrap();
        store.set(CITY_KEY, "42").unwrap();
        assert_eq!(load_preferences(&store), PreferenceSet::default());
        assert_eq!(load_city(&store, &City::default()), City::default());
    }

    #[test]
    fn preferences_persist_in_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vakit.db");
        {
            let conn = Connection::open(&path).unwrap();
            run_migrations(&conn).unwrap();
            let mut prefs = PreferenceSet::default();
            prefs.set(PrayerName::Isha, false);
            save_preferences(&conn, &prefs).unwrap();
        }
        let conn = Connection::open(&path).unwrap();
        let prefs = load_preferences(&conn);
        assert!(!prefs.is_enabled(PrayerName::Isha));
        assert!(!prefs.is_enabled(PrayerName::Sunrise));
    }
}
