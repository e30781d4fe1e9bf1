use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::City;
use crate::models::city::DEFAULT_CITY;
use crate::timeline::refresh::DEFAULT_PERIOD;

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}
fn default_country() -> String {
    "Turkey".to_string()
}
fn default_label() -> String {
    "İstanbul".to_string()
}
fn default_base_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_method() -> u8 {
    13
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_period_secs() -> u64 {
    DEFAULT_PERIOD.as_secs()
}
fn default_app_name() -> String {
    "vakit".to_string()
}
fn default_poll_secs() -> u64 {
    20
}
fn default_late_grace_minutes() -> i64 {
    30
}

/// City used until the user picks one in the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            country: default_country(),
            label: default_label(),
        }
    }
}

impl LocationConfig {
    pub fn city(&self) -> City {
        City::new(&self.city, &self.country, &self.label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Calculation method id understood by the API. 13 is Diyanet.
    #[serde(default = "default_method")]
    pub method: u8,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            method: default_method(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
        }
    }
}

impl RefreshConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
    /// Reminders older than this when found are dropped instead of shown.
    #[serde(default = "default_late_grace_minutes")]
    pub late_grace_minutes: i64,
}

impl NotificationConfig {
    pub fn poll(&self) -> Duration {
        Duration::from_secs(self.poll_secs.max(1))
    }

    pub fn late_grace(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.late_grace_minutes.max(0))
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            poll_secs: default_poll_secs(),
            late_grace_minutes: default_late_grace_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "vakit").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("vakit.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.api.method, 13);
        assert_eq!(config.location.city, "Istanbul");
        assert_eq!(config.refresh.period(), Duration::from_secs(60));
    }

    #[test]
    fn partial_file_fills_in_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[location]\ncity = \"Konya\"\nlabel = \"Konya\"\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.location.city().name, "Konya");
        assert_eq!(config.location.country, "Turkey");
        assert_eq!(config.api.base_url, "https://api.aladhan.com/v1");
        assert_eq!(config.notifications.late_grace_minutes, 30);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.refresh.period_secs = 15;
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap().refresh.period_secs, 15);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nmethod = ").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn zero_period_is_clamped() {
        let config = RefreshConfig { period_secs: 0 };
        assert_eq!(config.period(), Duration::from_secs(1));
    }
}
