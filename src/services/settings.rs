//! Settings store — the desktop stand-in for the watch's local storage.
//!
//! DESIGN
//! ======
//! Explicitly constructed and injected, never a process-wide singleton.
//! The contract mirrors browser local storage: `get` returns the
//! last-written object for a fixed string key or the documented default,
//! `set` overwrites wholesale. The file-backed variant keeps one JSON file
//! per key under its directory and persists best-effort — a failed write is
//! logged, never raised, and the in-memory value stays authoritative for
//! the session.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const WEATHER_SETTINGS_KEY: &str = "weather_settings";
pub const CLOCK_SETTINGS_KEY: &str = "clock_settings";
pub const WEATHER_CACHE_KEY: &str = "weather_cache";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("city name must not be empty")]
    EmptyCityName,
    #[error("cannot remove the last city")]
    LastCity,
    #[error("unknown city: {0}")]
    UnknownCity(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityConfig {
    pub id: String,
    pub name: String,
    /// Provider city ID, cached after the first lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSettings {
    pub cities: Vec<CityConfig>,
    pub current_city_id: String,
    pub api_key: String,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            cities: vec![
                CityConfig { id: "1".into(), name: "Beijing".into(), location_id: None },
                CityConfig { id: "2".into(), name: "Shanghai".into(), location_id: None },
                CityConfig { id: "3".into(), name: "Guangzhou".into(), location_id: None },
            ],
            current_city_id: "1".into(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSettings {
    pub face: String,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self { face: "analog".into() }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SettingsStore {
    dir: Option<PathBuf>,
    entries: HashMap<String, serde_json::Value>,
}

impl SettingsStore {
    /// Volatile store with no backing directory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { dir: None, entries: HashMap::new() }
    }

    /// File-backed store keeping one `<key>.json` per key under `dir`.
    /// Unreadable entries are skipped with a log line, not an error.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "settings: failed to create directory");
        }

        let mut entries = HashMap::new();
        match fs::read_dir(&dir) {
            Ok(iter) => {
                for entry in iter.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                        continue;
                    }
                    let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                        continue;
                    };
                    match fs::read_to_string(&path) {
                        Ok(raw) => match serde_json::from_str(&raw) {
                            Ok(value) => {
                                entries.insert(key.to_owned(), value);
                            }
                            Err(e) => {
                                warn!(key, error = %e, "settings: corrupt entry skipped");
                            }
                        },
                        Err(e) => warn!(key, error = %e, "settings: unreadable entry skipped"),
                    }
                }
            }
            Err(e) => warn!(dir = %dir.display(), error = %e, "settings: failed to scan directory"),
        }

        Self { dir: Some(dir), entries }
    }

    /// Last-written value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    /// Overwrite `key` wholesale and persist best-effort.
    pub fn set(&mut self, key: &str, value: serde_json::Value) {
        self.persist(key, &value);
        self.entries.insert(key.to_owned(), value);
    }

    fn persist(&self, key: &str, value: &serde_json::Value) {
        let Some(dir) = &self.dir else {
            return;
        };
        let path = dir.join(format!("{key}.json"));
        let rendered = match serde_json::to_string_pretty(value) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(key, error = %e, "settings: failed to serialize entry");
                return;
            }
        };
        if let Err(e) = fs::write(&path, rendered) {
            warn!(key, error = %e, "settings: failed to persist entry");
        }
    }

    fn get_typed<T: for<'de> Deserialize<'de> + Default>(&self, key: &str) -> T {
        self.entries
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn weather(&self) -> WeatherSettings {
        self.get_typed(WEATHER_SETTINGS_KEY)
    }

    pub fn set_weather(&mut self, settings: &WeatherSettings) {
        self.set(WEATHER_SETTINGS_KEY, serde_json::to_value(settings).unwrap_or_default());
    }

    #[must_use]
    pub fn clock(&self) -> ClockSettings {
        self.get_typed(CLOCK_SETTINGS_KEY)
    }

    pub fn set_clock(&mut self, settings: &ClockSettings) {
        self.set(CLOCK_SETTINGS_KEY, serde_json::to_value(settings).unwrap_or_default());
    }

    // -------------------------------------------------------------------------
    // City management
    // -------------------------------------------------------------------------

    /// Add a city by name.
    ///
    /// # Errors
    ///
    /// Rejects blank names with no state change.
    pub fn add_city(&mut self, name: &str) -> Result<WeatherSettings, SettingsError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SettingsError::EmptyCityName);
        }

        let mut settings = self.weather();
        settings.cities.push(CityConfig {
            id: Uuid::new_v4().to_string(),
            name: name.to_owned(),
            location_id: None,
        });
        self.set_weather(&settings);
        Ok(settings)
    }

    /// Remove a city. Removing the current city repoints the selection to
    /// the first remaining one.
    ///
    /// # Errors
    ///
    /// Fails on an unknown ID, or when only one city remains.
    pub fn remove_city(&mut self, city_id: &str) -> Result<WeatherSettings, SettingsError> {
        let mut settings = self.weather();
        if !settings.cities.iter().any(|city| city.id == city_id) {
            return Err(SettingsError::UnknownCity(city_id.to_owned()));
        }
        if settings.cities.len() == 1 {
            return Err(SettingsError::LastCity);
        }

        settings.cities.retain(|city| city.id != city_id);
        if settings.current_city_id == city_id {
            settings.current_city_id = settings.cities[0].id.clone();
        }
        self.set_weather(&settings);
        Ok(settings)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
