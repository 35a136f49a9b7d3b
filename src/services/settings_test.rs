use super::*;

#[test]
fn missing_keys_yield_documented_defaults() {
    let store = SettingsStore::in_memory();

    let weather = store.weather();
    assert_eq!(weather.cities.len(), 3);
    assert_eq!(weather.cities[0].name, "Beijing");
    assert_eq!(weather.current_city_id, "1");
    assert!(weather.api_key.is_empty());

    assert_eq!(store.clock().face, "analog");
    assert!(store.get(WEATHER_CACHE_KEY).is_none());
}

#[test]
fn set_overwrites_wholesale() {
    let mut store = SettingsStore::in_memory();
    store.set(WEATHER_CACHE_KEY, serde_json::json!({"temp": 21, "city": "Beijing"}));
    store.set(WEATHER_CACHE_KEY, serde_json::json!({"temp": 18}));

    assert_eq!(store.get(WEATHER_CACHE_KEY), Some(&serde_json::json!({"temp": 18})));
}

#[test]
fn typed_round_trip_through_the_store() {
    let mut store = SettingsStore::in_memory();
    let mut weather = store.weather();
    weather.api_key = "secret".into();
    weather.current_city_id = "2".into();
    store.set_weather(&weather);

    let restored = store.weather();
    assert_eq!(restored.api_key, "secret");
    assert_eq!(restored.current_city_id, "2");

    store.set_clock(&ClockSettings { face: "pixel".into() });
    assert_eq!(store.clock().face, "pixel");
}

#[test]
fn corrupt_entry_falls_back_to_default() {
    let mut store = SettingsStore::in_memory();
    store.set(WEATHER_SETTINGS_KEY, serde_json::json!("not an object"));
    assert_eq!(store.weather(), WeatherSettings::default());
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[test]
fn values_survive_a_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut store = SettingsStore::open(dir.path());
    let mut weather = store.weather();
    weather.api_key = "persisted".into();
    store.set_weather(&weather);
    store.set_clock(&ClockSettings { face: "sport".into() });
    drop(store);

    let reopened = SettingsStore::open(dir.path());
    assert_eq!(reopened.weather().api_key, "persisted");
    assert_eq!(reopened.clock().face, "sport");
}

#[test]
fn corrupt_file_is_skipped_on_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("weather_settings.json"), "{broken").expect("write");

    let store = SettingsStore::open(dir.path());
    assert_eq!(store.weather(), WeatherSettings::default());
}

#[test]
fn non_json_files_are_ignored_on_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("notes.txt"), "hello").expect("write");

    let store = SettingsStore::open(dir.path());
    assert!(store.get("notes").is_none());
}

// =============================================================================
// CITY MANAGEMENT
// =============================================================================

#[test]
fn add_city_appends_with_a_fresh_id() {
    let mut store = SettingsStore::in_memory();
    let updated = store.add_city("Chengdu").expect("valid name");

    assert_eq!(updated.cities.len(), 4);
    let added = updated.cities.last().expect("appended");
    assert_eq!(added.name, "Chengdu");
    assert!(!added.id.is_empty());
    assert!(updated.cities.iter().filter(|c| c.id == added.id).count() == 1);
}

#[test]
fn blank_city_names_are_rejected_without_mutation() {
    let mut store = SettingsStore::in_memory();

    assert_eq!(store.add_city(""), Err(SettingsError::EmptyCityName));
    assert_eq!(store.add_city("   "), Err(SettingsError::EmptyCityName));
    assert_eq!(store.weather().cities.len(), 3);
}

#[test]
fn add_city_trims_surrounding_whitespace() {
    let mut store = SettingsStore::in_memory();
    let updated = store.add_city("  Hangzhou  ").expect("valid name");
    assert_eq!(updated.cities.last().expect("appended").name, "Hangzhou");
}

#[test]
fn remove_city_repoints_the_current_selection() {
    let mut store = SettingsStore::in_memory();
    let updated = store.remove_city("1").expect("removable");

    assert_eq!(updated.cities.len(), 2);
    assert_eq!(updated.current_city_id, updated.cities[0].id);
}

#[test]
fn removing_an_unselected_city_keeps_the_selection() {
    let mut store = SettingsStore::in_memory();
    let updated = store.remove_city("3").expect("removable");
    assert_eq!(updated.current_city_id, "1");
}

#[test]
fn the_last_city_cannot_be_removed() {
    let mut store = SettingsStore::in_memory();
    let _ = store.remove_city("1").expect("removable");
    let _ = store.remove_city("2").expect("removable");

    assert_eq!(store.remove_city("3"), Err(SettingsError::LastCity));
    assert_eq!(store.weather().cities.len(), 1);
}

#[test]
fn removing_an_unknown_city_fails() {
    let mut store = SettingsStore::in_memory();
    assert_eq!(store.remove_city("nope"), Err(SettingsError::UnknownCity("nope".into())));
}
