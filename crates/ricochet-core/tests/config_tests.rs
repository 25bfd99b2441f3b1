// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Settings persistence through [`ConfigService`].

use ricochet_core::config::{ConfigError, ConfigService};
use ricochet_core::{PhysicsSettings, SETTINGS_KEY};
use ricochet_dry_tests::InMemoryConfigStore;

#[test]
fn settings_round_trip() {
    let store = InMemoryConfigStore::new();
    let service = ConfigService::new(store.clone());
    let tuned = PhysicsSettings {
        gravity: [0.0, -1.62, 0.0],
        enable_sleep: true,
        max_iterations: 6,
        ..PhysicsSettings::default()
    };

    service.save_settings(&tuned).unwrap();
    assert_eq!(service.load_settings().unwrap(), tuned);
    assert_eq!(store.keys(), vec![SETTINGS_KEY.to_string()]);
    assert_eq!((store.save_count(), store.load_count()), (1, 1));
}

#[test]
fn missing_or_empty_settings_fall_back_to_defaults() {
    let service = ConfigService::new(InMemoryConfigStore::new());
    assert_eq!(service.load_settings().unwrap(), PhysicsSettings::default());

    let service = ConfigService::new(InMemoryConfigStore::with_entry(SETTINGS_KEY, b""));
    assert_eq!(service.load_settings().unwrap(), PhysicsSettings::default());
}

#[test]
fn partial_settings_keep_unlisted_defaults() {
    let store = InMemoryConfigStore::with_entry(SETTINGS_KEY, br#"{"enable_friction": false}"#);
    let settings = ConfigService::new(store).load_settings().unwrap();
    assert!(!settings.enable_friction);
    assert_eq!(settings.max_iterations, PhysicsSettings::default().max_iterations);
}

#[test]
fn store_failures_surface_as_errors() {
    let store = InMemoryConfigStore::new();
    let service = ConfigService::new(store.clone());

    store.set_fail_on_load(true);
    assert!(matches!(service.load_settings(), Err(ConfigError::Other(_))));

    store.set_fail_on_save(true);
    assert!(service.save_settings(&PhysicsSettings::default()).is_err());
    assert!(store.peek(SETTINGS_KEY).is_none());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let store = InMemoryConfigStore::with_entry(SETTINGS_KEY, b"{not json");
    let service = ConfigService::new(store);
    assert!(matches!(service.load_settings(), Err(ConfigError::Serde(_))));
}
