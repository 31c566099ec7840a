//! Unit tests for config.rs module

use std::collections::HashMap;
use std::io::Write;

use lost_and_found::config::{
    AppConfig, EnvironmentConfig, FIREBASE_API_KEY, FIREBASE_PROJECT_ID, FIREBASE_STORAGE_BUCKET,
};
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_default_config_values() {
    let config = AppConfig::default();

    assert_eq!(config.auth.allowed_domain, "iiitdm.ac.in");
    assert_eq!(config.repository.users_collection, "users");
    assert_eq!(config.repository.items_collection, "items");
    assert_eq!(config.repository.default_list_limit, 50);
    assert_eq!(config.repository.search_limit, 100);
    assert_eq!(config.local_store.path, "data/items.db");
    assert_eq!(config.environment.env_file, ".env");
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_validate_rejects_bad_domain() {
    for domain in ["", "iiitdm", "@iiitdm.ac.in"] {
        let mut config = AppConfig::default();
        config.auth.allowed_domain = domain.to_string();
        assert!(config.validate().is_err(), "{domain:?} should be rejected");
    }
}

#[test]
fn test_validate_rejects_zero_limits() {
    let mut config = AppConfig::default();
    config.repository.default_list_limit = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.repository.search_limit = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_unknown_logging_values() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_empty_collections() {
    let mut config = AppConfig::default();
    config.repository.items_collection.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(
        file,
        "[auth]\nallowed_domain = \"example.edu\"\n\n[repository]\nsearch_limit = 25\n\n[logging]\nformat = \"json\""
    )
    .unwrap();

    let config = AppConfig::load_from(file.path()).unwrap();

    assert_eq!(config.auth.allowed_domain, "example.edu");
    assert_eq!(config.repository.search_limit, 25);
    assert_eq!(config.repository.default_list_limit, 50);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_load_from_invalid_file_fails_validation() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "[repository]\ndefault_list_limit = 0").unwrap();

    assert!(AppConfig::load_from(file.path()).is_err());
}

#[test]
fn test_environment_priority() {
    let file_values = HashMap::from([
        (FIREBASE_PROJECT_ID.to_string(), "from-file".to_string()),
        (FIREBASE_STORAGE_BUCKET.to_string(), "bucket-from-file".to_string()),
        (FIREBASE_API_KEY.to_string(), String::new()),
    ]);
    let env = |key: &str| (key == FIREBASE_PROJECT_ID).then(|| "from-env".to_string());

    let resolved = EnvironmentConfig::resolve(env, &file_values);

    assert_eq!(resolved.project_id, "from-env");
    assert_eq!(resolved.storage_bucket, "bucket-from-file");
    assert_eq!(resolved.api_key, "your_firebase_api_key_here");
    assert_eq!(resolved.package_name, "com.institute.lostandfound");
}

#[test]
fn test_environment_empty_env_value_falls_through() {
    let file_values = HashMap::from([(FIREBASE_PROJECT_ID.to_string(), "from-file".to_string())]);
    let resolved = EnvironmentConfig::resolve(|_| Some(String::new()), &file_values);
    assert_eq!(resolved.project_id, "from-file");
}

#[test]
fn test_environment_reads_env_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    std::fs::write(
        &path,
        "# backend settings\nLOST_FOUND_TEST_ONLY_KEY=1\nFIREBASE_CERTIFICATE_HASH=abcdef123456\n",
    )
    .unwrap();

    let resolved = EnvironmentConfig::load(&path);
    assert_eq!(resolved.certificate_hash, "abcdef123456");
    assert!(std::env::var("LOST_FOUND_TEST_ONLY_KEY").is_err());
}

#[test]
fn test_environment_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let resolved = EnvironmentConfig::resolve(|_| None, &HashMap::new());
    let loaded = EnvironmentConfig::load(&dir.path().join("absent.env"));

    assert_eq!(resolved.project_number, "your_project_number_here");
    assert_eq!(loaded.oauth_client_id_web, resolved.oauth_client_id_web);
}

#[test]
fn test_masked_entries_hide_secrets() {
    let file_values = HashMap::from([(FIREBASE_API_KEY.to_string(), "AIzaSyRealKey".to_string())]);
    let resolved = EnvironmentConfig::resolve(|_| None, &file_values);

    let entries = resolved.masked_entries();
    assert_eq!(entries.len(), 10);
    let api_key = entries.iter().find(|(key, _)| *key == FIREBASE_API_KEY).unwrap();
    assert_eq!(api_key.1, "AIza****");
}
