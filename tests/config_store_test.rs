//! Integration tests for config persistence and resolution.

use std::fs;

use aicommits::ai::service::AiType;
use aicommits::core::config::{
    validate_ai_type, CommitType, Config, ConfigKey, ConfigStore, RawConfig, ResolveMode,
};
use aicommits::error::AicommitsError;
use tempfile::TempDir;

fn store(dir: &TempDir) -> ConfigStore {
    ConfigStore::at(dir.path().join("aicommits").join("config.toml"))
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_set_persists_canonical_values() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    store
        .set(&pairs(&[
            ("AI_SOURCE", "anthropic"),
            ("ANTHROPIC_KEY", "ak-secret"),
            ("type", "conventional"),
            ("temperature", "1.50"),
        ]))
        .unwrap();

    let values = store
        .get(&["AI_SOURCE".to_string(), "type".to_string(), "temperature".to_string()])
        .unwrap();
    assert_eq!(values[0], (ConfigKey::AiSource, Some("anthropic".to_string())));
    assert_eq!(values[1], (ConfigKey::Type, Some("conventional".to_string())));
    assert_eq!(values[2], (ConfigKey::Temperature, Some("1.5".to_string())));

    let config = Config::load_from(&store, &RawConfig::new(), ResolveMode::Strict).unwrap();
    assert_eq!(config.ai_source, AiType::Anthropic);
    assert_eq!(config.commit_type, CommitType::Conventional);
    assert_eq!(validate_ai_type(&config).unwrap(), AiType::Anthropic);
}

#[test]
fn test_set_is_all_or_nothing() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.set(&pairs(&[("locale", "fr")])).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let err = store
        .set(&pairs(&[("locale", "de"), ("timeout", "100")]))
        .unwrap_err();
    assert!(matches!(err, AicommitsError::InvalidConfig { ref key, .. } if key == "timeout"));

    let err = store
        .set(&pairs(&[("locale", "de"), ("OPENAI_MODEL", "gpt-4")]))
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid config property: OPENAI_MODEL");

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn test_missing_file_resolves_to_defaults() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let config = Config::load_from(&store, &RawConfig::new(), ResolveMode::Strict).unwrap();
    assert_eq!(config.ai_source, AiType::OpenAi);
    assert!(matches!(
        validate_ai_type(&config),
        Err(AicommitsError::MissingApiKey {
            key_name: "OPENAI_KEY",
            ..
        })
    ));
}

#[test]
fn test_hand_edited_invalid_value() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), "locale = \"de\"\nmax-length = \"5\"\n").unwrap();

    let strict = Config::load_from(&store, &RawConfig::new(), ResolveMode::Strict);
    assert!(matches!(
        strict,
        Err(AicommitsError::InvalidConfig { ref key, .. }) if key == "max-length"
    ));

    let lenient = Config::load_from(&store, &RawConfig::new(), ResolveMode::Lenient).unwrap();
    assert_eq!(lenient.locale, "de");
    assert_eq!(lenient.max_length, 50);
}

#[test]
fn test_overrides_beat_persisted_values() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.set(&pairs(&[("OPENAI_KEY", "sk-persisted")])).unwrap();

    let mut overrides = RawConfig::new();
    overrides.insert("type".to_string(), "conventional".to_string());
    overrides.insert("proxy".to_string(), String::new());

    let config = Config::load_from(&store, &overrides, ResolveMode::Strict).unwrap();
    assert_eq!(config.commit_type, CommitType::Conventional);
    assert!(config.proxy.is_none());
    assert!(config.openai_key.is_some());
}
