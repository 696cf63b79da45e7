//! Configuration CLI command handlers

use crate::cli::commands::ConfigCommand;
use crate::core::config::{ConfigKey, ConfigStore};
use crate::error::{AicommitsError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand, store: &ConfigStore) -> Result<()> {
    match command {
        ConfigCommand::Get { keys } => handle_get(&keys, store),
        ConfigCommand::Set { pairs } => handle_set(&pairs, store),
    }
}

/// Print `key=value` for each requested key, masking secrets
fn handle_get(keys: &[String], store: &ConfigStore) -> Result<()> {
    for (key, value) in store.get(keys)? {
        println!("{}", format_entry(key, value.as_deref()));
    }
    Ok(())
}

fn handle_set(pairs: &[String], store: &ConfigStore) -> Result<()> {
    let pairs = pairs
        .iter()
        .map(|pair| parse_assignment(pair))
        .collect::<Result<Vec<_>>>()?;

    store.set(&pairs)?;
    println!("✓ Saved {} to {}", pairs.len(), store.path().display());
    Ok(())
}

/// Split `key=value` at the first `=`
fn parse_assignment(pair: &str) -> Result<(String, String)> {
    pair.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| {
            AicommitsError::InvalidInput(format!(
                "Invalid assignment '{}'.\n\n  → Use the form key=value, e.g. OPENAI_KEY=sk-...",
                pair
            ))
        })
}

fn format_entry(key: ConfigKey, value: Option<&str>) -> String {
    let value = value.unwrap_or("");
    if key.is_secret() && !value.is_empty() {
        format!("{}={}", key, mask_secret(value))
    } else {
        format!("{}={}", key, value)
    }
}

/// Mask a secret for display, keeping only its edges
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("sk-1234567890abcdef"), "sk-1...cdef");
    }

    #[test]
    fn test_parse_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("proxy=http://host?a=b").unwrap(),
            ("proxy".to_string(), "http://host?a=b".to_string())
        );
        assert_eq!(
            parse_assignment("type=").unwrap(),
            ("type".to_string(), String::new())
        );
        assert!(parse_assignment("locale").is_err());
    }

    #[test]
    fn test_format_entry_masks_only_secrets() {
        assert_eq!(
            format_entry(ConfigKey::OpenAiKey, Some("sk-1234567890abcdef")),
            "OPENAI_KEY=sk-1...cdef"
        );
        assert_eq!(format_entry(ConfigKey::Locale, Some("de")), "locale=de");
        assert_eq!(format_entry(ConfigKey::AnthropicKey, None), "ANTHROPIC_KEY=");
    }

    #[test]
    fn test_set_then_get_through_handlers() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ConfigStore::at(dir.path().join("config.toml"));

        handle_config(
            ConfigCommand::Set {
                pairs: vec!["locale=de".to_string(), "max-length=72".to_string()],
            },
            &store,
        )
        .unwrap();

        let values = store
            .get(&["locale".to_string(), "max-length".to_string()])
            .unwrap();
        assert_eq!(values[0].1.as_deref(), Some("de"));
        assert_eq!(values[1].1.as_deref(), Some("72"));
    }

    #[test]
    fn test_set_rejects_malformed_pair_before_writing() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ConfigStore::at(dir.path().join("config.toml"));

        let result = handle_config(
            ConfigCommand::Set {
                pairs: vec!["locale=de".to_string(), "oops".to_string()],
            },
            &store,
        );

        assert!(result.is_err());
        assert!(!store.path().exists());
    }
}
