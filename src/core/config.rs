//! Application configuration management
//!
//! Every option has its own parser that turns an optional raw string into a
//! typed value or a named validation failure. Options are resolved in a fixed
//! order from explicit overrides, then the persisted config file, then the
//! built-in defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::ai::service::AiType;
use crate::error::{AicommitsError, Result};

/// Flat mapping of option name to raw string value
pub type RawConfig = BTreeMap<String, String>;

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-2.1";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_LENGTH: usize = 50;
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

const MIN_TIMEOUT_MS: u64 = 500;
const MIN_MAX_LENGTH: usize = 20;

/// Anthropic models accepted by `ANTHROPIC_MODEL`
pub const ANTHROPIC_MODELS: &[&str] = &[
    "claude-2.1",
    "claude-2.0",
    "claude-instant-1.2",
    "claude-3-haiku-20240307",
];

static LOCALE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z-]+$").expect("Invalid regex pattern for locale validation")
});

static INTEGER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("Invalid regex pattern for integer validation"));

static TEMPERATURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(2|\d)(\.\d{1,2})?$").expect("Invalid regex pattern for temperature validation")
});

static PROXY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("Invalid regex pattern for proxy validation"));

// ─────────────────────────────────────────────────────────────────────────────
// Option keys
// ─────────────────────────────────────────────────────────────────────────────

/// The closed set of recognized config options
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    AiSource,
    OpenAiKey,
    AnthropicModel,
    AnthropicKey,
    Locale,
    Type,
    Proxy,
    Model,
    Timeout,
    MaxLength,
    MaxTokens,
    Temperature,
}

impl ConfigKey {
    /// All keys, in resolution order
    pub const ALL: [ConfigKey; 12] = [
        ConfigKey::AiSource,
        ConfigKey::OpenAiKey,
        ConfigKey::AnthropicModel,
        ConfigKey::AnthropicKey,
        ConfigKey::Locale,
        ConfigKey::Type,
        ConfigKey::Proxy,
        ConfigKey::Model,
        ConfigKey::Timeout,
        ConfigKey::MaxLength,
        ConfigKey::MaxTokens,
        ConfigKey::Temperature,
    ];

    /// Name used on the command line and in the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::AiSource => "AI_SOURCE",
            ConfigKey::OpenAiKey => "OPENAI_KEY",
            ConfigKey::AnthropicModel => "ANTHROPIC_MODEL",
            ConfigKey::AnthropicKey => "ANTHROPIC_KEY",
            ConfigKey::Locale => "locale",
            ConfigKey::Type => "type",
            ConfigKey::Proxy => "proxy",
            ConfigKey::Model => "model",
            ConfigKey::Timeout => "timeout",
            ConfigKey::MaxLength => "max-length",
            ConfigKey::MaxTokens => "max-tokens",
            ConfigKey::Temperature => "temperature",
        }
    }

    /// Whether the value is a secret that should be masked on display
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::OpenAiKey | ConfigKey::AnthropicKey)
    }

    /// Validate a raw value and return the canonical string to persist
    pub fn canonicalize(&self, value: &str) -> Result<String> {
        let raw = Some(value);
        let canonical = match self {
            ConfigKey::AiSource => parse_ai_source(raw)?.name().to_string(),
            ConfigKey::OpenAiKey => expose_or_empty(parse_openai_key(raw)?),
            ConfigKey::AnthropicModel => parse_anthropic_model(raw)?,
            ConfigKey::AnthropicKey => expose_or_empty(parse_anthropic_key(raw)?),
            ConfigKey::Locale => parse_locale(raw)?,
            ConfigKey::Type => parse_commit_type(raw)?.as_str().to_string(),
            ConfigKey::Proxy => parse_proxy(raw)?.unwrap_or_default(),
            ConfigKey::Model => parse_model(raw)?,
            ConfigKey::Timeout => parse_timeout(raw)?.to_string(),
            ConfigKey::MaxLength => parse_max_length(raw)?.to_string(),
            ConfigKey::MaxTokens => parse_max_tokens(raw)?.to_string(),
            ConfigKey::Temperature => parse_temperature(raw)?.to_string(),
        };
        Ok(canonical)
    }
}

impl FromStr for ConfigKey {
    type Err = AicommitsError;

    fn from_str(s: &str) -> Result<Self> {
        ConfigKey::ALL
            .iter()
            .find(|key| key.as_str() == s)
            .copied()
            .ok_or_else(|| AicommitsError::UnknownConfigKey(s.to_string()))
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn expose_or_empty(secret: Option<SecretString>) -> String {
    secret
        .map(|s| s.expose_secret().to_string())
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Commit type
// ─────────────────────────────────────────────────────────────────────────────

/// Commit message taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitType {
    /// Free-form message
    #[default]
    Unscoped,
    /// `<type>(<optional scope>): <message>`
    Conventional,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Unscoped => "",
            CommitType::Conventional => "conventional",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-option parsers
// ─────────────────────────────────────────────────────────────────────────────

/// Treat empty strings as absent
fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !v.is_empty())
}

fn ensure(key: ConfigKey, condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(AicommitsError::invalid_config(key.as_str(), message))
    }
}

pub fn parse_ai_source(raw: Option<&str>) -> Result<AiType> {
    let Some(name) = present(raw) else {
        return Ok(AiType::default());
    };

    AiType::from_name(name).ok_or_else(|| {
        AicommitsError::invalid_config(
            ConfigKey::AiSource.as_str(),
            format!(
                "Unknown AI source '{}'. Must be {}",
                name,
                AiType::ALL
                    .iter()
                    .map(|t| format!("'{}'", t.name()))
                    .collect::<Vec<_>>()
                    .join(" or ")
            ),
        )
    })
}

pub fn parse_openai_key(raw: Option<&str>) -> Result<Option<SecretString>> {
    let Some(key) = present(raw) else {
        return Ok(None);
    };
    // Key length varies between 43 and 51 characters with no published rule
    ensure(ConfigKey::OpenAiKey, key.starts_with("sk-"), "Must start with \"sk-\"")?;
    Ok(Some(SecretString::from(key.to_string())))
}

pub fn parse_anthropic_key(raw: Option<&str>) -> Result<Option<SecretString>> {
    Ok(present(raw).map(|key| SecretString::from(key.to_string())))
}

pub fn parse_anthropic_model(raw: Option<&str>) -> Result<String> {
    let Some(model) = present(raw) else {
        return Ok(DEFAULT_ANTHROPIC_MODEL.to_string());
    };
    ensure(
        ConfigKey::AnthropicModel,
        ANTHROPIC_MODELS.contains(&model),
        &format!(
            "Invalid model type of Anthropic. Available models: {}",
            ANTHROPIC_MODELS.join(", ")
        ),
    )?;
    Ok(model.to_string())
}

pub fn parse_locale(raw: Option<&str>) -> Result<String> {
    let Some(locale) = present(raw) else {
        return Ok(DEFAULT_LOCALE.to_string());
    };
    ensure(
        ConfigKey::Locale,
        LOCALE_PATTERN.is_match(locale),
        "Must be a valid locale (letters and dashes/underscores). You can consult the list of codes in: https://wikipedia.org/wiki/List_of_ISO_639-1_codes",
    )?;
    Ok(locale.to_string())
}

pub fn parse_commit_type(raw: Option<&str>) -> Result<CommitType> {
    match present(raw) {
        None => Ok(CommitType::Unscoped),
        Some("conventional") => Ok(CommitType::Conventional),
        Some(_) => Err(AicommitsError::invalid_config(
            ConfigKey::Type.as_str(),
            "Invalid commit type",
        )),
    }
}

pub fn parse_proxy(raw: Option<&str>) -> Result<Option<String>> {
    let Some(url) = present(raw) else {
        return Ok(None);
    };
    ensure(ConfigKey::Proxy, PROXY_PATTERN.is_match(url), "Must be a valid URL")?;
    Ok(Some(url.to_string()))
}

pub fn parse_model(raw: Option<&str>) -> Result<String> {
    Ok(present(raw).unwrap_or(DEFAULT_OPENAI_MODEL).to_string())
}

/// Parse a digits-only value into an unsigned integer
fn parse_integer<T: FromStr>(key: ConfigKey, value: &str) -> Result<T> {
    ensure(key, INTEGER_PATTERN.is_match(value), "Must be an integer")?;
    value
        .parse::<T>()
        .map_err(|_| AicommitsError::invalid_config(key.as_str(), "Must be an integer"))
}

pub fn parse_timeout(raw: Option<&str>) -> Result<u64> {
    let Some(timeout) = present(raw) else {
        return Ok(DEFAULT_TIMEOUT_MS);
    };
    let parsed: u64 = parse_integer(ConfigKey::Timeout, timeout)?;
    ensure(
        ConfigKey::Timeout,
        parsed >= MIN_TIMEOUT_MS,
        "Must be greater than 500ms",
    )?;
    Ok(parsed)
}

pub fn parse_max_length(raw: Option<&str>) -> Result<usize> {
    let Some(max_length) = present(raw) else {
        return Ok(DEFAULT_MAX_LENGTH);
    };
    let parsed: usize = parse_integer(ConfigKey::MaxLength, max_length)?;
    ensure(
        ConfigKey::MaxLength,
        parsed >= MIN_MAX_LENGTH,
        "Must be greater than 20 characters",
    )?;
    Ok(parsed)
}

pub fn parse_max_tokens(raw: Option<&str>) -> Result<u32> {
    match present(raw) {
        None => Ok(DEFAULT_MAX_TOKENS),
        Some(max_tokens) => parse_integer(ConfigKey::MaxTokens, max_tokens),
    }
}

pub fn parse_temperature(raw: Option<&str>) -> Result<f64> {
    let Some(temperature) = present(raw) else {
        return Ok(DEFAULT_TEMPERATURE);
    };
    ensure(
        ConfigKey::Temperature,
        TEMPERATURE_PATTERN.is_match(temperature),
        "Must be decimal between 0 and 2",
    )?;
    let parsed: f64 = temperature.parse().map_err(|_| {
        AicommitsError::invalid_config(
            ConfigKey::Temperature.as_str(),
            "Must be decimal between 0 and 2",
        )
    })?;
    ensure(ConfigKey::Temperature, parsed > 0.0, "Must be greater than 0")?;
    ensure(
        ConfigKey::Temperature,
        parsed <= 2.0,
        "Must be less than or equal to 2",
    )?;
    Ok(parsed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolved configuration
// ─────────────────────────────────────────────────────────────────────────────

/// How invalid values are handled during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Fail on the first invalid value
    #[default]
    Strict,
    /// Log invalid values and fall back to their defaults
    Lenient,
}

/// Validated application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_source: AiType,
    pub openai_key: Option<SecretString>,
    pub anthropic_model: String,
    pub anthropic_key: Option<SecretString>,
    pub locale: String,
    pub commit_type: CommitType,
    pub proxy: Option<String>,
    pub model: String,
    /// Request timeout in milliseconds
    pub timeout: u64,
    pub max_length: usize,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_source: AiType::default(),
            openai_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            anthropic_key: None,
            locale: DEFAULT_LOCALE.to_string(),
            commit_type: CommitType::Unscoped,
            proxy: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT_MS,
            max_length: DEFAULT_MAX_LENGTH,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Config {
    /// Resolve configuration from the persisted file plus explicit overrides
    pub fn load(overrides: &RawConfig, mode: ResolveMode) -> Result<Self> {
        Self::load_from(&ConfigStore::default_location()?, overrides, mode)
    }

    /// Same as [`Config::load`], reading persisted values from `store`
    pub fn load_from(store: &ConfigStore, overrides: &RawConfig, mode: ResolveMode) -> Result<Self> {
        let persisted = store.read()?;
        debug!("Loaded {} persisted config values", persisted.len());
        Self::resolve(overrides, &persisted, mode)
    }

    /// Resolve every option, overrides first, then persisted values, then defaults
    pub fn resolve(overrides: &RawConfig, persisted: &RawConfig, mode: ResolveMode) -> Result<Self> {
        let raw = |key: ConfigKey| {
            overrides
                .get(key.as_str())
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .or_else(|| persisted.get(key.as_str()).map(String::as_str))
        };

        Ok(Self {
            ai_source: resolve_field(mode, raw(ConfigKey::AiSource), parse_ai_source)?,
            openai_key: resolve_field(mode, raw(ConfigKey::OpenAiKey), parse_openai_key)?,
            anthropic_model: resolve_field(
                mode,
                raw(ConfigKey::AnthropicModel),
                parse_anthropic_model,
            )?,
            anthropic_key: resolve_field(mode, raw(ConfigKey::AnthropicKey), parse_anthropic_key)?,
            locale: resolve_field(mode, raw(ConfigKey::Locale), parse_locale)?,
            commit_type: resolve_field(mode, raw(ConfigKey::Type), parse_commit_type)?,
            proxy: resolve_field(mode, raw(ConfigKey::Proxy), parse_proxy)?,
            model: resolve_field(mode, raw(ConfigKey::Model), parse_model)?,
            timeout: resolve_field(mode, raw(ConfigKey::Timeout), parse_timeout)?,
            max_length: resolve_field(mode, raw(ConfigKey::MaxLength), parse_max_length)?,
            max_tokens: resolve_field(mode, raw(ConfigKey::MaxTokens), parse_max_tokens)?,
            temperature: resolve_field(mode, raw(ConfigKey::Temperature), parse_temperature)?,
        })
    }

    /// API key configured for the given provider
    pub fn api_key(&self, ai_type: AiType) -> Option<&SecretString> {
        match ai_type {
            AiType::OpenAi => self.openai_key.as_ref(),
            AiType::Anthropic => self.anthropic_key.as_ref(),
        }
    }
}

fn resolve_field<T>(
    mode: ResolveMode,
    raw: Option<&str>,
    parser: fn(Option<&str>) -> Result<T>,
) -> Result<T> {
    match parser(raw) {
        Ok(value) => Ok(value),
        Err(err) if mode == ResolveMode::Lenient => {
            warn!("Ignoring invalid config value: {}", err);
            parser(None)
        }
        Err(err) => Err(err),
    }
}

/// Check that the selected provider has its API key configured
pub fn validate_ai_type(config: &Config) -> Result<AiType> {
    let ai_type = config.ai_source;
    match config.api_key(ai_type) {
        Some(key) if !key.expose_secret().is_empty() => Ok(ai_type),
        _ => Err(AicommitsError::MissingApiKey {
            ai_source: ai_type.name(),
            key_name: ai_type.key_name(),
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk store for raw config values
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the platform config directory
    pub fn default_location() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "aicommits", "aicommits")
            .ok_or_else(|| AicommitsError::Config("Could not determine config directory".into()))?;

        Ok(Self::at(project_dirs.config_dir().join("config.toml")))
    }

    /// Store at an explicit path
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all persisted values; a missing file is an empty config
    pub fn read(&self) -> Result<RawConfig> {
        if !self.path.exists() {
            return Ok(RawConfig::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let table: BTreeMap<String, toml::Value> = toml::from_str(&contents)?;

        Ok(table
            .into_iter()
            .map(|(key, value)| {
                let raw = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, raw)
            })
            .collect())
    }

    /// Look up persisted values for the given keys
    pub fn get(&self, keys: &[String]) -> Result<Vec<(ConfigKey, Option<String>)>> {
        let keys = keys
            .iter()
            .map(|k| k.parse::<ConfigKey>())
            .collect::<Result<Vec<_>>>()?;
        let config = self.read()?;

        Ok(keys
            .into_iter()
            .map(|key| (key, config.get(key.as_str()).cloned()))
            .collect())
    }

    /// Validate and persist key/value pairs
    ///
    /// Nothing is written unless every pair names a known key and passes its parser.
    pub fn set(&self, pairs: &[(String, String)]) -> Result<()> {
        let mut config = self.read()?;

        for (name, value) in pairs {
            let key: ConfigKey = name.parse()?;
            let canonical = key.canonicalize(value)?;
            config.insert(key.as_str().to_string(), canonical);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(&config)?;
        fs::write(&self.path, contents)?;
        debug!("Wrote {} config values to {}", pairs.len(), self.path.display());

        Ok(())
    }
}
