//! Custom error types for aicommits
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the aicommits application
#[derive(Error, Debug)]
pub enum AicommitsError {
    /// Not running in a git repository
    #[error("This directory is not a git repository.\n\n  → Run 'git init' to create one, or navigate to an existing git project.")]
    NotGitRepository,

    /// Nothing staged to summarize
    #[error("No staged changes found.\n\n  → Stage your changes manually, or automatically stage all changes with the `--all` flag.")]
    NoStagedChanges,

    /// A config option failed its parser
    #[error("Invalid config property {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// A config option name outside the known set
    #[error("Invalid config property: {0}")]
    UnknownConfigKey(String),

    /// The selected provider has no API key configured
    #[error("You are setting the ai source to {ai_source} but {key_name} is empty.\n\n  → Run 'aicommits config set {key_name}=<your key>' to configure it.")]
    MissingApiKey {
        ai_source: &'static str,
        key_name: &'static str,
    },

    /// DNS lookup for the provider host failed
    #[error("Error connecting to {host} ({syscall}). Are you connected to the internet?")]
    HostNotFound { host: String, syscall: String },

    /// Provider request exceeded the configured timeout
    #[error("Time out error: request took over {timeout_ms}ms.\n\n  → Try increasing the `timeout` config, or check the {provider} API status.")]
    Timeout {
        provider: &'static str,
        timeout_ms: u64,
    },

    /// Provider answered with a non-2xx status
    #[error("{}", format_provider_http(.provider, .status, .status_text, .body, .hint))]
    ProviderHttp {
        provider: &'static str,
        status: u16,
        status_text: String,
        body: String,
        hint: Option<String>,
    },

    /// The provider returned no usable completion
    #[error("No commit messages were generated. Try again.")]
    NoCommitMessages,

    /// Git operation error
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// A `git` subprocess exited unsuccessfully
    #[error("{0}")]
    GitCommand(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Operation cancelled by user
    #[error("Commit cancelled.")]
    Cancelled,
}

fn format_provider_http(
    provider: &str,
    status: &u16,
    status_text: &str,
    body: &str,
    hint: &Option<String>,
) -> String {
    let mut message = format!("{} API Error: {} - {}", provider, status, status_text);
    if !body.is_empty() {
        message.push_str("\n\n");
        message.push_str(body);
    }
    if let Some(hint) = hint {
        message.push_str("\n\n");
        message.push_str(hint);
    }
    message
}

impl AicommitsError {
    /// Build a validation failure for a config key
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        AicommitsError::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for AicommitsError {
    fn from(err: toml::de::Error) -> Self {
        AicommitsError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for AicommitsError {
    fn from(err: toml::ser::Error) -> Self {
        AicommitsError::Toml(err.to_string())
    }
}

/// Result type alias using AicommitsError
pub type Result<T> = std::result::Result<T, AicommitsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_http_includes_body_and_hint() {
        let err = AicommitsError::ProviderHttp {
            provider: "OpenAI",
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: "internal error".to_string(),
            hint: Some("Check the API status: https://status.openai.com".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "OpenAI API Error: 500 - Internal Server Error\n\ninternal error\n\nCheck the API status: https://status.openai.com"
        );
    }

    #[test]
    fn test_provider_http_without_body() {
        let err = AicommitsError::ProviderHttp {
            provider: "Anthropic",
            status: 401,
            status_text: "Unauthorized".to_string(),
            body: String::new(),
            hint: None,
        };
        assert_eq!(err.to_string(), "Anthropic API Error: 401 - Unauthorized");
    }

    #[test]
    fn test_invalid_config_message() {
        let err = AicommitsError::invalid_config("timeout", "Must be greater than 500ms");
        assert_eq!(
            err.to_string(),
            "Invalid config property timeout: Must be greater than 500ms"
        );
    }
}
