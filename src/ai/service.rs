//! Provider abstraction shared by every AI backend
//!
//! Each backend implements [`AiService`]: it builds its request once from the
//! config and the staged diff, performs one network call per phase and maps
//! the provider response into sanitized commit messages.

use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::core::config::CommitType;
use crate::error::{AicommitsError, Result};

/// A single trailing period directly after a word character
static TRAILING_PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w)\.$").expect("Invalid regex pattern for trailing period"));

/// Supported AI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiType {
    #[default]
    OpenAi,
    Anthropic,
}

impl AiType {
    pub const ALL: [AiType; 2] = [AiType::OpenAi, AiType::Anthropic];

    /// Name used in the `AI_SOURCE` config option
    pub fn name(&self) -> &'static str {
        match self {
            AiType::OpenAi => "openai",
            AiType::Anthropic => "anthropic",
        }
    }

    /// Config key holding this provider's API key
    pub fn key_name(&self) -> &'static str {
        match self {
            AiType::OpenAi => "OPENAI_KEY",
            AiType::Anthropic => "ANTHROPIC_KEY",
        }
    }

    /// Human-readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            AiType::OpenAi => "OpenAI",
            AiType::Anthropic => "Anthropic",
        }
    }

    /// Public status page, suggested on server-side failures
    pub fn status_page(&self) -> &'static str {
        match self {
            AiType::OpenAi => "https://status.openai.com",
            AiType::Anthropic => "https://status.anthropic.com",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|t| t.name() == name).copied()
    }
}

impl std::fmt::Display for AiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Commit message generation backed by a remote model
///
/// Instances are single-use: construct, run the phases in order, discard.
#[async_trait]
pub trait AiService: Send {
    /// Which provider this service talks to
    fn ai_type(&self) -> AiType;

    /// Ask for a commit message summarizing the diff
    ///
    /// Returns `None` when the provider produced no usable completion.
    async fn generate_message(&mut self) -> Result<Option<String>>;

    /// Refine the message into the given commit type
    async fn generate_conventional_commit_message(
        &mut self,
        commit_type: CommitType,
    ) -> Result<Option<String>>;
}

/// Generate candidate commit messages, best first
///
/// An empty result means no usable completion; callers must treat it as a failure.
pub async fn generate_commit_messages(
    service: &mut dyn AiService,
    commit_type: CommitType,
) -> Result<Vec<String>> {
    let Some(summary) = service.generate_message().await? else {
        debug!("{} returned no usable completion", service.ai_type());
        return Ok(Vec::new());
    };

    let mut candidates = Vec::new();
    if commit_type == CommitType::Conventional {
        if let Some(classified) = service
            .generate_conventional_commit_message(commit_type)
            .await?
        {
            candidates.push(classified);
        }
    }
    candidates.push(summary);

    Ok(deduplicate_messages(
        candidates.into_iter().filter(|m| !m.is_empty()).collect(),
    ))
}

/// Trim whitespace and drop a single trailing sentence period
pub fn sanitize_message(message: &str) -> String {
    TRAILING_PERIOD.replace(message.trim(), "$1").into_owned()
}

/// Remove exact duplicates, keeping the first occurrence of each message
pub fn deduplicate_messages(messages: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

/// POST a request and decode the JSON body of a successful response
pub(crate) async fn send_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    ai_type: AiType,
    request: HttpRequest,
    timeout_ms: u64,
) -> Result<T> {
    debug!("Sending {} request to {}", ai_type.display_name(), request.url);

    let response = transport
        .post_json(request)
        .await
        .map_err(|e| map_transport_error(ai_type, e, timeout_ms))?;
    let response = check_status(ai_type, response)?;

    Ok(serde_json::from_str(&response.body)?)
}

/// Convert a transport failure into the user-facing error
pub fn map_transport_error(ai_type: AiType, err: TransportError, timeout_ms: u64) -> AicommitsError {
    match err {
        TransportError::HostNotFound { host, syscall } => {
            AicommitsError::HostNotFound { host, syscall }
        }
        TransportError::Timeout => AicommitsError::Timeout {
            provider: ai_type.display_name(),
            timeout_ms,
        },
        TransportError::Other(err) => AicommitsError::Network(err),
    }
}

/// Reject responses outside the 2xx range
pub fn check_status(ai_type: AiType, response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let hint = (response.status >= 500)
        .then(|| format!("Check the API status: {}", ai_type.status_page()));

    Err(AicommitsError::ProviderHttp {
        provider: ai_type.display_name(),
        status: response.status,
        status_text: response.status_text,
        body: response.body,
        hint,
    })
}
