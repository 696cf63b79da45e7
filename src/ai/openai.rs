//! OpenAI chat completions client
//!
//! Keeps the whole conversation in its request so the follow-up
//! classification turn sees the summary it produced first.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ai::prompts::{build_summary_instructions, build_type_classification_instructions};
use crate::ai::service::{sanitize_message, send_json, AiService, AiType, ChatMessage, Role};
use crate::ai::transport::{HttpRequest, Transport};
use crate::core::config::{CommitType, Config};
use crate::core::git::StagedDiff;
use crate::error::Result;

/// OpenAI API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com";

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// OpenAI chat completion client
pub struct OpenAiService {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: SecretString,
    timeout_ms: u64,
    request: ChatCompletionRequest,
}

impl OpenAiService {
    /// Build the chat completion request for the staged diff
    pub fn new(config: &Config, staged: &StagedDiff, transport: Arc<dyn Transport>) -> Self {
        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage::system(build_summary_instructions(
                    &config.locale,
                    config.max_length,
                )),
                ChatMessage::user(staged.diff.clone()),
            ],
            temperature: config.temperature,
            top_p: 1,
            frequency_penalty: 0,
            presence_penalty: 0,
            max_tokens: config.max_tokens,
            stream: false,
            n: 1,
        };

        Self {
            transport,
            base_url: OPENAI_API_BASE.to_string(),
            api_key: config
                .openai_key
                .clone()
                .unwrap_or_else(|| SecretString::from(String::new())),
            timeout_ms: config.timeout,
            request,
        }
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The request as it will be sent next
    pub fn request(&self) -> &ChatCompletionRequest {
        &self.request
    }

    async fn create_chat_completion(&self) -> Result<ChatCompletionResponse> {
        let request = HttpRequest {
            url: format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH),
            headers: vec![(
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key.expose_secret()),
            )],
            body: serde_json::to_value(&self.request)?,
        };

        send_json(
            self.transport.as_ref(),
            AiType::OpenAi,
            request,
            self.timeout_ms,
        )
        .await
    }

    fn last_assistant_message(&self) -> Option<String> {
        self.request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.clone())
    }
}

#[async_trait]
impl AiService for OpenAiService {
    fn ai_type(&self) -> AiType {
        AiType::OpenAi
    }

    async fn generate_message(&mut self) -> Result<Option<String>> {
        let completion = self.create_chat_completion().await?;

        let message = completion
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.and_then(|m| m.content))
            .map(|content| sanitize_message(&content))
            .find(|content| !content.is_empty());

        if let Some(message) = &message {
            self.request
                .messages
                .push(ChatMessage::assistant(message.clone()));
        }

        Ok(message)
    }

    async fn generate_conventional_commit_message(
        &mut self,
        commit_type: CommitType,
    ) -> Result<Option<String>> {
        let instructions = build_type_classification_instructions(commit_type);
        if instructions.is_empty() {
            return Ok(self.last_assistant_message());
        }

        self.request.messages.push(ChatMessage::user(instructions));
        self.generate_message().await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI API Request/Response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub top_p: u8,
    pub frequency_penalty: u8,
    pub presence_penalty: u8,
    pub max_tokens: u32,
    pub stream: bool,
    pub n: u8,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
