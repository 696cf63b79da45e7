//! Anthropic messages API client

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ai::prompts::generate_prompt;
use crate::ai::service::{sanitize_message, send_json, AiService, AiType, ChatMessage};
use crate::ai::transport::{HttpRequest, Transport};
use crate::core::config::{CommitType, Config};
use crate::core::git::StagedDiff;
use crate::error::Result;

/// Anthropic API base URL
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages client
///
/// Sends the system prompt (including any commit type instructions) and the
/// diff in one request, so there is no separate classification round trip.
pub struct AnthropicService {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: SecretString,
    timeout_ms: u64,
    request: MessagesRequest,
    message: Option<String>,
}

impl AnthropicService {
    pub fn new(config: &Config, staged: &StagedDiff, transport: Arc<dyn Transport>) -> Self {
        let request = MessagesRequest {
            model: config.anthropic_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system: generate_prompt(&config.locale, config.max_length, config.commit_type),
            messages: vec![ChatMessage::user(format!(
                "Here is the diff:\n{}",
                staged.diff
            ))],
        };

        Self {
            transport,
            base_url: ANTHROPIC_API_BASE.to_string(),
            api_key: config
                .anthropic_key
                .clone()
                .unwrap_or_else(|| SecretString::from(String::new())),
            timeout_ms: config.timeout,
            request,
            message: None,
        }
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request(&self) -> &MessagesRequest {
        &self.request
    }
}

#[async_trait]
impl AiService for AnthropicService {
    fn ai_type(&self) -> AiType {
        AiType::Anthropic
    }

    async fn generate_message(&mut self) -> Result<Option<String>> {
        let request = HttpRequest {
            url: format!("{}{}", self.base_url, MESSAGES_PATH),
            headers: vec![
                (
                    "x-api-key".to_string(),
                    self.api_key.expose_secret().to_string(),
                ),
                (
                    "anthropic-version".to_string(),
                    ANTHROPIC_VERSION.to_string(),
                ),
            ],
            body: serde_json::to_value(&self.request)?,
        };

        let response: MessagesResponse = send_json(
            self.transport.as_ref(),
            AiType::Anthropic,
            request,
            self.timeout_ms,
        )
        .await?;

        self.message = response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .map(|text| sanitize_message(&text))
            .find(|text| !text.is_empty());

        Ok(self.message.clone())
    }

    async fn generate_conventional_commit_message(
        &mut self,
        _commit_type: CommitType,
    ) -> Result<Option<String>> {
        // The commit type was already part of the system prompt
        match &self.message {
            Some(message) => Ok(Some(message.clone())),
            None => self.generate_message().await,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Anthropic API Request/Response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::service::generate_commit_messages;
    use crate::ai::transport::{HttpResponse, MockTransport, TransportError};

    fn config(commit_type: CommitType) -> Config {
        Config {
            ai_source: AiType::Anthropic,
            anthropic_key: Some(SecretString::from("ak-test".to_string())),
            commit_type,
            ..Config::default()
        }
    }

    fn staged() -> StagedDiff {
        StagedDiff {
            files: vec!["src/lib.rs".to_string()],
            diff: "+pub fn hello() {}\n".to_string(),
        }
    }

    fn ok(body: serde_json::Value) -> std::result::Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: body.to_string(),
        })
    }

    #[test]
    fn test_request_shape() {
        let service = AnthropicService::new(
            &config(CommitType::Conventional),
            &staged(),
            Arc::new(MockTransport::new()),
        );

        let body = serde_json::to_value(service.request()).unwrap();
        assert_eq!(body["model"], "claude-2.1");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["temperature"], 0.7);
        assert!(body["system"].as_str().unwrap().contains("- feat:"));
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(
            body["messages"][0]["content"],
            "Here is the diff:\n+pub fn hello() {}\n"
        );
    }

    #[test]
    fn test_unscoped_system_prompt_has_no_types() {
        let service = AnthropicService::new(
            &config(CommitType::Unscoped),
            &staged(),
            Arc::new(MockTransport::new()),
        );

        assert!(!service.request().system.contains("Choose a type"));
    }

    #[tokio::test]
    async fn test_single_request_for_conventional_flow() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|req| {
                req.url == "https://api.anthropic.com/v1/messages"
                    && req
                        .headers
                        .contains(&("x-api-key".to_string(), "ak-test".to_string()))
                    && req
                        .headers
                        .contains(&("anthropic-version".to_string(), "2023-06-01".to_string()))
            })
            .times(1)
            .returning(|_| {
                ok(serde_json::json!({
                    "content": [{ "type": "text", "text": "feat(lib): add hello function." }]
                }))
            });

        let mut service = AnthropicService::new(
            &config(CommitType::Conventional),
            &staged(),
            Arc::new(transport),
        );

        let messages = generate_commit_messages(&mut service, CommitType::Conventional)
            .await
            .unwrap();

        assert_eq!(messages, vec!["feat(lib): add hello function"]);
    }

    #[tokio::test]
    async fn test_empty_content_is_empty_result() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .returning(|_| ok(serde_json::json!({ "content": [] })));

        let mut service = AnthropicService::new(
            &config(CommitType::Unscoped),
            &staged(),
            Arc::new(transport),
        );

        assert_eq!(service.generate_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_client_error_has_no_status_hint() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().returning(|_| {
            Ok(HttpResponse {
                status: 401,
                status_text: "Unauthorized".to_string(),
                body: r#"{"type":"error","error":{"type":"authentication_error"}}"#.to_string(),
            })
        });

        let mut service = AnthropicService::new(
            &config(CommitType::Unscoped),
            &staged(),
            Arc::new(transport),
        );

        let message = service.generate_message().await.unwrap_err().to_string();
        assert!(message.starts_with("Anthropic API Error: 401 - Unauthorized"));
        assert!(message.contains("authentication_error"));
        assert!(!message.contains("Check the API status"));
    }

    #[tokio::test]
    async fn test_host_not_found_names_host() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().returning(|_| {
            Err(TransportError::HostNotFound {
                host: "api.anthropic.com".to_string(),
                syscall: "getaddrinfo".to_string(),
            })
        });

        let mut service = AnthropicService::new(
            &config(CommitType::Unscoped),
            &staged(),
            Arc::new(transport),
        );

        let message = service.generate_message().await.unwrap_err().to_string();
        assert!(message.contains("api.anthropic.com"));
    }
}
