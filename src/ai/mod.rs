//! AI integration module
//!
//! This module turns a staged diff into commit messages:
//! - Prompt text and builders
//! - Provider clients for OpenAI and Anthropic
//! - The HTTP transport they share

pub mod anthropic;
pub mod factory;
pub mod openai;
pub mod prompts;
pub mod service;
pub mod templates;
pub mod transport;

pub use anthropic::AnthropicService;
pub use openai::OpenAiService;
pub use service::{generate_commit_messages, AiService, AiType};
pub use transport::{ReqwestTransport, Transport};
