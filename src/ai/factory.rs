//! Provider selection

use std::sync::Arc;

use crate::ai::anthropic::AnthropicService;
use crate::ai::openai::OpenAiService;
use crate::ai::service::{AiService, AiType};
use crate::ai::transport::{ReqwestTransport, Transport};
use crate::core::config::Config;
use crate::core::git::StagedDiff;
use crate::error::Result;

/// Build the service for a provider
///
/// Performs no validation; run `validate_ai_type` first.
pub fn create(
    ai_type: AiType,
    config: &Config,
    staged: &StagedDiff,
    transport: Arc<dyn Transport>,
) -> Box<dyn AiService> {
    match ai_type {
        AiType::OpenAi => Box::new(OpenAiService::new(config, staged, transport)),
        AiType::Anthropic => Box::new(AnthropicService::new(config, staged, transport)),
    }
}

/// Build the service with an HTTP transport configured from `config`
pub fn create_default(
    ai_type: AiType,
    config: &Config,
    staged: &StagedDiff,
) -> Result<Box<dyn AiService>> {
    let transport = ReqwestTransport::new(config.timeout, config.proxy.as_deref())?;
    Ok(create(ai_type, config, staged, Arc::new(transport)))
}
