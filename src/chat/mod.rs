//! The chat service: template rendering plus provider dispatch.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::ai::AiProviderFactory;
use crate::errors::AppError;

mod templates;

pub use templates::{PromptContext, PromptTemplates, TaskType};

/// A validated chat request, ready for dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub context: Option<String>,
    pub task_type: TaskType,
    pub provider: String,
}

/// The provider's answer.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub output: String,
}

/// Renders the prompt for a request and runs it through the requested
/// provider.
pub struct ChatService {
    factory: Arc<AiProviderFactory>,
    templates: PromptTemplates,
}

impl ChatService {
    pub fn new(factory: Arc<AiProviderFactory>, templates: PromptTemplates) -> Self {
        Self { factory, templates }
    }

    pub async fn query(&self, request: &ChatRequest) -> Result<ChatOutcome, AppError> {
        let prompt = self.templates.render(
            request.task_type,
            &PromptContext {
                query: &request.query,
                context: request.context.as_deref(),
            },
        );

        let client = self.factory.get_client(&request.provider)?;
        info!(
            provider = client.provider_name(),
            task = %request.task_type,
            prompt_len = prompt.len(),
            "dispatching chat query"
        );

        let output = client.query(&prompt).await?;
        Ok(ChatOutcome { output })
    }
}
