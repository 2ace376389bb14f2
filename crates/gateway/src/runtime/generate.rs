//! Answer Generator: one prompt in, one answer out.

use std::sync::Arc;

use tb_domain::error::{Error, Result};
use tb_providers::{ChatRequest, LlmProvider};

/// Thin wrapper over an [`LlmProvider`] that insists on a non-empty answer.
///
/// Each [`generate`](Self::generate) call makes exactly one provider call.
#[derive(Clone)]
pub struct AnswerGenerator {
    provider: Arc<dyn LlmProvider>,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let resp = self.provider.chat(&ChatRequest::from_prompt(prompt)).await?;

        if resp.content.trim().is_empty() {
            let reason = resp.finish_reason.as_deref().unwrap_or("unknown");
            return Err(Error::Provider {
                provider: self.provider.provider_id().to_owned(),
                message: format!("empty response (finish reason: {reason})"),
            });
        }

        tracing::debug!(
            provider = %self.provider.provider_id(),
            model = %resp.model,
            answer_chars = resp.content.chars().count(),
            "answer generated"
        );
        Ok(resp.content)
    }
}
