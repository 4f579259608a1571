//! [`Analyzer`] backed by a chat-completion provider.
//!
//! The whole inbound batch is pretty-printed into the prompt template as
//! `payload` and sent as a single user message. Any failure is logged and
//! surfaces as `None`; the notification goes out without analysis.

use alertbridge_core::config::{mask_secret, AnalysisConfig};
use alertbridge_core::Analyzer;
use async_trait::async_trait;
use serde_json::Value;

use crate::provider::{LlmError, LlmProvider, Message};
use crate::providers::create_provider;

pub struct LlmAnalyzer {
    provider: Box<dyn LlmProvider>,
    prompt_template: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmAnalyzer {
    /// # Errors
    ///
    /// [`LlmError::Prompt`] if `prompt_template` does not parse.
    pub fn new(
        provider: Box<dyn LlmProvider>,
        prompt_template: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Self, LlmError> {
        let prompt_template = prompt_template.into();
        minijinja::Environment::new()
            .template_from_str(&prompt_template)
            .map_err(|e| LlmError::Prompt(e.to_string()))?;

        Ok(Self {
            provider,
            prompt_template,
            temperature,
            max_tokens,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, LlmError> {
        tracing::info!(
            base_url = %config.base_url,
            model = %config.model,
            api_key = %mask_secret(&config.api_key),
            "configuring alert analysis"
        );
        Self::new(
            create_provider(config),
            config.prompt.clone(),
            config.temperature,
            config.max_tokens,
        )
    }

    pub fn render_prompt(&self, batch: &Value) -> Result<String, LlmError> {
        let payload = serde_json::to_string_pretty(batch)
            .map_err(|e| LlmError::Prompt(e.to_string()))?;
        minijinja::Environment::new()
            .render_str(&self.prompt_template, minijinja::context! { payload => payload })
            .map_err(|e| LlmError::Prompt(e.to_string()))
    }

    async fn request(&self, batch: &Value) -> Result<String, LlmError> {
        let prompt = self.render_prompt(batch)?;
        tracing::debug!(prompt = %prompt, "analysis prompt");
        self.provider
            .complete(vec![Message::user(prompt)], self.temperature, self.max_tokens)
            .await
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(&self, batch: &Value) -> Option<String> {
        tracing::info!(model = self.provider.model(), "requesting alert analysis");
        match self.request(batch).await {
            Ok(text) if text.trim().is_empty() => {
                tracing::error!(model = self.provider.model(), "analysis came back empty");
                None
            }
            Ok(text) => {
                tracing::info!(chars = text.chars().count(), "analysis received");
                tracing::debug!(analysis = %text, "analysis text");
                Some(text)
            }
            Err(e) => {
                tracing::error!(model = self.provider.model(), error = %e, "analysis request failed");
                None
            }
        }
    }

    fn name(&self) -> &str {
        self.provider.model()
    }
}
