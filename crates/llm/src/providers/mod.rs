pub mod openai;

use alertbridge_core::config::AnalysisConfig;

use crate::provider::LlmProvider;

/// Create the chat-completion provider described by `config`.
pub fn create_provider(config: &AnalysisConfig) -> Box<dyn LlmProvider> {
    Box::new(openai::OpenAiProvider::new(
        config.api_key.clone(),
        config.model.clone(),
        config.base_url.clone(),
    ))
}
