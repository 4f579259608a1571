//! Server startup: builds the shared state from configuration.
//!
//! Everything that can be wrong with the deployment (templates, prompt,
//! channel) is checked here so that it fails before the listener binds.

use std::sync::Arc;

use alertbridge_core::Config;
use alertbridge_llm::LlmAnalyzer;
use alertbridge_notify::{create_channel, AlertDispatcher, ContentRenderer, TemplateStore};
use anyhow::Context;
use tracing::info;

use crate::state::AppState;

/// Build `AppState` from a validated [`Config`].
pub fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = TemplateStore::new(&config.notify.templates_path);
    let templates = store
        .load()
        .with_context(|| format!("loading alert templates from {}", store.path().display()))?;

    let renderer = ContentRenderer::new(Arc::new(templates), config.notify.locale);
    let channel = create_channel(config.notify.channel, &config.notify.webhook_url);
    let analyzer = LlmAnalyzer::from_config(&config.analysis).context("configuring alert analysis")?;

    let dispatcher = AlertDispatcher::new(renderer, channel, Arc::new(analyzer));
    info!(channel = dispatcher.channel_name(), "dispatcher ready");

    Ok(Arc::new(AppState::new(dispatcher)))
}
