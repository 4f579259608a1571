//! Channel trait definition and shared error types.

use std::path::PathBuf;
use std::time::Instant;

use alertbridge_core::Alert;

use crate::phrases::phrases;
use crate::templating::ContentRenderer;

/// Errors that can occur while loading templates or delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{channel} rejected the message: {message}")]
    Rejected {
        channel: &'static str,
        message: String,
    },

    #[error("unexpected webhook response: {0}")]
    Response(String),

    #[error("failed to read template file {}: {source}", .path.display())]
    TemplateLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid template file {}: {source}", .path.display())]
    TemplateParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Everything a channel needs to build its provider payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlertMessage {
    pub title: String,
    /// Rendered alert blocks.
    pub content: String,
    /// Heading plus analysis text; only set for batches without resolved alerts.
    pub analysis: Option<String>,
    /// True when any alert in the batch is resolved.
    pub resolved: bool,
}

impl AlertMessage {
    pub fn compose(renderer: &ContentRenderer, alerts: &[Alert], analysis: Option<&str>) -> Self {
        let p = phrases(renderer.locale());
        let resolved = alerts.iter().any(Alert::is_resolved);
        let content = renderer.render(alerts);

        let analysis = match analysis {
            Some(text) if !text.is_empty() && !resolved => {
                Some(format!("{}\n{}", p.analysis_heading, text))
            }
            _ => None,
        };

        Self {
            title: (if resolved { p.resolved_title } else { p.firing_title }).to_string(),
            content,
            analysis,
            resolved,
        }
    }
}

/// Trait for chat provider implementations.
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Post a composed message. `Ok` only when the provider acknowledged it.
    async fn deliver(&self, message: &AlertMessage) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "feishu").
    fn channel_name(&self) -> &str;

    /// Render `alerts`, deliver them, and report whether the provider
    /// accepted the message. Failures are logged, never returned.
    async fn send(
        &self,
        renderer: &ContentRenderer,
        alerts: &[Alert],
        analysis: Option<&str>,
    ) -> bool {
        let message = AlertMessage::compose(renderer, alerts, analysis);
        tracing::info!(
            channel = self.channel_name(),
            title = %message.title,
            with_analysis = message.analysis.is_some(),
            "sending alert notification"
        );

        let start = Instant::now();
        let result = self.deliver(&message).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                tracing::info!(channel = self.channel_name(), duration_ms, "notification delivered");
                true
            }
            Err(e) => {
                tracing::error!(
                    channel = self.channel_name(),
                    error = %e,
                    duration_ms,
                    "notification delivery failed"
                );
                false
            }
        }
    }
}
