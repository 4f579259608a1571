//! Decides whether a batch gets analysis and hands it to the channel.
//!
//! One attempt per batch. Analysis failures degrade to "no analysis";
//! channel failures degrade to [`DispatchStatus::Failed`]. Nothing here
//! returns an error to the caller.

use std::sync::Arc;
use std::time::Instant;

use alertbridge_core::{AlertBatch, Analyzer};
use serde::Serialize;

use crate::templating::ContentRenderer;
use crate::traits::NotificationChannel;

/// Outcome reported back to the alert sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Success,
    Failed,
    Ignored,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Success => "success",
            DispatchStatus::Failed => "failed",
            DispatchStatus::Ignored => "ignored",
        }
    }
}

impl std::fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct AlertDispatcher {
    renderer: ContentRenderer,
    channel: Box<dyn NotificationChannel>,
    analyzer: Arc<dyn Analyzer>,
}

impl AlertDispatcher {
    pub fn new(
        renderer: ContentRenderer,
        channel: Box<dyn NotificationChannel>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            renderer,
            channel,
            analyzer,
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.channel_name()
    }

    pub async fn handle(&self, batch: &AlertBatch) -> DispatchStatus {
        if batch.is_empty() {
            tracing::info!("received batch without alerts, ignoring");
            return DispatchStatus::Ignored;
        }

        let all_resolved = batch.all_resolved();
        tracing::info!(
            alerts = batch.alerts().len(),
            all_resolved,
            channel = self.channel_name(),
            "handling alert batch"
        );

        let analysis = if all_resolved {
            None
        } else {
            self.analyze(batch).await
        };

        if self
            .channel
            .send(&self.renderer, batch.alerts(), analysis.as_deref())
            .await
        {
            DispatchStatus::Success
        } else {
            DispatchStatus::Failed
        }
    }

    async fn analyze(&self, batch: &AlertBatch) -> Option<String> {
        let start = Instant::now();
        let analysis = self
            .analyzer
            .analyze(batch.raw())
            .await
            .filter(|text| !text.trim().is_empty());
        let duration_ms = start.elapsed().as_millis() as u64;

        match &analysis {
            Some(text) => tracing::info!(
                analyzer = self.analyzer.name(),
                chars = text.chars().count(),
                duration_ms,
                "analysis attached"
            ),
            None => tracing::warn!(
                analyzer = self.analyzer.name(),
                duration_ms,
                "no analysis available, sending without it"
            ),
        }
        analysis
    }
}
