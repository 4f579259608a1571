//! The analysis capability seam.

use async_trait::async_trait;

/// Produces free-text analysis for a raw alert batch.
///
/// Implementations swallow their own failures: `None` means "no analysis
/// available", never an error the caller has to handle.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, batch: &serde_json::Value) -> Option<String>;

    /// Human-readable name for logs (e.g., "deepseek").
    fn name(&self) -> &str;
}
