//! JSON-over-HTTP transport shared by the chat channels.
//!
//! Posts a payload to the configured bot URL and hands back the parsed JSON
//! response body; each channel decides what that body means.

use alertbridge_core::config::mask_url;
use serde_json::Value;

use crate::traits::NotifyError;

/// Posts JSON payloads to one webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookPoster {
    /// Target URL. Bot URLs embed their access token, so it is only ever
    /// logged masked.
    url: String,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl WebhookPoster {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// POST `payload` and parse the response body as JSON.
    ///
    /// # Errors
    ///
    /// [`NotifyError::Http`] on network failure, [`NotifyError::Status`] on a
    /// non-2xx reply, [`NotifyError::Response`] when the body is not JSON.
    pub async fn post_json(&self, payload: &Value) -> Result<Value, NotifyError> {
        tracing::debug!(url = %mask_url(&self.url), %payload, "posting webhook payload");

        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                url = %mask_url(&self.url),
                %status,
                body = %body_text,
                "webhook returned non-2xx status"
            );
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        tracing::debug!(%status, body = %body_text, "webhook response received");

        serde_json::from_str(&body_text).map_err(|e| {
            NotifyError::Response(format!("body is not JSON ({e}): {body_text}"))
        })
    }
}
