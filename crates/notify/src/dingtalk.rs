//! DingTalk custom-robot channel.
//!
//! Sends a `markdown` message whose text opens with a level-3 title line.
//! Success is `errcode == 0` in the response body.

use serde_json::{json, Value};

use crate::traits::{AlertMessage, NotificationChannel, NotifyError};
use crate::webhook::WebhookPoster;

pub struct DingtalkChannel {
    webhook: WebhookPoster,
}

impl DingtalkChannel {
    pub fn new(webhook: WebhookPoster) -> Self {
        Self { webhook }
    }

    pub fn build_payload(message: &AlertMessage) -> Value {
        let mut text = format!("### {}\n{}", message.title, message.content);
        if let Some(analysis) = &message.analysis {
            text.push_str("\n\n");
            text.push_str(analysis);
        }

        json!({
            "msgtype": "markdown",
            "markdown": {
                "title": message.title,
                "text": text,
            }
        })
    }

    pub fn check_response(body: &Value) -> Result<(), NotifyError> {
        match body.get("errcode").and_then(Value::as_i64) {
            Some(0) => Ok(()),
            code => {
                let msg = body
                    .get("errmsg")
                    .and_then(Value::as_str)
                    .unwrap_or("no message");
                let code = code.map_or_else(|| "missing".to_string(), |c| c.to_string());
                Err(NotifyError::Rejected {
                    channel: "dingtalk",
                    message: format!("errcode {code}: {msg}"),
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for DingtalkChannel {
    async fn deliver(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        let payload = Self::build_payload(message);
        let body = self.webhook.post_json(&payload).await?;
        Self::check_response(&body)
    }

    fn channel_name(&self) -> &str {
        "dingtalk"
    }
}
