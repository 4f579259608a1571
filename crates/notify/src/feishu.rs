//! Feishu (Lark) custom-bot channel.
//!
//! Messages go out as interactive cards: a colored header carrying the
//! title, one `lark_md` block with the rendered alerts, and an optional
//! second block with the analysis. The bot answers HTTP 200 either way;
//! `StatusCode == 0` in the body is what signals acceptance.

use serde_json::{json, Value};

use crate::traits::{AlertMessage, NotificationChannel, NotifyError};
use crate::webhook::WebhookPoster;

pub struct FeishuChannel {
    webhook: WebhookPoster,
}

impl FeishuChannel {
    pub fn new(webhook: WebhookPoster) -> Self {
        Self { webhook }
    }

    pub fn build_payload(message: &AlertMessage) -> Value {
        let mut elements = vec![lark_md_div(&message.content)];
        if let Some(analysis) = &message.analysis {
            elements.push(lark_md_div(analysis));
        }

        let color = if message.resolved { "green" } else { "red" };

        json!({
            "msg_type": "interactive",
            "card": {
                "header": {
                    "title": {
                        "tag": "plain_text",
                        "content": message.title,
                    },
                    "template": color,
                },
                "elements": elements,
            }
        })
    }

    pub fn check_response(body: &Value) -> Result<(), NotifyError> {
        match body.get("StatusCode").and_then(Value::as_i64) {
            Some(0) => Ok(()),
            code => {
                let msg = body
                    .get("msg")
                    .or_else(|| body.get("StatusMessage"))
                    .and_then(Value::as_str)
                    .unwrap_or("no message");
                let code = code.map_or_else(|| "missing".to_string(), |c| c.to_string());
                Err(NotifyError::Rejected {
                    channel: "feishu",
                    message: format!("StatusCode {code}: {msg}"),
                })
            }
        }
    }
}

fn lark_md_div(content: &str) -> Value {
    json!({
        "tag": "div",
        "text": {
            "tag": "lark_md",
            "content": content,
        }
    })
}

#[async_trait::async_trait]
impl NotificationChannel for FeishuChannel {
    async fn deliver(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        let payload = Self::build_payload(message);
        let body = self.webhook.post_json(&payload).await?;
        Self::check_response(&body)
    }

    fn channel_name(&self) -> &str {
        "feishu"
    }
}
