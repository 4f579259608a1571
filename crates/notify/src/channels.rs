//! Channel selection.

use alertbridge_core::ChannelKind;

use crate::dingtalk::DingtalkChannel;
use crate::feishu::FeishuChannel;
use crate::traits::NotificationChannel;
use crate::webhook::WebhookPoster;

/// Build the channel for `kind`, posting to `webhook_url`.
pub fn create_channel(kind: ChannelKind, webhook_url: &str) -> Box<dyn NotificationChannel> {
    let webhook = WebhookPoster::new(webhook_url);
    match kind {
        ChannelKind::Feishu => Box::new(FeishuChannel::new(webhook)),
        ChannelKind::Dingtalk => Box::new(DingtalkChannel::new(webhook)),
    }
}
