//! Alert rendering and delivery.
//!
//! This crate provides:
//! - Field extraction and time normalization for alert-manager records
//! - Template loading and `{placeholder}` substitution into per-alert blocks
//! - `NotificationChannel` trait with Feishu and Dingtalk implementations
//! - `AlertDispatcher`, which decides on analysis and hands off to the channel

pub mod channels;
pub mod dingtalk;
pub mod dispatcher;
pub mod feishu;
pub mod fields;
pub mod phrases;
pub mod templating;
pub mod traits;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support;

pub use channels::create_channel;
pub use dispatcher::{AlertDispatcher, DispatchStatus};
pub use templating::{ContentRenderer, TemplateSet, TemplateStore};
pub use traits::{AlertMessage, NotificationChannel, NotifyError};
