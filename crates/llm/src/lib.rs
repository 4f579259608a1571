//! Alert analysis through an OpenAI-compatible chat-completion API.

pub mod analyzer;
pub mod provider;
pub mod providers;

pub use analyzer::LlmAnalyzer;
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
