//! Shared types for the alert relay: configuration, the alert data model,
//! and the analysis capability seam.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod error;

pub use alert::{Alert, AlertBatch};
pub use analysis::Analyzer;
pub use config::{ChannelKind, Config, Locale};
pub use error::{BatchError, ConfigError};
