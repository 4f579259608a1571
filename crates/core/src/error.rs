use thiserror::Error;

/// Startup configuration problems. Any of these aborts the process.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// An inbound body that cannot be turned into an [`crate::AlertBatch`].
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("alert batch must be a JSON object")]
    NotAnObject,

    #[error("invalid alerts: {0}")]
    InvalidAlerts(#[from] serde_json::Error),
}
