use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::BatchError;

/// `endsAt` value alert-manager uses for alerts that are still firing.
pub const ONGOING_ENDS_AT: &str = "0001-01-01T00:00:00Z";

/// Status string marking a recovered alert.
pub const STATUS_RESOLVED: &str = "resolved";

/// One alert record as posted by alert-manager.
///
/// Every field is optional on the wire. Maps are ordered so that templates
/// dumping them whole render deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Alert {
    #[serde(deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub starts_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ends_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fingerprint: String,
    #[serde(rename = "generatorURL", deserialize_with = "null_as_default")]
    pub generator_url: String,
}

/// Senders emit `null` for fields they have nothing to say about; treat it
/// like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Alert {
    pub fn is_resolved(&self) -> bool {
        self.status == STATUS_RESOLVED
    }

    /// Non-empty label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        non_empty(self.labels.get(key))
    }

    /// Non-empty annotation value.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        non_empty(self.annotations.get(key))
    }

    pub fn is_ongoing(&self) -> bool {
        self.ends_at == ONGOING_ENDS_AT
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// An inbound notification: the parsed alerts plus the raw body.
///
/// The raw JSON (including receiver, group labels and any other metadata) is
/// kept verbatim because the analysis capability receives the whole batch.
#[derive(Debug, Clone)]
pub struct AlertBatch {
    alerts: Vec<Alert>,
    raw: Value,
}

impl AlertBatch {
    /// Parse a batch from a JSON body.
    ///
    /// A missing or `null` `alerts` key yields an empty batch; alerts of the
    /// wrong shape are an error.
    pub fn from_value(raw: Value) -> Result<Self, BatchError> {
        let object = raw.as_object().ok_or(BatchError::NotAnObject)?;
        let alerts = match object.get("alerts") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => Vec::<Alert>::deserialize(value)?,
        };
        Ok(Self { alerts, raw })
    }

    /// Build a batch from alerts alone, synthesizing `{"alerts": [...]}` as
    /// the raw body.
    pub fn new(alerts: Vec<Alert>) -> Self {
        let raw = serde_json::json!({ "alerts": alerts });
        Self { alerts, raw }
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// True when every alert is resolved. Vacuously true for an empty batch.
    pub fn all_resolved(&self) -> bool {
        self.alerts.iter().all(Alert::is_resolved)
    }
}
