//! Alert message templates and placeholder substitution.
//!
//! A template file holds two ordered fragment lists, one for firing alerts
//! and one for resolved alerts:
//!
//! ```json
//! {
//!   "firing_template": ["**{alertname}** on {instance}\n", "since {starts_at}\n"],
//!   "resolved_template": ["**{alertname}** recovered at {ends_at}\n"]
//! }
//! ```
//!
//! Fragments use `{field}` placeholders over the names produced by
//! [`crate::fields::extract_fields`], `{labels[key]}` to reach into a map
//! field, and `{{` / `}}` for literal braces.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use alertbridge_core::{Alert, Locale};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::fields::{extract_fields, FieldMap, FieldValue};
use crate::phrases::phrases;
use crate::traits::NotifyError;

/// The two fragment lists, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSet {
    #[serde(rename = "firing_template")]
    pub firing: Vec<String>,
    #[serde(rename = "resolved_template")]
    pub resolved: Vec<String>,
}

impl TemplateSet {
    /// Fragments for an alert, chosen by its status.
    pub fn for_alert(&self, alert: &Alert) -> &[String] {
        if alert.is_resolved() {
            &self.resolved
        } else {
            &self.firing
        }
    }
}

/// Reads the template file from a fixed path.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the template file.
    ///
    /// Fragment syntax is not checked here; bad placeholders surface per
    /// alert at render time.
    ///
    /// # Errors
    ///
    /// [`NotifyError::TemplateLoad`] if the file cannot be read,
    /// [`NotifyError::TemplateParse`] if it is not a valid template set.
    pub fn load(&self) -> Result<TemplateSet, NotifyError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| NotifyError::TemplateLoad {
            path: self.path.clone(),
            source,
        })?;
        let templates: TemplateSet =
            serde_json::from_str(&raw).map_err(|source| NotifyError::TemplateParse {
                path: self.path.clone(),
                source,
            })?;
        info!(
            path = %self.path.display(),
            firing = templates.firing.len(),
            resolved = templates.resolved.len(),
            "alert templates loaded"
        );
        Ok(templates)
    }
}

/// Why a fragment could not be filled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FillError {
    /// A field (or map key) the template references does not exist.
    #[error("'{0}'")]
    MissingKey(String),

    #[error("{0}")]
    Format(String),
}

/// Substitute every placeholder in one fragment.
///
/// Either the whole fragment is filled or an error is returned; partial
/// output is never produced.
pub fn fill(fragment: &str, fields: &FieldMap) -> Result<String, FillError> {
    let mut out = String::with_capacity(fragment.len());
    let mut chars = fragment.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut expr = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(FillError::Format(
                                "unexpected '{' in field name".to_string(),
                            ))
                        }
                        _ => expr.push(c),
                    }
                }
                if !closed {
                    return Err(FillError::Format(
                        "single '{' encountered in format string".to_string(),
                    ));
                }
                out.push_str(&resolve(&expr, fields)?);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(FillError::Format(
                    "single '}' encountered in format string".to_string(),
                ))
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}

/// Look up `name` or `name[key]`.
fn resolve(expr: &str, fields: &FieldMap) -> Result<String, FillError> {
    if expr.is_empty() {
        return Err(FillError::Format(
            "positional placeholder '{}' is not supported".to_string(),
        ));
    }
    if expr.contains(':') || expr.contains('!') {
        return Err(FillError::Format(format!(
            "format spec in '{{{expr}}}' is not supported"
        )));
    }

    let (name, index) = match expr.find('[') {
        Some(open) => {
            let key = expr[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| FillError::Format(format!("unclosed index in '{{{expr}}}'")))?;
            (&expr[..open], Some(key))
        }
        None => (expr, None),
    };

    let value = fields
        .get(name)
        .ok_or_else(|| FillError::MissingKey(name.to_string()))?;

    match (value, index) {
        (value, None) => Ok(value.to_string()),
        (FieldValue::Map(map), Some(key)) => map
            .get(key)
            .cloned()
            .ok_or_else(|| FillError::MissingKey(key.to_string())),
        (FieldValue::Text(_), Some(_)) => Err(FillError::Format(format!(
            "field '{name}' is not a map and cannot be indexed"
        ))),
    }
}

/// Turns alerts into the message body shared by every channel.
#[derive(Debug, Clone)]
pub struct ContentRenderer {
    templates: Arc<TemplateSet>,
    locale: Locale,
}

impl ContentRenderer {
    pub fn new(templates: Arc<TemplateSet>, locale: Locale) -> Self {
        Self { templates, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Render every alert in order and join the blocks with `\n`.
    ///
    /// Never fails: an alert whose template cannot be filled is replaced by a
    /// single diagnostic line and the remaining alerts render normally.
    pub fn render(&self, alerts: &[Alert]) -> String {
        info!(alerts = alerts.len(), "building alert content");
        alerts
            .iter()
            .enumerate()
            .map(|(idx, alert)| self.render_alert(idx + 1, alert))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_alert(&self, position: usize, alert: &Alert) -> String {
        let fields = extract_fields(alert, self.locale);
        let fragments = self.templates.for_alert(alert);

        let block = fragments
            .iter()
            .map(|fragment| fill(fragment, &fields))
            .collect::<Result<String, _>>();

        match block {
            Ok(block) => {
                debug!(position, resolved = alert.is_resolved(), %block, "alert block rendered");
                block
            }
            Err(e) => {
                let p = phrases(self.locale);
                let label = match e {
                    FillError::MissingKey(_) => p.placeholder_error,
                    FillError::Format(_) => p.format_error,
                };
                warn!(position, error = %e, "alert template could not be filled");
                format!("{label}: {e}")
            }
        }
    }
}
