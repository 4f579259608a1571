use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Load an explicitly named env file. Unlike [`load_dotenv`], a missing or
/// unreadable file is an error.
pub fn load_dotenv_from(path: &Path) -> Result<(), dotenvy::Error> {
    dotenvy::from_path(path)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

pub const DEFAULT_TEMPLATES_PATH: &str = "/app/templates/alert-templates.json";
pub const DEFAULT_ANALYSIS_PROMPT: &str = "分析Prometheus告警（精简）:{{ payload }}";

/// Profiled lookup over an arbitrary key source: tries `{PROFILE}_{KEY}`
/// first, falls back to `{KEY}`. Empty values count as unset.
struct Source<'a, F> {
    profile: &'a str,
    lookup: F,
}

impl<F> Source<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn opt(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            let prefixed = format!("{}_{}", self.profile, key);
            if let Some(v) = (self.lookup)(&prefixed).filter(|v| !v.is_empty()) {
                return Some(v);
            }
        }
        (self.lookup)(key).filter(|v| !v.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &str, missing: &mut Vec<String>) -> String {
        self.opt(key).unwrap_or_else(|| {
            missing.push(key.to_string());
            String::new()
        })
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.opt(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

// ── Enumerated settings ───────────────────────────────────────

/// Which chat provider receives the rendered alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Feishu,
    Dingtalk,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Feishu => "feishu",
            ChannelKind::Dingtalk => "dingtalk",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feishu" => Ok(ChannelKind::Feishu),
            "dingtalk" => Ok(ChannelKind::Dingtalk),
            other => Err(format!("expected one of feishu, dingtalk; got '{other}'")),
        }
    }
}

/// Language of defaults, sentinels, titles and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Zh => "zh",
            Locale::En => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Locale::Zh),
            "en" | "en-us" => Ok(Locale::En),
            other => Err(format!("expected one of zh, en; got '{other}'")),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub notify: NotifyConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ALERTBRIDGE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = env_opt("ALERTBRIDGE_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, env_opt)
    }

    /// Build and validate config from any key source.
    ///
    /// Every missing required key is reported at once.
    pub fn from_lookup<F>(profile: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = profile.to_uppercase();
        let src = Source {
            profile: &profile,
            lookup,
        };

        let mut missing = Vec::new();
        let api_key = src.required("DEEPSEEK_API_KEY", &mut missing);
        let webhook_url = src.required("WEBHOOK_URL", &mut missing);
        let channel = src.required("NOTIFY_CHANNEL", &mut missing);
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let channel: ChannelKind = channel.parse().map_err(|reason| ConfigError::Invalid {
            key: "NOTIFY_CHANNEL".to_string(),
            value: channel.clone(),
            reason,
        })?;

        Ok(Self {
            server: ServerConfig {
                host: src.or("HOST", "0.0.0.0"),
                port: src.parse("PORT", 5000)?,
            },
            notify: NotifyConfig {
                channel,
                webhook_url,
                templates_path: PathBuf::from(src.or("ALERT_TEMPLATES_PATH", DEFAULT_TEMPLATES_PATH)),
                locale: src.parse("ALERT_LOCALE", Locale::Zh)?,
            },
            analysis: AnalysisConfig {
                api_key,
                base_url: src.or("DEEPSEEK_BASE_URL", "https://api.deepseek.com"),
                model: src.or("DEEPSEEK_MODEL", "deepseek-chat"),
                temperature: src.parse("ANALYSIS_TEMPERATURE", 1.0)?,
                max_tokens: src.parse("ANALYSIS_MAX_TOKENS", 4096)?,
                prompt: src.or("ANALYSIS_PROMPT", DEFAULT_ANALYSIS_PROMPT),
            },
            profile: profile.clone(),
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:    {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  notify:    channel={}, locale={}, webhook={}",
            self.notify.channel,
            self.notify.locale.as_str(),
            mask_url(&self.notify.webhook_url)
        );
        tracing::info!("  templates: {}", self.notify.templates_path.display());
        tracing::info!(
            "  analysis:  model={}, base_url={}, api_key={}",
            self.analysis.model,
            self.analysis.base_url,
            mask_secret(&self.analysis.api_key)
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── Notification ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub channel: ChannelKind,
    pub webhook_url: String,
    pub templates_path: PathBuf,
    pub locale: Locale,
}

// ── Analysis (OpenAI-compatible chat completion) ──────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// minijinja template; `payload` is the pretty-printed batch.
    pub prompt: String,
}

/// First 30 characters of a URL; webhook URLs embed their access token.
pub fn mask_url(url: &str) -> String {
    truncate_with(url, 30, "...")
}

/// First 4 characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    truncate_with(secret, 4, "****")
}

fn truncate_with(value: &str, keep: usize, suffix: &str) -> String {
    let head: String = value.chars().take(keep).collect();
    format!("{head}{suffix}")
}
