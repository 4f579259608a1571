//! Localized defaults, sentinels and message chrome.

use alertbridge_core::Locale;

/// Every user-visible literal the pipeline emits, for one locale.
#[derive(Debug)]
pub struct Phrases {
    pub default_alertname: &'static str,
    pub default_severity: &'static str,
    pub default_level: &'static str,
    pub default_instance: &'static str,
    pub default_monitor: &'static str,
    pub default_fingerprint: &'static str,
    pub no_description: &'static str,
    /// `ends_at` value for alerts that have not recovered.
    pub ongoing: &'static str,
    pub time_parse_error: &'static str,
    pub firing_title: &'static str,
    pub resolved_title: &'static str,
    pub analysis_heading: &'static str,
    pub placeholder_error: &'static str,
    pub format_error: &'static str,
}

static ZH: Phrases = Phrases {
    default_alertname: "告警",
    default_severity: "级别",
    default_level: "等级",
    default_instance: "事例",
    default_monitor: "环境",
    default_fingerprint: "指纹",
    no_description: "无描述信息",
    ongoing: "告警持续中，尚未恢复",
    time_parse_error: "时间解析错误",
    firing_title: "🚨 告警通知",
    resolved_title: "✅ 告警恢复",
    analysis_heading: "**🛠️ AI处理建议如下================**",
    placeholder_error: "模板占位符错误",
    format_error: "模板格式错误",
};

static EN: Phrases = Phrases {
    default_alertname: "alert",
    default_severity: "severity",
    default_level: "level",
    default_instance: "instance",
    default_monitor: "monitor",
    default_fingerprint: "fingerprint",
    no_description: "no description",
    ongoing: "alert ongoing, not yet resolved",
    time_parse_error: "time parse error",
    firing_title: "🚨 Alert Firing",
    resolved_title: "✅ Alert Resolved",
    analysis_heading: "**🛠️ AI suggestions ================**",
    placeholder_error: "template placeholder error",
    format_error: "template format error",
};

pub fn phrases(locale: Locale) -> &'static Phrases {
    match locale {
        Locale::Zh => &ZH,
        Locale::En => &EN,
    }
}
