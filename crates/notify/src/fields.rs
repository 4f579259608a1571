//! Flattens one alert into the named fields templates can reference.

use std::collections::BTreeMap;
use std::fmt;

use alertbridge_core::{Alert, Locale};
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone};

use crate::phrases::phrases;

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A substitutable value: plain text, or a whole label/annotation map.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Map(BTreeMap<String, String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Map(map) => {
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Field name → value for one alert.
pub type FieldMap = BTreeMap<&'static str, FieldValue>;

/// Build the field map for one alert. Missing or empty sources fall back to
/// the locale's defaults.
pub fn extract_fields(alert: &Alert, locale: Locale) -> FieldMap {
    let p = phrases(locale);
    let label = |key: &str, default: &'static str| alert.label(key).unwrap_or(default);
    let annotation = |key: &str| alert.annotation(key).unwrap_or(p.no_description);

    let status = if alert.status.is_empty() {
        "UNKNOWN".to_string()
    } else {
        alert.status.to_uppercase()
    };

    let ends_at = if alert.is_ongoing() {
        p.ongoing.to_string()
    } else {
        normalize_time(&alert.ends_at, locale)
    };

    let fingerprint = if alert.fingerprint.is_empty() {
        p.default_fingerprint
    } else {
        alert.fingerprint.as_str()
    };

    let mut fields = FieldMap::new();
    fields.insert("alertname", label("alertname", p.default_alertname).into());
    fields.insert("severity", label("severity", p.default_severity).into());
    fields.insert("level", label("level", p.default_level).into());
    fields.insert("instance", label("instance", p.default_instance).into());
    fields.insert("monitor", label("monitor", p.default_monitor).into());
    fields.insert("fingerprint", fingerprint.into());
    fields.insert("description", annotation("description").into());
    fields.insert("summary", annotation("summary").into());
    fields.insert("status", status.into());
    fields.insert("generator_url", alert.generator_url.as_str().into());
    fields.insert("starts_at", normalize_time(&alert.starts_at, locale).into());
    fields.insert("ends_at", ends_at.into());
    fields.insert("labels", FieldValue::Map(alert.labels.clone()));
    fields.insert("annotations", FieldValue::Map(alert.annotations.clone()));

    tracing::debug!(?fields, "extracted template fields");
    fields
}

/// Reformat an alert-manager timestamp as `YYYY-MM-DD HH:MM:SS` in the
/// host's local zone. Unparseable input yields the locale's parse-error text.
pub fn normalize_time(raw: &str, locale: Locale) -> String {
    normalize_time_in(raw, &Local, locale)
}

/// [`normalize_time`] against an explicit target zone.
///
/// One trailing `Z` is stripped. Timestamps without an offset are taken as
/// wall-clock time in `tz`; timestamps with an offset are converted into `tz`.
pub fn normalize_time_in<Tz>(raw: &str, tz: &Tz, locale: Locale) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match parse_timestamp(raw, tz) {
        Some(time) => time.format(OUTPUT_FORMAT).to_string(),
        None => {
            tracing::warn!(raw, "failed to parse alert timestamp");
            phrases(locale).time_parse_error.to_string()
        }
    }
}

fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let trimmed = raw.trim();
    let cleaned = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    for format in OFFSET_FORMATS {
        if let Ok(time) = DateTime::<FixedOffset>::parse_from_str(cleaned, format) {
            return Some(time.with_timezone(tz));
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(cleaned, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| Some(skip_gap(&naive, tz)))
}

/// A wall-clock time skipped by a forward DST transition. Read it with the
/// offset in force a day earlier, which lands it just past the gap.
fn skip_gap<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    let before = tz.offset_from_utc_datetime(&(*naive - Duration::hours(24))).fix();
    tz.from_utc_datetime(&(*naive - before))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn text(fields: &FieldMap, key: &str) -> String {
        fields.get(key).unwrap().to_string()
    }

    fn high_cpu() -> Alert {
        Alert {
            status: "firing".into(),
            labels: BTreeMap::from([("alertname".to_string(), "HighCPU".to_string())]),
            starts_at: "2024-01-01T00:00:00".into(),
            ends_at: "0001-01-01T00:00:00Z".into(),
            fingerprint: "abc".into(),
            ..Default::default()
        }
    }

    #[test]
    fn ongoing_firing_alert_fields() {
        let fields = extract_fields(&high_cpu(), Locale::En);
        assert_eq!(text(&fields, "ends_at"), "alert ongoing, not yet resolved");
        assert_eq!(text(&fields, "alertname"), "HighCPU");
        assert_eq!(text(&fields, "summary"), "no description");
        assert_eq!(text(&fields, "description"), "no description");
        assert_eq!(text(&fields, "fingerprint"), "abc");
        assert_eq!(text(&fields, "status"), "FIRING");
        assert_eq!(text(&fields, "starts_at"), "2024-01-01 00:00:00");
    }

    #[test]
    fn chinese_defaults() {
        let fields = extract_fields(&Alert::default(), Locale::Zh);
        assert_eq!(text(&fields, "alertname"), "告警");
        assert_eq!(text(&fields, "severity"), "级别");
        assert_eq!(text(&fields, "level"), "等级");
        assert_eq!(text(&fields, "instance"), "事例");
        assert_eq!(text(&fields, "monitor"), "环境");
        assert_eq!(text(&fields, "fingerprint"), "指纹");
        assert_eq!(text(&fields, "summary"), "无描述信息");
        assert_eq!(text(&fields, "status"), "UNKNOWN");
        // Empty startsAt / endsAt cannot be parsed.
        assert_eq!(text(&fields, "starts_at"), "时间解析错误");
        assert_eq!(text(&fields, "ends_at"), "时间解析错误");
    }

    #[test]
    fn ongoing_sentinel_ignores_starts_at() {
        for starts_at in ["", "garbage", "2024-06-01T12:30:00Z"] {
            let alert = Alert {
                starts_at: starts_at.into(),
                ends_at: "0001-01-01T00:00:00Z".into(),
                ..Default::default()
            };
            let fields = extract_fields(&alert, Locale::Zh);
            assert_eq!(text(&fields, "ends_at"), "告警持续中，尚未恢复");
        }
    }

    #[test]
    fn resolved_alert_gets_end_time() {
        let alert = Alert {
            status: "resolved".into(),
            starts_at: "2024-03-05T10:00:00Z".into(),
            ends_at: "2024-03-05T10:15:30.123456789Z".into(),
            ..Default::default()
        };
        let fields = extract_fields(&alert, Locale::Zh);
        assert_eq!(text(&fields, "status"), "RESOLVED");
        assert_eq!(text(&fields, "ends_at"), "2024-03-05 10:15:30");
    }

    #[test]
    fn empty_labels_fall_back_to_defaults() {
        let alert = Alert {
            labels: BTreeMap::from([("severity".to_string(), String::new())]),
            annotations: BTreeMap::from([("summary".to_string(), String::new())]),
            ..Default::default()
        };
        let fields = extract_fields(&alert, Locale::En);
        assert_eq!(text(&fields, "severity"), "severity");
        assert_eq!(text(&fields, "summary"), "no description");
    }

    #[test]
    fn maps_are_exposed_whole() {
        let alert = Alert {
            labels: BTreeMap::from([
                ("job".to_string(), "node".to_string()),
                ("alertname".to_string(), "Disk".to_string()),
            ]),
            ..Default::default()
        };
        let fields = extract_fields(&alert, Locale::En);
        assert_eq!(
            fields.get("labels"),
            Some(&FieldValue::Map(alert.labels.clone()))
        );
        assert_eq!(text(&fields, "labels"), r#"{"alertname":"Disk","job":"node"}"#);
        assert_eq!(text(&fields, "annotations"), "{}");
    }

    #[test]
    fn naive_timestamps_keep_wall_clock() {
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            normalize_time_in("2024-01-01T00:00:00Z", &shanghai, Locale::En),
            "2024-01-01 00:00:00"
        );
        assert_eq!(
            normalize_time_in("2024-01-01T09:41:07.5", &Utc, Locale::En),
            "2024-01-01 09:41:07"
        );
        assert_eq!(
            normalize_time_in("2024-01-01 09:41", &Utc, Locale::En),
            "2024-01-01 09:41:00"
        );
        assert_eq!(
            normalize_time_in("2024-01-01", &Utc, Locale::En),
            "2024-01-01 00:00:00"
        );
    }

    #[test]
    fn offset_timestamps_convert_to_target_zone() {
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            normalize_time_in("2024-01-01T00:00:00+00:00", &shanghai, Locale::En),
            "2024-01-01 08:00:00"
        );
        assert_eq!(
            normalize_time_in("2024-01-01T08:00:00.000+08:00", &Utc, Locale::En),
            "2024-01-01 00:00:00"
        );
    }

    /// UTC+1 until 2024-03-31 02:00 local, UTC+2 after; 02:00..03:00 that
    /// day never happens.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn gap_start() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(2, 0, 0).unwrap()
        }

        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> chrono::LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> chrono::LocalResult<FixedOffset> {
            let start = Self::gap_start();
            if *local < start {
                chrono::LocalResult::Single(Self::winter())
            } else if *local < start + Duration::hours(1) {
                chrono::LocalResult::None
            } else {
                chrono::LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::gap_start() - Duration::hours(1) {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn wall_clock_in_dst_gap_moves_past_it() {
        assert_eq!(
            normalize_time_in("2024-03-31T02:30:00", &SpringForward, Locale::Zh),
            "2024-03-31 03:30:00"
        );
        assert_eq!(
            normalize_time_in("2024-03-31T01:59:00", &SpringForward, Locale::Zh),
            "2024-03-31 01:59:00"
        );
        assert_eq!(
            normalize_time_in("2024-03-31T03:00:00", &SpringForward, Locale::Zh),
            "2024-03-31 03:00:00"
        );
    }

    #[test]
    fn malformed_timestamps_yield_sentinel() {
        for raw in ["", "Z", "not a time", "2024-13-01T00:00:00", "2024-01-01T25:00:00Z", "01/02/2024"] {
            assert_eq!(normalize_time_in(raw, &Utc, Locale::Zh), "时间解析错误", "input {raw:?}");
            assert_eq!(normalize_time(raw, Locale::En), "time parse error", "input {raw:?}");
        }
    }
}
