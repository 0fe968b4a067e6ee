//! Core types for the healthlog engine
//!
//! This module defines the data structures that flow through the derivation
//! routines: the stored day record, the derived day summary, the similarity
//! result, and the persisted global patterns snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Deserialize a numeric field leniently: a non-numeric value is treated the
/// same as a missing one, never an error.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

/// Deserialize a string field leniently: a non-string value degrades to
/// missing.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(String::from)))
}

/// Device-sourced observations for one day.
///
/// Unknown fields written by other tools are preserved verbatim in `extra`
/// and ignored by summarization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FitbitMetrics {
    /// Total sleep duration (hours)
    #[serde(default, deserialize_with = "lenient_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    /// Heart rate variability (ms)
    #[serde(default, deserialize_with = "lenient_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv: Option<f64>,
    /// Opaque pass-through fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl FitbitMetrics {
    /// Merge another fragment into this one, field by field.
    /// Present fields in `other` overwrite; absent fields are left alone.
    pub fn merge_from(&mut self, other: FitbitMetrics) {
        if other.sleep_hours.is_some() {
            self.sleep_hours = other.sleep_hours;
        }
        if other.hrv.is_some() {
            self.hrv = other.hrv;
        }
        self.extra.extend(other.extra);
    }
}

/// User-entered observations for one day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualMetrics {
    /// Subjective stress level (0-10)
    #[serde(default, deserialize_with = "lenient_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress: Option<f64>,
    /// Subjective anxiety level (0-10)
    #[serde(default, deserialize_with = "lenient_f64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anxiety: Option<f64>,
    /// Time of last caffeine intake ("HH:MM", 24-hour clock)
    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caffeine_time: Option<String>,
    /// Free-form notes
    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Opaque pass-through fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ManualMetrics {
    /// Merge another fragment into this one, field by field.
    pub fn merge_from(&mut self, other: ManualMetrics) {
        if other.stress.is_some() {
            self.stress = other.stress;
        }
        if other.anxiety.is_some() {
            self.anxiety = other.anxiety;
        }
        if other.caffeine_time.is_some() {
            self.caffeine_time = other.caffeine_time;
        }
        if other.notes.is_some() {
            self.notes = other.notes;
        }
        self.extra.extend(other.extra);
    }
}

/// One calendar day of health data.
///
/// The `date` string (`YYYY-MM-DD`) is the record's identity and storage key.
/// Both sub-mappings are always present once a record exists; absent
/// individual fields mean "unknown", never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: String,
    #[serde(default)]
    pub fitbit: FitbitMetrics,
    #[serde(default)]
    pub manual: ManualMetrics,
}

impl DayRecord {
    /// Create an empty record for a date.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            fitbit: FitbitMetrics::default(),
            manual: ManualMetrics::default(),
        }
    }
}

/// Fixed flag names, in declaration order.
///
/// This order is load-bearing: it drives tie-breaking in the stress-trigger
/// ranking and the layout of serialized summaries.
pub const FLAG_NAMES: [&str; 5] = [
    "sleep_short",
    "hrv_low",
    "stress_high",
    "anxiety_high",
    "late_caffeine",
];

/// Number of entries in a serialized summary (5 flags + score).
/// The score denominator is pinned to this constant.
pub const SUMMARY_ENTRY_COUNT: usize = 6;

/// Derived risk-flag summary for one day.
///
/// Recomputed on demand from a [`DayRecord`]; never persisted. Every record,
/// however sparse, produces a complete summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub sleep_short: bool,
    pub hrv_low: bool,
    pub stress_high: bool,
    pub anxiety_high: bool,
    pub late_caffeine: bool,
    /// Normalized risk score: true-flag count / 6
    pub score: f64,
}

impl DaySummary {
    /// Flags paired with their names, in [`FLAG_NAMES`] order.
    pub fn flags(&self) -> [(&'static str, bool); 5] {
        [
            (FLAG_NAMES[0], self.sleep_short),
            (FLAG_NAMES[1], self.hrv_low),
            (FLAG_NAMES[2], self.stress_high),
            (FLAG_NAMES[3], self.anxiety_high),
            (FLAG_NAMES[4], self.late_caffeine),
        ]
    }

    /// Number of flags currently raised.
    pub fn true_flag_count(&self) -> usize {
        self.flags().iter().filter(|(_, v)| *v).count()
    }

    /// Count of flags raised in both summaries.
    pub fn matching_flags(&self, other: &DaySummary) -> u32 {
        self.flags()
            .iter()
            .zip(other.flags().iter())
            .filter(|((_, a), (_, b))| *a && *b)
            .count() as u32
    }
}

/// A day record annotated with its overlap against a target day.
///
/// Per-query derived view; the underlying stored record is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDay {
    #[serde(flatten)]
    pub day: DayRecord,
    /// Count of flags true in both the target's and this day's summaries
    pub similarity_score: u32,
}

/// Aggregate statistics over the full history.
///
/// Recomputed wholesale on each run and persisted, overwriting any prior
/// snapshot. Absent aggregates serialize as `null`, never as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalPatterns {
    /// Calendar date the snapshot was produced (not a data date)
    pub last_computed: NaiveDate,
    /// Mean sleep hours over records where present
    pub sleep_avg: Option<f64>,
    /// Mean HRV over records where present
    pub hrv_avg: Option<f64>,
    /// Mean stress over records where present
    pub stress_avg: Option<f64>,
    /// Pearson correlation between caffeine hour and sleep hours,
    /// rounded to 3 decimals
    pub caffeine_sleep_corr: Option<f64>,
    /// Up to 3 flag names most often co-raised on high-stress days,
    /// most frequent first
    pub stress_triggers: Vec<String>,
}

/// A free-form subjective event, stored as a flat appended list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectiveEvent {
    /// Unique event id (uuid v4)
    pub id: String,
    /// Date the event belongs to (`YYYY-MM-DD`)
    pub date: String,
    /// Arbitrary event payload
    #[serde(flatten)]
    pub details: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fitbit_merge_overwrites_present_fields_only() {
        let mut base = FitbitMetrics {
            sleep_hours: Some(7.0),
            hrv: Some(55.0),
            extra: HashMap::new(),
        };
        base.merge_from(FitbitMetrics {
            sleep_hours: Some(6.5),
            hrv: None,
            extra: HashMap::from([("steps".to_string(), serde_json::json!(9000))]),
        });

        assert_eq!(base.sleep_hours, Some(6.5));
        assert_eq!(base.hrv, Some(55.0));
        assert_eq!(base.extra["steps"], serde_json::json!(9000));
    }

    #[test]
    fn test_day_record_roundtrip_preserves_unknown_fields() {
        let json = r#"{
            "date": "2025-02-10",
            "fitbit": {"sleep_hours": 7.2, "resting_hr": 58},
            "manual": {"stress": 4, "mood": "calm"}
        }"#;

        let record: DayRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.fitbit.sleep_hours, Some(7.2));
        assert_eq!(record.fitbit.extra["resting_hr"], serde_json::json!(58));
        assert_eq!(record.manual.extra["mood"], serde_json::json!("calm"));

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["fitbit"]["resting_hr"], serde_json::json!(58));
        assert_eq!(out["manual"]["mood"], serde_json::json!("calm"));
    }

    #[test]
    fn test_malformed_field_values_degrade_to_absent() {
        let json = r#"{
            "date": "2025-02-10",
            "fitbit": {"sleep_hours": "plenty", "hrv": 52.0},
            "manual": {"stress": "high", "caffeine_time": 16}
        }"#;

        let record: DayRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.fitbit.sleep_hours, None);
        assert_eq!(record.fitbit.hrv, Some(52.0));
        assert_eq!(record.manual.stress, None);
        assert_eq!(record.manual.caffeine_time, None);
    }

    #[test]
    fn test_day_record_missing_submappings_default_to_empty() {
        let record: DayRecord = serde_json::from_str(r#"{"date": "2025-02-10"}"#).unwrap();
        assert!(record.fitbit.sleep_hours.is_none());
        assert!(record.manual.stress.is_none());
    }

    #[test]
    fn test_matching_flags_counts_shared_true_flags() {
        let a = DaySummary {
            sleep_short: true,
            hrv_low: true,
            stress_high: false,
            anxiety_high: false,
            late_caffeine: true,
            score: 0.5,
        };
        let b = DaySummary {
            sleep_short: true,
            hrv_low: false,
            stress_high: true,
            anxiety_high: false,
            late_caffeine: true,
            score: 0.5,
        };

        assert_eq!(a.matching_flags(&b), 2);
        assert_eq!(b.matching_flags(&a), 2);
    }

    #[test]
    fn test_scored_day_serializes_flat() {
        let scored = ScoredDay {
            day: DayRecord::new("2025-02-10"),
            similarity_score: 3,
        };

        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["date"], "2025-02-10");
        assert_eq!(value["similarity_score"], 3);
    }

    #[test]
    fn test_global_patterns_absent_aggregates_serialize_as_null() {
        let snapshot = GlobalPatterns {
            last_computed: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            sleep_avg: None,
            hrv_avg: None,
            stress_avg: None,
            caffeine_sleep_corr: None,
            stress_triggers: vec![],
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["last_computed"], "2025-02-10");
        assert!(value["sleep_avg"].is_null());
        assert!(value["caffeine_sleep_corr"].is_null());
        assert_eq!(value["stress_triggers"], serde_json::json!([]));
    }
}
