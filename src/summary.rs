//! Day summarization
//!
//! This module turns one raw day record into a fixed set of boolean risk
//! flags plus a normalized score. Pure, total, deterministic: any missing or
//! malformed field degrades to a `false` flag, never an error.

use crate::types::{DayRecord, DaySummary, SUMMARY_ENTRY_COUNT};

/// Sleep shorter than this raises `sleep_short` (hours)
pub const SLEEP_SHORT_THRESHOLD: f64 = 6.0;
/// HRV below this raises `hrv_low` (ms)
pub const HRV_LOW_THRESHOLD: f64 = 40.0;
/// Stress above this raises `stress_high` (0-10 scale)
pub const STRESS_HIGH_THRESHOLD: f64 = 6.0;
/// Anxiety above this raises `anxiety_high` (0-10 scale)
pub const ANXIETY_HIGH_THRESHOLD: f64 = 6.0;
/// Caffeine at or after this hour raises `late_caffeine` (24-hour clock)
pub const LATE_CAFFEINE_HOUR: u32 = 15;

/// Produce a structured summary of key risk indicators from a day's data.
pub fn summarize(day: &DayRecord) -> DaySummary {
    let sleep_short = day
        .fitbit
        .sleep_hours
        .is_some_and(|h| h < SLEEP_SHORT_THRESHOLD);
    let hrv_low = day.fitbit.hrv.is_some_and(|v| v < HRV_LOW_THRESHOLD);
    let stress_high = day
        .manual
        .stress
        .is_some_and(|s| s > STRESS_HIGH_THRESHOLD);
    let anxiety_high = day
        .manual
        .anxiety
        .is_some_and(|a| a > ANXIETY_HIGH_THRESHOLD);
    let late_caffeine = day
        .manual
        .caffeine_time
        .as_deref()
        .and_then(parse_hour)
        .is_some_and(|hour| hour >= LATE_CAFFEINE_HOUR);

    let mut summary = DaySummary {
        sleep_short,
        hrv_low,
        stress_high,
        anxiety_high,
        late_caffeine,
        score: 0.0,
    };
    // Denominator is the fixed entry count (5 flags + score), not the map
    // size at some intermediate moment.
    summary.score = summary.true_flag_count() as f64 / SUMMARY_ENTRY_COUNT.max(1) as f64;
    summary
}

/// Parse the hour component of an "HH:MM" time string (the text before the
/// colon). Returns `None` for anything unparsable.
fn parse_hour(time: &str) -> Option<u32> {
    time.split(':').next()?.trim().parse().ok()
}
