//! Global pattern computation
//!
//! Aggregates numeric fields across the full history: per-field averages, a
//! caffeine/sleep Pearson correlation, and a ranked list of flags most often
//! co-raised on high-stress days. The resulting snapshot is persisted
//! wholesale, overwriting any prior one.

use chrono::{Local, NaiveDate};

use crate::error::InsightError;
use crate::store::DayStore;
use crate::summary::summarize;
use crate::types::{DayRecord, GlobalPatterns, FLAG_NAMES};

/// Maximum number of stress triggers reported in a snapshot.
pub const MAX_STRESS_TRIGGERS: usize = 3;

/// Compute global averages and correlations across all days and persist the
/// resulting snapshot through the store.
pub fn compute_patterns<S: DayStore + ?Sized>(store: &S) -> Result<GlobalPatterns, InsightError> {
    let history = store.all_days()?;
    let snapshot = derive_patterns(&history, Local::now().date_naive());
    store.put_patterns(&snapshot)?;
    log::info!(
        "computed global patterns over {} day records",
        history.len()
    );
    Ok(snapshot)
}

/// Derive a patterns snapshot from a date-ascending history. Pure; the
/// `computed_on` stamp is the calendar day the computation runs.
pub fn derive_patterns(history: &[DayRecord], computed_on: NaiveDate) -> GlobalPatterns {
    let sleep_avg = mean(history.iter().filter_map(|d| d.fitbit.sleep_hours));
    let hrv_avg = mean(history.iter().filter_map(|d| d.fitbit.hrv));
    let stress_avg = mean(history.iter().filter_map(|d| d.manual.stress));

    let pairs = caffeine_sleep_pairs(history);
    let caffeine_sleep_corr = pearson(&pairs).map(round3);

    GlobalPatterns {
        last_computed: computed_on,
        sleep_avg,
        hrv_avg,
        stress_avg,
        caffeine_sleep_corr,
        stress_triggers: stress_triggers(history),
    }
}

/// Arithmetic mean over present values; `None` when nothing is present.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Pearson correlation coefficient over a pair set.
///
/// `None` for fewer than 2 pairs or when either variable has zero variance,
/// rather than a divide-by-zero.
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let numerator: f64 = pairs
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let denom_x: f64 = pairs
        .iter()
        .map(|(x, _)| (x - mean_x).powi(2))
        .sum::<f64>()
        .sqrt();
    let denom_y: f64 = pairs
        .iter()
        .map(|(_, y)| (y - mean_y).powi(2))
        .sum::<f64>()
        .sqrt();

    if denom_x == 0.0 || denom_y == 0.0 {
        return None;
    }
    Some(numerator / (denom_x * denom_y))
}

/// Gather (caffeine hour, sleep hours) pairs over records where both are
/// present and the time parses. Malformed entries are skipped silently.
fn caffeine_sleep_pairs(history: &[DayRecord]) -> Vec<(f64, f64)> {
    history
        .iter()
        .filter_map(|day| {
            let caffeine = day.manual.caffeine_time.as_deref()?;
            let sleep = day.fitbit.sleep_hours?;
            Some((parse_clock_fraction(caffeine)?, sleep))
        })
        .collect()
}

/// Parse "HH:MM" into a fractional hour (e.g. "16:45" -> 16.75).
fn parse_clock_fraction(time: &str) -> Option<f64> {
    let (hour, minute) = time.split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    Some(hour as f64 + minute as f64 / 60.0)
}

/// Rank the flags most often co-raised on high-stress days.
///
/// `stress_high` itself is excluded from the tally. Ties break by flag
/// declaration order so the output is deterministic.
fn stress_triggers(history: &[DayRecord]) -> Vec<String> {
    let tough_days: Vec<_> = history
        .iter()
        .map(summarize)
        .filter(|s| s.stress_high)
        .collect();
    if tough_days.is_empty() {
        return Vec::new();
    }

    let mut counts: Vec<(&str, u32)> = FLAG_NAMES
        .iter()
        .copied()
        .filter(|name| *name != "stress_high")
        .map(|name| {
            let count = tough_days
                .iter()
                .flat_map(|s| s.flags())
                .filter(|(flag, raised)| *flag == name && *raised)
                .count() as u32;
            (name, count)
        })
        .collect();

    counts.retain(|(_, count)| *count > 0);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(MAX_STRESS_TRIGGERS);
    counts.into_iter().map(|(name, _)| name.to_string()).collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{FitbitMetrics, ManualMetrics};
    use pretty_assertions::assert_eq;

    fn computed_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 14).unwrap()
    }

    fn day(
        date: &str,
        sleep_hours: Option<f64>,
        hrv: Option<f64>,
        stress: Option<f64>,
        caffeine_time: Option<&str>,
    ) -> DayRecord {
        DayRecord {
            date: date.to_string(),
            fitbit: FitbitMetrics {
                sleep_hours,
                hrv,
                ..Default::default()
            },
            manual: ManualMetrics {
                stress,
                caffeine_time: caffeine_time.map(String::from),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_averages_skip_absent_values() {
        let history = vec![
            day("2025-02-10", Some(6.0), None, None, None),
            day("2025-02-11", None, None, None, None),
            day("2025-02-12", Some(7.5), None, None, None),
        ];

        let snapshot = derive_patterns(&history, computed_on());
        assert_eq!(snapshot.sleep_avg, Some(6.75));
        assert_eq!(snapshot.hrv_avg, None);
        assert_eq!(snapshot.stress_avg, None);
    }

    #[test]
    fn test_empty_history_yields_all_absent() {
        let snapshot = derive_patterns(&[], computed_on());

        assert_eq!(snapshot.sleep_avg, None);
        assert_eq!(snapshot.hrv_avg, None);
        assert_eq!(snapshot.stress_avg, None);
        assert_eq!(snapshot.caffeine_sleep_corr, None);
        assert!(snapshot.stress_triggers.is_empty());
    }

    #[test]
    fn test_pearson_matches_closed_form() {
        // Pairs (8,6),(9,6),(10,5),(22,8): r = 21.75 / sqrt(128.75 * 4.75)
        let history = vec![
            day("2025-02-10", Some(6.0), None, None, Some("08:00")),
            day("2025-02-11", Some(6.0), None, None, Some("09:00")),
            day("2025-02-12", Some(5.0), None, None, Some("10:00")),
            day("2025-02-13", Some(8.0), None, None, Some("22:00")),
        ];

        let snapshot = derive_patterns(&history, computed_on());
        let expected = round3(21.75 / (128.75_f64 * 4.75).sqrt());
        assert_eq!(snapshot.caffeine_sleep_corr, Some(expected));
        assert_eq!(snapshot.caffeine_sleep_corr, Some(0.88));
    }

    #[test]
    fn test_pearson_zero_variance_is_absent() {
        // Identical caffeine hours: x variance is zero
        let history = vec![
            day("2025-02-10", Some(6.0), None, None, Some("08:00")),
            day("2025-02-11", Some(7.0), None, None, Some("08:00")),
        ];

        let snapshot = derive_patterns(&history, computed_on());
        assert_eq!(snapshot.caffeine_sleep_corr, None);
    }

    #[test]
    fn test_pearson_requires_two_pairs() {
        let history = vec![
            day("2025-02-10", Some(6.0), None, None, Some("08:00")),
            day("2025-02-11", None, None, None, Some("09:00")),
        ];

        let snapshot = derive_patterns(&history, computed_on());
        assert_eq!(snapshot.caffeine_sleep_corr, None);
    }

    #[test]
    fn test_caffeine_minutes_are_fractional() {
        assert_eq!(parse_clock_fraction("16:45"), Some(16.75));
        assert_eq!(parse_clock_fraction("7:30"), Some(7.5));
        assert_eq!(parse_clock_fraction("16"), None);
        assert_eq!(parse_clock_fraction("noonish"), None);
    }

    #[test]
    fn test_malformed_caffeine_pairs_are_skipped() {
        let history = vec![
            day("2025-02-10", Some(6.0), None, None, Some("8:00")),
            day("2025-02-11", Some(7.0), None, None, Some("whenever")),
            day("2025-02-12", Some(5.0), None, None, Some("10:30")),
        ];

        assert_eq!(caffeine_sleep_pairs(&history).len(), 2);
    }

    #[test]
    fn test_stress_triggers_ranked_by_co_occurrence() {
        // Three tough days with hrv_low, one of them also with late caffeine
        let history = vec![
            day("2025-02-10", None, Some(30.0), Some(8.0), None),
            day("2025-02-11", None, Some(35.0), Some(9.0), None),
            day("2025-02-12", None, Some(32.0), Some(7.0), Some("17:00")),
            // Not a tough day; must not contribute
            day("2025-02-13", None, Some(30.0), Some(2.0), Some("18:00")),
        ];

        let snapshot = derive_patterns(&history, computed_on());
        assert_eq!(snapshot.stress_triggers, vec!["hrv_low", "late_caffeine"]);
    }

    #[test]
    fn test_stress_triggers_exclude_stress_high_itself() {
        let history = vec![day("2025-02-10", None, Some(30.0), Some(8.0), None)];

        let snapshot = derive_patterns(&history, computed_on());
        assert!(!snapshot.stress_triggers.contains(&"stress_high".to_string()));
        assert_eq!(snapshot.stress_triggers, vec!["hrv_low"]);
    }

    #[test]
    fn test_no_tough_days_yields_empty_triggers() {
        let history = vec![day("2025-02-10", Some(5.0), Some(30.0), Some(2.0), None)];

        let snapshot = derive_patterns(&history, computed_on());
        assert!(snapshot.stress_triggers.is_empty());
    }

    #[test]
    fn test_compute_patterns_persists_through_store() {
        let store = MemoryStore::new();
        store.insert_day(day("2025-02-10", Some(6.0), None, None, None));

        let snapshot = compute_patterns(&store).unwrap();
        assert_eq!(store.patterns(), Some(snapshot));
    }

    #[test]
    fn test_recomputation_is_idempotent_up_to_stamp() {
        let history = vec![
            day("2025-02-10", Some(6.0), Some(55.0), Some(8.0), Some("16:45")),
            day("2025-02-11", Some(7.5), Some(30.0), Some(3.0), Some("09:15")),
        ];

        let first = derive_patterns(&history, computed_on());
        let second = derive_patterns(&history, computed_on());
        assert_eq!(first, second);
    }
}
