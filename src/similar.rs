//! Similar-day lookup
//!
//! Compares a target day's summary against every historical day's summary
//! and ranks candidates by how many risk flags they share.

use crate::error::InsightError;
use crate::store::DayStore;
use crate::summary::summarize;
use crate::types::ScoredDay;

/// Default number of similar days returned.
pub const DEFAULT_TOP_N: usize = 5;

/// Find past days that share risk flags with the target date.
///
/// Returns at most `top_n` days, most similar first. Days with no flag
/// overlap are excluded, as is the target's own date. An unknown target
/// date yields an empty result, not an error.
pub fn find_similar<S: DayStore + ?Sized>(
    store: &S,
    target_date: &str,
    top_n: usize,
) -> Result<Vec<ScoredDay>, InsightError> {
    let Some(target) = store.day(target_date)? else {
        return Ok(Vec::new());
    };
    let target_summary = summarize(&target);

    let mut similar: Vec<ScoredDay> = Vec::new();
    for day in store.all_days()? {
        if day.date == target_date {
            continue;
        }
        let score = target_summary.matching_flags(&summarize(&day));
        if score > 0 {
            similar.push(ScoredDay {
                day,
                similarity_score: score,
            });
        }
    }

    // Stable sort over date-ascending history: equal scores keep the
    // earlier date first.
    similar.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
    similar.truncate(top_n);
    Ok(similar)
}
