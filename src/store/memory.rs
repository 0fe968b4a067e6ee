//! In-memory day store, used by tests and embedders that manage their own
//! persistence.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::InsightError;
use crate::store::DayStore;
use crate::types::{DayRecord, GlobalPatterns};

/// A [`DayStore`] backed by a date-ordered map.
///
/// Single-threaded by design, matching the engine's execution model.
#[derive(Debug, Default)]
pub struct MemoryStore {
    days: RefCell<BTreeMap<String, DayRecord>>,
    patterns: RefCell<Option<GlobalPatterns>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a day record, keyed by its date.
    pub fn insert_day(&self, record: DayRecord) {
        self.days.borrow_mut().insert(record.date.clone(), record);
    }

    /// The last snapshot written through [`DayStore::put_patterns`].
    pub fn patterns(&self) -> Option<GlobalPatterns> {
        self.patterns.borrow().clone()
    }
}

impl DayStore for MemoryStore {
    fn day(&self, date: &str) -> Result<Option<DayRecord>, InsightError> {
        Ok(self.days.borrow().get(date).cloned())
    }

    fn all_days(&self) -> Result<Vec<DayRecord>, InsightError> {
        // BTreeMap iteration is already date-ascending
        Ok(self.days.borrow().values().cloned().collect())
    }

    fn put_patterns(&self, snapshot: &GlobalPatterns) -> Result<(), InsightError> {
        *self.patterns.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_days_ordered_by_date_ascending() {
        let store = MemoryStore::new();
        store.insert_day(DayRecord::new("2025-02-12"));
        store.insert_day(DayRecord::new("2025-02-10"));
        store.insert_day(DayRecord::new("2025-02-11"));

        let dates: Vec<String> = store
            .all_days()
            .unwrap()
            .into_iter()
            .map(|d| d.date)
            .collect();
        assert_eq!(dates, vec!["2025-02-10", "2025-02-11", "2025-02-12"]);
    }

    #[test]
    fn test_day_lookup_by_key() {
        let store = MemoryStore::new();
        store.insert_day(DayRecord::new("2025-02-10"));

        assert!(store.day("2025-02-10").unwrap().is_some());
        assert!(store.day("2025-02-11").unwrap().is_none());
    }
}
