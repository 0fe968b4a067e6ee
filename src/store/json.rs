//! File-backed day store
//!
//! One JSON file per day under `<data_dir>/daily/<date>.json`, a single
//! `global_patterns.json` snapshot, and a flat `subjective_events.json`
//! list. The base directory is injected explicitly (see [`crate::config`])
//! rather than read from ambient global state.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::InsightError;
use crate::store::DayStore;
use crate::types::{DayRecord, FitbitMetrics, GlobalPatterns, ManualMetrics, SubjectiveEvent};

const DAILY_DIR: &str = "daily";
const PATTERNS_FILE: &str = "global_patterns.json";
const EVENTS_FILE: &str = "subjective_events.json";

/// A [`DayStore`] persisting records as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at `data_dir`. Directories are created lazily
    /// on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn daily_dir(&self) -> PathBuf {
        self.data_dir.join(DAILY_DIR)
    }

    fn day_path(&self, date: &str) -> PathBuf {
        self.daily_dir().join(format!("{date}.json"))
    }

    fn patterns_path(&self) -> PathBuf {
        self.data_dir.join(PATTERNS_FILE)
    }

    fn events_path(&self) -> PathBuf {
        self.data_dir.join(EVENTS_FILE)
    }

    /// Persist a full day record, keyed by its date.
    pub fn save_day(&self, record: &DayRecord) -> Result<PathBuf, InsightError> {
        validate_date_key(&record.date)?;
        fs::create_dir_all(self.daily_dir())?;
        let path = self.day_path(&record.date);
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        Ok(path)
    }

    /// Merge user-entered fields into the day's record, creating it if absent.
    /// Fields present in the fragment overwrite; the fitbit sub-mapping is
    /// preserved untouched.
    pub fn write_manual(
        &self,
        date: &str,
        fragment: ManualMetrics,
    ) -> Result<DayRecord, InsightError> {
        let mut record = self
            .day(date)?
            .unwrap_or_else(|| DayRecord::new(date.to_string()));
        record.manual.merge_from(fragment);
        self.save_day(&record)?;
        Ok(record)
    }

    /// Merge device-sourced fields into the day's record, creating it if
    /// absent. The manual sub-mapping is preserved untouched.
    pub fn write_fitbit(
        &self,
        date: &str,
        fragment: FitbitMetrics,
    ) -> Result<DayRecord, InsightError> {
        let mut record = self
            .day(date)?
            .unwrap_or_else(|| DayRecord::new(date.to_string()));
        record.fitbit.merge_from(fragment);
        self.save_day(&record)?;
        Ok(record)
    }

    /// Append a subjective event for a date, assigning it a fresh id.
    pub fn record_event(
        &self,
        date: &str,
        details: HashMap<String, serde_json::Value>,
    ) -> Result<SubjectiveEvent, InsightError> {
        validate_date_key(date)?;
        let event = SubjectiveEvent {
            id: Uuid::new_v4().to_string(),
            date: date.to_string(),
            details,
        };

        let mut events = self.events()?;
        events.push(event.clone());
        fs::create_dir_all(&self.data_dir)?;
        fs::write(self.events_path(), serde_json::to_string_pretty(&events)?)?;
        Ok(event)
    }

    /// All subjective events, in append order.
    pub fn events(&self) -> Result<Vec<SubjectiveEvent>, InsightError> {
        let path = self.events_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Subjective events for a specific date.
    pub fn events_for(&self, date: &str) -> Result<Vec<SubjectiveEvent>, InsightError> {
        Ok(self
            .events()?
            .into_iter()
            .filter(|e| e.date == date)
            .collect())
    }

    /// The last persisted patterns snapshot, if any.
    pub fn patterns(&self) -> Result<Option<GlobalPatterns>, InsightError> {
        let path = self.patterns_path();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&fs::read_to_string(path)?)?))
    }
}

impl DayStore for JsonStore {
    fn day(&self, date: &str) -> Result<Option<DayRecord>, InsightError> {
        let path = self.day_path(date);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&fs::read_to_string(path)?)?))
    }

    fn all_days(&self) -> Result<Vec<DayRecord>, InsightError> {
        let daily_dir = self.daily_dir();
        if !daily_dir.exists() {
            return Ok(Vec::new());
        }

        // Filenames are date keys, so lexicographic order is date order
        let mut paths: Vec<PathBuf> = fs::read_dir(daily_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut days = Vec::with_capacity(paths.len());
        for path in paths {
            days.push(serde_json::from_str(&fs::read_to_string(&path)?)?);
        }
        log::debug!("loaded {} day records", days.len());
        Ok(days)
    }

    fn put_patterns(&self, snapshot: &GlobalPatterns) -> Result<(), InsightError> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(
            self.patterns_path(),
            serde_json::to_string_pretty(snapshot)?,
        )?;
        Ok(())
    }
}

fn validate_date_key(date: &str) -> Result<(), InsightError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| InsightError::InvalidDateKey(date.to_string()))
}
