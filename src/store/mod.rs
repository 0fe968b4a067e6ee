//! Journal storage
//!
//! The derivation routines only need read access to day records and write
//! access to the global patterns snapshot, expressed through the [`DayStore`]
//! trait. Any conformant backend works; this crate ships a file-backed store
//! ([`JsonStore`]) and an in-memory store ([`MemoryStore`]).

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::error::InsightError;
use crate::types::{DayRecord, GlobalPatterns};

/// Storage contract required by the derivation routines.
pub trait DayStore {
    /// Look up one day record by its date key.
    fn day(&self, date: &str) -> Result<Option<DayRecord>, InsightError>;

    /// All day records, ordered by date key ascending.
    fn all_days(&self) -> Result<Vec<DayRecord>, InsightError>;

    /// Persist the global patterns snapshot, overwriting any prior one.
    fn put_patterns(&self, snapshot: &GlobalPatterns) -> Result<(), InsightError>;
}
