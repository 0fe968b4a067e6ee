//! Healthlog - local-first health journal engine
//!
//! Healthlog maintains a per-day health record (sleep, HRV, stress, caffeine
//! timing, subjective notes) and derives three analytical views over it:
//!
//! - **Day Summarizer**: per-day boolean risk flags plus a normalized score
//! - **Similarity Ranker**: past days ranked by risk-flag overlap with a target day
//! - **Global Pattern Computer**: averages, a caffeine/sleep correlation, and
//!   the flags most associated with high-stress days, persisted as a snapshot
//!
//! Data flows one direction: raw day records → summarizer → {similarity,
//! patterns} → derived outputs. No derivation mutates a day record.

pub mod config;
pub mod error;
pub mod patterns;
pub mod similar;
pub mod store;
pub mod summary;
pub mod types;

pub use config::Config;
pub use error::InsightError;
pub use patterns::{compute_patterns, derive_patterns};
pub use similar::{find_similar, DEFAULT_TOP_N};
pub use store::{DayStore, JsonStore, MemoryStore};
pub use summary::summarize;
pub use types::{
    DayRecord, DaySummary, FitbitMetrics, GlobalPatterns, ManualMetrics, ScoredDay,
    SubjectiveEvent, FLAG_NAMES,
};

/// Crate version embedded in CLI output
pub const HEALTHLOG_VERSION: &str = env!("CARGO_PKG_VERSION");
