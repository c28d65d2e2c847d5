//! Report cache manager
//!
//! Owns the collection of previously fetched analysis reports, persisted as a
//! single JSON blob in durable storage. Entries are retained for 24 hours and
//! purged on load. The cache is an optimization, never a source of truth: any
//! storage or decode problem degrades to an empty cache instead of surfacing
//! an error to the caller.

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::store::KvStore;

/// Storage key holding the JSON-encoded report collection
const STORAGE_KEY: &str = "reports";

/// Hours a cached report stays usable before it is purged
pub const RETENTION_HOURS: i64 = 24;

/// One retained analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedReport {
    /// Normalized (upper-case) ticker; acts as the lookup key
    pub ticker: String,
    /// Markdown report body, opaque to the cache
    pub report: String,
    /// Locator for the generated PDF artifact
    pub pdf_url: String,
    /// Locator for the open-interest chart image, when one was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oi_chart_url: Option<String>,
    /// When the entry was produced (persisted as epoch milliseconds)
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Human-facing age of a cached report
///
/// Display-only bucketing; deterministic given an explicit `now` so it can be
/// pinned in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    /// Less than a minute old
    JustNow,
    /// Whole minutes elapsed (1..59)
    Minutes(i64),
    /// Whole hours elapsed (1..23)
    Hours(i64),
    /// Whole days elapsed
    Days(i64),
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeBucket::JustNow => write!(f, "just now"),
            AgeBucket::Minutes(n) => write!(f, "{}m ago", n),
            AgeBucket::Hours(n) => write!(f, "{}h ago", n),
            AgeBucket::Days(n) => write!(f, "{}d ago", n),
        }
    }
}

/// Buckets the age of a cached report relative to `now`
///
/// Pure function with no side effects; used only for display.
pub fn age(entry: &CachedReport, now: DateTime<Utc>) -> AgeBucket {
    let elapsed = now - entry.created_at;
    if elapsed < Duration::minutes(1) {
        AgeBucket::JustNow
    } else if elapsed < Duration::hours(1) {
        AgeBucket::Minutes(elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        AgeBucket::Hours(elapsed.num_hours())
    } else {
        AgeBucket::Days(elapsed.num_days())
    }
}

/// Manages the persisted collection of analysis reports
///
/// The in-memory view is kept sorted most-recent-first and every mutation is
/// mirrored to the backing store before returning, so the rest of the program
/// never observes an unflushed write.
#[derive(Debug)]
pub struct ReportCache<S: KvStore> {
    /// Backing key-value store
    store: S,
    /// Retained reports, unique by ticker, newest first
    entries: Vec<CachedReport>,
}

impl<S: KvStore> ReportCache<S> {
    /// Loads the cache from storage, purging entries past the retention window
    ///
    /// An absent or malformed blob yields an empty cache rather than an error.
    /// The pruned result is persisted back immediately.
    pub fn load(store: S) -> Self {
        Self::load_at(store, Utc::now())
    }

    /// Loads the cache with an explicit clock
    ///
    /// Exists so tests can simulate time advancing without sleeping; `load`
    /// simply passes `Utc::now()`.
    pub fn load_at(store: S, now: DateTime<Utc>) -> Self {
        let mut entries = match store.get(STORAGE_KEY) {
            Some(bytes) => match serde_json::from_slice::<Vec<CachedReport>>(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!("Discarding unreadable report cache: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        entries.retain(|e| now - e.created_at < Duration::hours(RETENTION_HOURS));
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let cache = Self { store, entries };
        cache.persist();
        cache
    }

    /// Returns the cached reports, most recent first
    pub fn entries(&self) -> &[CachedReport] {
        &self.entries
    }

    /// Exact-match lookup by ticker
    ///
    /// The ticker is normalized to upper-case before matching. No partial or
    /// fuzzy matching.
    pub fn lookup(&self, ticker: &str) -> Option<&CachedReport> {
        let ticker = ticker.to_ascii_uppercase();
        self.entries.iter().find(|e| e.ticker == ticker)
    }

    /// Inserts a report, replacing any existing entry for the same ticker
    ///
    /// Guarantees at most one entry per ticker afterwards. The new collection
    /// is persisted before returning.
    pub fn upsert(&mut self, entry: CachedReport) {
        self.entries.retain(|e| e.ticker != entry.ticker);
        self.entries.insert(0, entry);
        self.persist();
    }

    /// Removes all entries matching `ticker` and persists the result
    pub fn remove(&mut self, ticker: &str) {
        let ticker = ticker.to_ascii_uppercase();
        self.entries.retain(|e| e.ticker != ticker);
        self.persist();
    }

    /// Mirrors the in-memory collection to durable storage
    ///
    /// Write failures are logged and swallowed: the cache is best-effort and
    /// the remote service remains the source of truth.
    fn persist(&self) {
        match serde_json::to_vec(&self.entries) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(STORAGE_KEY, &bytes) {
                    warn!("Failed to persist report cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode report cache: {}", e),
        }
    }
}
