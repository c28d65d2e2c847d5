//! Local report cache
//!
//! This module persists previously fetched analysis reports to durable local
//! storage with a fixed 24-hour retention window. Storage is abstracted behind
//! a small key-value trait so the manager can be tested against an in-memory
//! fake. All storage failures degrade to empty-cache behavior; the remote
//! analysis service remains the source of truth.

mod manager;
mod store;

pub use manager::{age, AgeBucket, CachedReport, ReportCache, RETENTION_HOURS};
pub use store::{FileStore, KvStore, MemoryStore};
