//! Local caching of raw API payloads.
//!
//! Payloads are persisted verbatim as JSON, one file per key, and trusted
//! until manually deleted - there is no staleness check. The store is an
//! explicit key-value interface so tests substitute an in-memory double.

pub mod store;

pub use store::{get_or_fetch, CacheStore, FileStore};

#[cfg(test)]
pub use store::MemoryStore;
