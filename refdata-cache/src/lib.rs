//! Persistent TTL cache for resolved reference data.
//!
//! Cache-aside over an injected [`CacheStore`](refdata_core::CacheStore):
//! a valid entry is served, anything else calls the fetch closure and writes
//! its result back. Store failures degrade to misses. Upstream revisions are
//! handled by purging a source's key prefix so the next read recomputes.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod key;
mod refresh;

pub use cache::{Cached, CacheStats, RefDataCache};
pub use key::{generate_cache_key, source_prefix, CacheKeyParams};
pub use refresh::{
    RefreshReport, RefreshScheduler, SchedulerConfig, SchedulerHandle, SchedulerStatus,
};
