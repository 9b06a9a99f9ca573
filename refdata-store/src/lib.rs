//! # Refdata Store
//!
//! Row store backends for the versioned reference tables and the
//! persistent cache.
//!
//! This crate provides two backends, both implementing
//! [`RateStore`](refdata_core::RateStore) and [`CacheStore`](refdata_core::CacheStore):
//!
//! - **Memory**: Concurrent in-memory tables with a call counter and
//!   fault injection, for development and testing
//! - **File**: Memory tables persisted to a snapshot file, for
//!   single-node deployments
//!
//! ## Example
//!
//! ```rust,ignore
//! use refdata_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.import(snapshot)?;
//!
//! let row = store.latest_housing_rate("E05", "AB123", true, as_of).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{MemoryStore, StoreOperation, StoreStats};
