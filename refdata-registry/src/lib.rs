//! # Refdata Registry
//!
//! Entry point for resolving reference data.
//!
//! A loose [`DataRefRequest`](refdata_core::DataRefRequest) is validated into a
//! typed [`DataQuery`](refdata_core::DataQuery) before any I/O, dispatched to
//! its provider through the cache, and optionally re-rendered under a caller
//! format. Every outcome, including unknown sources and store failures, comes
//! back as a [`ProviderResult`](refdata_core::ProviderResult).
//!
//! ## Example
//!
//! ```rust,ignore
//! use refdata_registry::{DataRefRegistry, EngineConfig};
//!
//! let registry = DataRefRegistry::from_store(store, clock, EngineConfig::default());
//! let result = registry
//!     .resolve(&DataRefRequest::new("bah").paygrade("E05").code("AB123").with_dependents(true))
//!     .await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod registry;
mod validate;

pub use config::EngineConfig;
pub use registry::DataRefRegistry;
pub use validate::{validate, ValidatedRequest};
