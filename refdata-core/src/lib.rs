//! # Refdata Core
//!
//! Core types, errors, and traits for time-versioned reference-data resolution.
//!
//! This crate provides the foundational building blocks used by all other refdata crates:
//!
//! - **Types**: Source keys, requests, resolved values, cache entries, feed status, table rows
//! - **Provenance**: Static source → attribution directory
//! - **Format**: Display strings for money, rates, and percentages
//! - **Errors**: One error hierarchy with classification helpers
//! - **Traits**: Store interfaces injected into providers and the cache layer
//!
//! ## Example
//!
//! ```rust
//! use refdata_core::{provenance_for, SourceKey};
//!
//! let provenance = provenance_for(SourceKey::MileageRate);
//! assert!(provenance.source_url.starts_with("https://"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod constants;
pub mod error;
pub mod format;
pub mod normalize;
pub mod provenance;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RefDataError, Result};
pub use provenance::{provenance_for, Provenance};
pub use traits::*;
pub use types::*;
