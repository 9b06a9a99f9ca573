//! Domain types for reference-data resolution.
//!
//! - [`SourceKey`]: Closed vocabulary of reference-data domains
//! - [`DataRefRequest`]: Loose inbound request, validated into a [`DataQuery`]
//! - [`ResolvedData`] / [`ProviderResult`]: Uniform result contract
//! - [`CacheEntry`]: Persisted cache value with expiry
//! - [`FeedStatus`]: Per-source refresh bookkeeping
//! - Row records for the versioned backing tables

mod feed;
mod query;
mod records;
mod request;
mod resolved;
mod source;

pub use feed::*;
pub use query::*;
pub use records::*;
pub use request::*;
pub use resolved::*;
pub use source::*;
