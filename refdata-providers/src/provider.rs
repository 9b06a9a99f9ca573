//! Shared provider contract.

use async_trait::async_trait;
use tracing::warn;

use refdata_core::error::Result;
use refdata_core::types::{ProviderResult, ResolvedData, SourceKey};

/// A reference-data source.
///
/// Implementors write [`lookup`](Provider::lookup), which reports no-match
/// as [`RefDataError::NotFound`](refdata_core::RefDataError::NotFound).
/// Callers that want the discriminated result use [`fetch`](Provider::fetch);
/// the cache layer uses `lookup` so only hits are ever cached.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Typed parameters for one lookup.
    type Params: Send + Sync;

    /// The source this provider serves.
    fn source(&self) -> SourceKey;

    /// Looks up one value.
    async fn lookup(&self, params: &Self::Params) -> Result<ResolvedData>;

    /// Looks up one value, folding every error into the result.
    async fn fetch(&self, params: &Self::Params) -> ProviderResult {
        match self.lookup(params).await {
            Ok(data) => ProviderResult::found(data),
            Err(e) => {
                if e.is_not_found() {
                    warn!(source = %self.source(), reason = %e, "No matching record");
                } else {
                    warn!(source = %self.source(), error = %e, "Provider lookup failed");
                }
                ProviderResult::from_error(&e)
            }
        }
    }
}
