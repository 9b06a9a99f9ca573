//! # Refdata Providers
//!
//! One provider per reference-data source. Every provider receives its row
//! store as an injected `Arc<dyn RateStore>` and shares one contract:
//!
//! - identifiers are normalized before querying
//! - the latest row effective on or before the as-of date wins
//! - no match is a data-less [`ProviderResult`](refdata_core::ProviderResult),
//!   never a panic or a propagated error
//!
//! | Provider | Lookup |
//! |----------|--------|
//! | [`HousingAllowanceProvider`] | paygrade, area, dependency, as-of |
//! | [`SubsistenceAllowanceProvider`] | officer/enlisted split from configuration |
//! | [`CostOfLivingProvider`] | domestic table, then overseas |
//! | [`TaxLimitsProvider`] | field + year in the reference table |
//! | [`HealthCostsProvider`] | field + year in the reference table |
//! | [`MileageRateProvider`] | per-mile rate for the year |

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cola;
mod health_costs;
mod housing;
mod mileage;
mod provider;
mod reference;
mod subsistence;
mod tax_limits;

pub use cola::CostOfLivingProvider;
pub use health_costs::HealthCostsProvider;
pub use housing::HousingAllowanceProvider;
pub use mileage::{MileageRateProvider, Reimbursement};
pub use provider::Provider;
pub use reference::ReferenceLookup;
pub use subsistence::{SubsistenceAllowanceProvider, SubsistenceRates};
pub use tax_limits::TaxLimitsProvider;
