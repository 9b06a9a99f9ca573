//! Static source → attribution directory.
//!
//! Every resolved value must be citable. This lookup is total over
//! [`SourceKey`] and performs no I/O.

use serde::Serialize;

use crate::types::{SourceKey, UpdateFrequency};

/// Recorded origin of a source's data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Publishing authority
    pub source_name: &'static str,
    /// Canonical publication page
    pub source_url: &'static str,
    /// How often the authority publishes
    pub update_frequency: UpdateFrequency,
}

/// Returns the attribution for a source.
pub fn provenance_for(source: SourceKey) -> Provenance {
    match source {
        SourceKey::HousingAllowance => Provenance {
            source_name: "Defense Travel Management Office",
            source_url: "https://www.travel.dod.mil/Allowances/Basic-Allowance-for-Housing/",
            update_frequency: UpdateFrequency::Annual,
        },
        SourceKey::SubsistenceAllowance => Provenance {
            source_name: "Defense Finance and Accounting Service",
            source_url: "https://www.dfas.mil/MilitaryMembers/payentitlements/Pay-Tables/BAS/",
            update_frequency: UpdateFrequency::Annual,
        },
        SourceKey::CostOfLivingAdjustment => Provenance {
            source_name: "Defense Travel Management Office",
            source_url: "https://www.travel.dod.mil/Allowances/Cost-of-Living-Allowance/",
            update_frequency: UpdateFrequency::Biweekly,
        },
        SourceKey::TaxRetirementLimits => Provenance {
            source_name: "Internal Revenue Service",
            source_url: "https://www.irs.gov/retirement-plans/cola-increases-for-dollar-limitations-on-benefits-and-contributions",
            update_frequency: UpdateFrequency::Annual,
        },
        SourceKey::HealthPlanCosts => Provenance {
            source_name: "TRICARE",
            source_url: "https://www.tricare.mil/Costs",
            update_frequency: UpdateFrequency::Annual,
        },
        SourceKey::MileageRate => Provenance {
            source_name: "Internal Revenue Service",
            source_url: "https://www.irs.gov/tax-professionals/standard-mileage-rates",
            update_frequency: UpdateFrequency::AsAnnounced,
        },
    }
}
