//! Reference-data constants.
//!
//! Default cache lifetimes, subsistence fallback rates, and the fixed
//! health-cost summary group.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE LIFETIMES
// ═══════════════════════════════════════════════════════════════════════════════

/// One day, in seconds.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Default TTL for housing allowance lookups.
/// Rates change once a year but late corrections are published.
pub const HOUSING_TTL_SECONDS: u64 = SECONDS_PER_DAY;

/// Default TTL for subsistence allowance lookups.
pub const SUBSISTENCE_TTL_SECONDS: u64 = 7 * SECONDS_PER_DAY;

/// Default TTL for cost-of-living adjustment lookups.
/// Overseas indexes move every pay period.
pub const COLA_TTL_SECONDS: u64 = SECONDS_PER_DAY;

/// Default TTL for tax and retirement contribution limits.
pub const TAX_LIMITS_TTL_SECONDS: u64 = 7 * SECONDS_PER_DAY;

/// Default TTL for health plan cost lookups.
pub const HEALTH_COSTS_TTL_SECONDS: u64 = 7 * SECONDS_PER_DAY;

/// Default TTL for mileage rate lookups.
pub const MILEAGE_TTL_SECONDS: u64 = 7 * SECONDS_PER_DAY;

// ═══════════════════════════════════════════════════════════════════════════════
// SUBSISTENCE ALLOWANCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Monthly enlisted subsistence rate in cents ($465.77).
pub const DEFAULT_BAS_ENLISTED_CENTS: i64 = 46_577;

/// Monthly officer subsistence rate in cents ($320.78).
pub const DEFAULT_BAS_OFFICER_CENTS: i64 = 32_078;

/// Date the default subsistence rates took effect (YYYY-MM-DD).
pub const DEFAULT_BAS_LAST_UPDATED: &str = "2025-01-01";

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH PLAN COSTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fields fetched together by the health-cost summary helper.
pub const HEALTH_COST_SUMMARY_FIELDS: [&str; 4] = [
    "prime_enrollment_individual",
    "prime_enrollment_family",
    "select_deductible_individual",
    "catastrophic_cap_family",
];

// ═══════════════════════════════════════════════════════════════════════════════
// CURRENCY
// ═══════════════════════════════════════════════════════════════════════════════

/// Currency unit attached to money values.
pub const CURRENCY_USD: &str = "USD";
