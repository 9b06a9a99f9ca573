//! Per-source refresh bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ttl_duration, SourceKey};

/// Health of a source feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedHealth {
    /// Last refresh succeeded and is within TTL
    Ok,
    /// Last refresh succeeded but its TTL has lapsed
    Stale,
    /// Last refresh failed; the next scheduled run retries
    Error,
}

impl std::fmt::Display for FeedHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FeedHealth::Ok => "ok",
            FeedHealth::Stale => "stale",
            FeedHealth::Error => "error",
        })
    }
}

/// Refresh bookkeeping for one source. Only refresh jobs write it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedStatus {
    /// Source this row tracks
    pub source: SourceKey,
    /// Cache lifetime for this source, in seconds
    pub ttl_seconds: u64,
    /// Last refresh attempt that succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refreshed: Option<DateTime<Utc>>,
    /// Recorded health
    pub health: FeedHealth,
    /// Message from the last failed refresh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl FeedStatus {
    /// A never-refreshed feed with the source's default TTL.
    pub fn new(source: SourceKey) -> Self {
        Self {
            source,
            ttl_seconds: source.default_ttl_seconds(),
            last_refreshed: None,
            health: FeedHealth::Ok,
            last_error: None,
        }
    }

    /// Health as of `now`: `ok` lapses into `stale` once the TTL has passed.
    pub fn effective_health(&self, now: DateTime<Utc>) -> FeedHealth {
        match (self.health, self.last_refreshed) {
            (FeedHealth::Ok, Some(at)) => {
                if at + ttl_duration(self.ttl_seconds) < now {
                    FeedHealth::Stale
                } else {
                    FeedHealth::Ok
                }
            }
            (FeedHealth::Ok, None) => FeedHealth::Stale,
            (health, _) => health,
        }
    }

    /// Records a successful refresh.
    pub fn mark_refreshed(&mut self, at: DateTime<Utc>) {
        self.last_refreshed = Some(at);
        self.health = FeedHealth::Ok;
        self.last_error = None;
    }

    /// Records a failed refresh.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.health = FeedHealth::Error;
        self.last_error = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_ok_lapses_to_stale() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut feed = FeedStatus::new(SourceKey::HousingAllowance);
        feed.mark_refreshed(at);

        assert_eq!(feed.effective_health(at + Duration::hours(1)), FeedHealth::Ok);
        assert_eq!(feed.effective_health(at + Duration::days(2)), FeedHealth::Stale);
        // Stored health is untouched
        assert_eq!(feed.health, FeedHealth::Ok);
    }

    #[test]
    fn test_error_then_recover() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut feed = FeedStatus::new(SourceKey::MileageRate);
        feed.mark_failed("store unreachable");
        assert_eq!(feed.effective_health(at), FeedHealth::Error);
        assert_eq!(feed.last_error.as_deref(), Some("store unreachable"));

        feed.mark_refreshed(at);
        assert_eq!(feed.effective_health(at), FeedHealth::Ok);
        assert!(feed.last_error.is_none());
    }

    #[test]
    fn test_never_refreshed_is_stale() {
        let feed = FeedStatus::new(SourceKey::HealthPlanCosts);
        assert_eq!(feed.effective_health(Utc::now()), FeedHealth::Stale);
    }
}
