//! Source refresh and the scheduled refresh loop.
//!
//! A refresh never writes data. It purges the source's key prefix so the
//! next read recomputes from the backing tables, drops expired entries of
//! every source, then stamps the feed row.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info, instrument, warn};

use refdata_core::types::{FeedHealth, FeedStatus, SourceKey};

use crate::{source_prefix, RefDataCache};

/// Outcome of one source refresh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Source refreshed
    pub source: SourceKey,
    /// Cache entries purged under the source's prefix
    pub purged: u64,
    /// Expired entries of any source dropped alongside
    pub pruned: u64,
    /// Health recorded on the feed row
    pub health: FeedHealth,
    /// Failure message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the refresh ran
    pub refreshed_at: DateTime<Utc>,
}

impl RefreshReport {
    /// Returns true if the refresh succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl RefDataCache {
    /// Purges a source's cache entries and records the outcome on its feed row.
    ///
    /// Never fails: any error is recorded on the feed row and in the report,
    /// so an unattended job survives one source's failure. When the feed row
    /// itself cannot be read, nothing is purged or written and only the
    /// report carries the error, so the row's TTL and history survive.
    #[instrument(skip(self))]
    pub async fn refresh_source_data(&self, source: SourceKey) -> RefreshReport {
        let now = self.clock.now();

        let mut feed = match self.store.feed_status(source).await {
            Ok(Some(feed)) => feed,
            Ok(None) => FeedStatus::new(source),
            Err(e) => {
                let reason = e.to_string();
                error!(%source, error = %reason, "Source refresh failed, feed row unreadable");
                return RefreshReport {
                    source,
                    purged: 0,
                    pruned: 0,
                    health: FeedHealth::Error,
                    error: Some(reason),
                    refreshed_at: now,
                };
            }
        };

        let mut failure = None;
        let mut purged = 0;
        let mut pruned = 0;
        match self.invalidate_pattern(&source_prefix(source)).await {
            Ok(removed) => {
                purged = removed;
                match self.prune_expired().await {
                    Ok(dropped) => pruned = dropped,
                    Err(e) => warn!(error = %e, "Could not prune expired entries"),
                }
            }
            Err(e) => failure = Some(e.to_string()),
        }

        match &failure {
            None => {
                feed.mark_refreshed(now);
                info!(%source, purged, pruned, "Source refreshed");
            }
            Some(reason) => {
                feed.mark_failed(reason.clone());
                error!(%source, error = %reason, "Source refresh failed");
            }
        }

        if let Err(e) = self.store.save_feed_status(feed.clone()).await {
            warn!(%source, error = %e, "Could not record feed status");
            if failure.is_none() {
                failure = Some(e.to_string());
                feed.mark_failed(e.to_string());
            }
        }

        RefreshReport {
            source,
            purged,
            pruned,
            health: feed.health,
            error: failure,
            refreshed_at: now,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEDULER
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for [`RefreshScheduler`].
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Time between refresh cycles
    pub every: Duration,
    /// Sources refreshed each cycle, in order
    pub sources: Vec<SourceKey>,
    /// Whether the first cycle runs immediately
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            every: Duration::from_secs(86_400),
            sources: SourceKey::ALL.to_vec(),
            run_on_startup: true,
        }
    }
}

impl SchedulerConfig {
    /// All sources on the given period.
    pub fn with_interval(every: Duration) -> Self {
        Self {
            every,
            ..Default::default()
        }
    }
}

/// Counters kept by a running scheduler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchedulerStatus {
    /// Whether the loop is running
    pub running: bool,
    /// Completed cycles
    pub cycles: u64,
    /// Successful source refreshes
    pub refreshed: u64,
    /// Failed source refreshes
    pub failed: u64,
    /// Most recent report per cycle, in source order
    pub last_reports: Vec<RefreshReport>,
}

/// Controls a running [`RefreshScheduler`].
#[derive(Clone)]
pub struct SchedulerHandle {
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: Arc<RwLock<SchedulerStatus>>,
}

impl SchedulerHandle {
    /// Asks the loop to stop after the current cycle.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Returns true once stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    /// Current counters.
    pub fn status(&self) -> SchedulerStatus {
        self.status.read().clone()
    }
}

/// Calls [`RefDataCache::refresh_source_data`] for each configured source
/// every period.
pub struct RefreshScheduler {
    cache: Arc<RefDataCache>,
    config: SchedulerConfig,
    handle: SchedulerHandle,
}

impl RefreshScheduler {
    /// Creates a scheduler.
    pub fn new(cache: Arc<RefDataCache>, config: SchedulerConfig) -> Self {
        Self {
            cache,
            config,
            handle: SchedulerHandle {
                stop_flag: Arc::new(AtomicBool::new(false)),
                wake: Arc::new(Notify::new()),
                status: Arc::new(RwLock::new(SchedulerStatus::default())),
            },
        }
    }

    /// Returns a handle to stop the loop and read its counters.
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Spawns the loop on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs the loop until stopped.
    pub async fn run(self) {
        self.handle.status.write().running = true;
        info!(
            every_secs = self.config.every.as_secs(),
            sources = self.config.sources.len(),
            "Refresh scheduler started"
        );

        let mut timer = interval(self.config.every);
        if !self.config.run_on_startup {
            // First tick of a tokio interval completes immediately
            timer.tick().await;
        }

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = self.handle.wake.notified() => {}
            }
            if self.handle.is_stop_requested() {
                break;
            }
            self.run_cycle().await;
        }

        self.handle.status.write().running = false;
        info!("Refresh scheduler stopped");
    }

    async fn run_cycle(&self) {
        let mut reports = Vec::with_capacity(self.config.sources.len());
        for source in &self.config.sources {
            reports.push(self.cache.refresh_source_data(*source).await);
        }

        let mut status = self.handle.status.write();
        status.cycles += 1;
        for report in &reports {
            if report.is_ok() {
                status.refreshed += 1;
            } else {
                status.failed += 1;
            }
        }
        status.last_reports = reports;
    }
}
