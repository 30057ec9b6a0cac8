//! Background refresh task
//!
//! Each tick runs a sync pass and then reloads the merged report list.
//! Ticks come from a [`Ticker`]: [`IntervalTicker`] for real time,
//! [`ManualTicker`] when the caller decides when a tick happens. Passes run
//! one after another on the task, so a slow pass delays the next tick
//! instead of overlapping it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::reconcile::get_all_reports;
use crate::remote::ReportRemote;
use crate::session::RefreshTracker;
use crate::shutdown::ShutdownCoordinator;
use crate::storage::LocalReportStore;
use crate::sync::{sync_pending, SyncSummary};

/// Default period between background ticks
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Source of refresh ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick; `false` once no more ticks will come
    async fn tick(&mut self) -> bool;
}

/// Fixed-period ticker; the first tick fires immediately
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        // tokio panics on a zero period
        let mut interval = interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticker driven by a [`ManualTrigger`]; ends when every trigger is dropped
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Handle that fires ticks on a [`ManualTicker`]
#[derive(Clone)]
pub struct ManualTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTrigger {
    /// Queue one tick; `false` if the ticker is gone
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Create a linked trigger/ticker pair
pub fn manual_ticker() -> (ManualTrigger, ManualTicker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualTrigger { tx }, ManualTicker { rx })
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Result of one background pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    /// 1-based pass number; 0 before the first pass
    pub pass: u64,
    pub sync: SyncSummary,
    pub total_reports: usize,
    /// Reports that appeared since the previous pass
    pub new_reports: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Periodic sync-and-refresh loop
pub struct BackgroundSync {
    store: LocalReportStore,
    remote: Option<Arc<dyn ReportRemote>>,
    team_filter: Option<u32>,
    pacing: Duration,
    tracker: RefreshTracker,
    passes: u64,
    outcome_tx: watch::Sender<RefreshOutcome>,
}

impl BackgroundSync {
    pub fn new(store: LocalReportStore, remote: Option<Arc<dyn ReportRemote>>, pacing: Duration) -> Self {
        let (outcome_tx, _) = watch::channel(RefreshOutcome::default());
        Self {
            store,
            remote,
            team_filter: None,
            pacing,
            tracker: RefreshTracker::new(),
            passes: 0,
            outcome_tx,
        }
    }

    /// Restrict refreshes to one team (locked-team mode)
    pub fn with_team_filter(mut self, team_filter: Option<u32>) -> Self {
        self.team_filter = team_filter;
        self
    }

    /// Receive the outcome of every pass
    pub fn subscribe(&self) -> watch::Receiver<RefreshOutcome> {
        self.outcome_tx.subscribe()
    }

    /// Run one sync-and-refresh pass now
    pub async fn run_once(&mut self) -> RefreshOutcome {
        let remote = self.remote.as_deref();

        let sync = match remote {
            Some(remote) => sync_pending(&self.store, remote, self.pacing).await,
            None => SyncSummary::default(),
        };

        let reports = get_all_reports(&self.store, remote, self.team_filter).await;
        let now = Utc::now();
        let new_reports = self.tracker.record(reports.len(), now);
        self.passes += 1;

        let outcome = RefreshOutcome {
            pass: self.passes,
            sync,
            total_reports: reports.len(),
            new_reports,
            refreshed_at: Some(now),
        };

        debug!(
            pass = outcome.pass,
            total = outcome.total_reports,
            new = outcome.new_reports,
            "Background pass finished"
        );
        self.outcome_tx.send_replace(outcome.clone());
        outcome
    }

    /// Run a pass on every tick until shutdown or the ticker ends
    ///
    /// Returns the last outcome.
    pub async fn run<T: Ticker>(mut self, mut ticker: T, shutdown: ShutdownCoordinator) -> RefreshOutcome {
        info!("Background sync started");
        let mut last = RefreshOutcome::default();

        loop {
            if shutdown.is_shutdown_requested() {
                break;
            }

            let more = tokio::select! {
                _ = shutdown.wait_for_shutdown() => false,
                more = ticker.tick() => more,
            };
            if !more {
                break;
            }

            last = self.run_once().await;
        }

        info!(passes = self.passes, "Background sync stopped");
        last
    }

    /// Spawn [`BackgroundSync::run`] on the runtime
    pub fn spawn<T: Ticker + 'static>(self, ticker: T, shutdown: ShutdownCoordinator) -> JoinHandle<RefreshOutcome> {
        tokio::spawn(self.run(ticker, shutdown))
    }
}
