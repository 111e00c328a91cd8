//! Sliding-window statistics aggregator
//!
//! Owns the tick store and a background task that, on a fixed period,
//! evicts expired buckets and rebuilds the statistics snapshot. Producers
//! write straight into the store; readers load the last published snapshot
//! without taking any lock.
//!
//! Two independent policies enforce the window:
//! - admission: `add_tick` refuses ticks with `timestamp < now - window`;
//! - eviction: each rebuild drops buckets with `timestamp <= now - window`.
//!
//! Each policy reads the clock itself, so the two may see slightly
//! different "now" values.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use types::statistics::Statistics;
use types::tick::Tick;

use crate::clock::{Clock, SystemClock};
use crate::metrics::{Alert, AlertLevel, AlertThresholds, ServiceMetrics};
use crate::snapshot::{SnapshotBuilder, StatisticsSnapshot};
use crate::store::{EvictionStats, TickStore};

/// Width of the trailing statistics window in milliseconds.
pub const WINDOW_MILLIS: i64 = 60_000;

/// Configuration for the statistics aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Interval between rebuild cycles. The first cycle runs immediately.
    pub rebuild_period: Duration,
    /// Checked against the metrics after every rebuild.
    pub alert_thresholds: AlertThresholds,
}

impl AggregatorConfig {
    pub fn with_period_millis(millis: u64) -> Self {
        Self {
            rebuild_period: Duration::from_millis(millis),
            ..Self::default()
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            rebuild_period: Duration::from_millis(500),
            alert_thresholds: AlertThresholds::default(),
        }
    }
}

/// Summary of a single rebuild cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Generation of the snapshot this rebuild published.
    pub generation: u64,
    /// Clock reading used for eviction.
    pub now: i64,
    pub evicted: EvictionStats,
    /// Observations folded into the new snapshot.
    pub observations: u64,
    /// Instruments present in the new snapshot.
    pub instruments: usize,
    pub elapsed: Duration,
    /// Thresholds breached once this rebuild was recorded.
    pub alerts: Vec<Alert>,
}

/// State shared between the aggregator handle and its background task.
struct Engine {
    store: TickStore,
    published: ArcSwap<StatisticsSnapshot>,
    /// Serializes rebuilds so generations are published in order.
    builder: Mutex<SnapshotBuilder>,
    clock: Arc<dyn Clock>,
    metrics: ServiceMetrics,
    thresholds: AlertThresholds,
}

impl Engine {
    fn new(clock: Arc<dyn Clock>, thresholds: AlertThresholds) -> Self {
        Self {
            store: TickStore::new(),
            published: ArcSwap::from_pointee(StatisticsSnapshot::empty()),
            builder: Mutex::new(SnapshotBuilder::new()),
            clock,
            metrics: ServiceMetrics::new(),
            thresholds,
        }
    }

    fn add_tick(&self, tick: Tick) -> bool {
        let cutoff = self.clock.now_millis().saturating_sub(WINDOW_MILLIS);
        if tick.timestamp < cutoff {
            self.metrics.record_tick_rejected();
            debug!(
                instrument = %tick.instrument,
                timestamp = tick.timestamp,
                cutoff,
                "Rejecting stale tick"
            );
            return false;
        }

        self.store.insert(tick.timestamp, tick.instrument, tick.price);
        self.metrics.record_tick_accepted();
        true
    }

    fn rebuild(&self) -> RebuildReport {
        let started = Instant::now();
        let mut builder = self.builder.lock();

        let now = self.clock.now_millis();
        let evicted = self.store.evict_before(now.saturating_sub(WINDOW_MILLIS));
        let snapshot = builder.build(&self.store);

        let generation = snapshot.generation;
        let observations = snapshot.global.count;
        let instruments = snapshot.instrument_count();
        self.published.store(Arc::new(snapshot));
        drop(builder);

        let elapsed = started.elapsed();
        self.metrics.record_rebuild(
            elapsed.as_micros() as u64,
            evicted.buckets as u64,
            evicted.observations as u64,
            observations,
            instruments as u64,
        );

        debug!(
            generation,
            evicted_buckets = evicted.buckets,
            evicted_observations = evicted.observations,
            observations,
            instruments,
            elapsed_us = elapsed.as_micros() as u64,
            "Statistics snapshot rebuilt"
        );

        let alerts = self.metrics.check_thresholds(&self.thresholds);
        for alert in &alerts {
            match alert.level {
                AlertLevel::Critical => error!(metric = %alert.metric, "{}", alert.message),
                AlertLevel::Warning => warn!(metric = %alert.metric, "{}", alert.message),
            }
        }

        RebuildReport {
            generation,
            now,
            evicted,
            observations,
            instruments,
            elapsed,
            alerts,
        }
    }
}

/// Handle to a running statistics aggregator.
///
/// Dropping the handle aborts the background cycle; `shutdown` stops it
/// gracefully.
pub struct StatisticsAggregator {
    engine: Arc<Engine>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl StatisticsAggregator {
    /// Start an aggregator on wall-clock time.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: AggregatorConfig) -> Self {
        Self::start_with_clock(config, Arc::new(SystemClock))
    }

    /// Start an aggregator reading time from `clock`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_with_clock(config: AggregatorConfig, clock: Arc<dyn Clock>) -> Self {
        let period = if config.rebuild_period.is_zero() {
            warn!("Rebuild period of zero requested, using 1ms");
            Duration::from_millis(1)
        } else {
            config.rebuild_period
        };

        let engine = Arc::new(Engine::new(clock, config.alert_thresholds));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_rebuild_cycle(Arc::clone(&engine), period, shutdown_rx));

        info!(
            rebuild_period_ms = period.as_millis() as u64,
            window_ms = WINDOW_MILLIS,
            "Statistics aggregator started"
        );

        Self {
            engine,
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Offer a tick. Returns `false` if it is older than the window.
    ///
    /// Accepted ticks show up in statistics after the next rebuild.
    pub fn add_tick(&self, tick: Tick) -> bool {
        self.engine.add_tick(tick)
    }

    /// Global statistics as of the last rebuild.
    pub fn statistics(&self) -> Statistics {
        self.engine.published.load().global
    }

    /// Statistics for one instrument as of the last rebuild, or `None` if
    /// it had no observations in the window.
    pub fn instrument_statistics(&self, instrument: &str) -> Option<Statistics> {
        self.engine.published.load().instrument(instrument)
    }

    /// Generation of the currently published snapshot (0 before the first
    /// rebuild).
    pub fn generation(&self) -> u64 {
        self.engine.published.load().generation
    }

    /// Run a rebuild cycle now, outside the regular schedule.
    pub fn rebuild_now(&self) -> RebuildReport {
        self.engine.rebuild()
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.engine.metrics
    }

    /// Stop the background cycle and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Rebuild task ended abnormally");
            }
        }
        info!("Statistics aggregator stopped");
    }
}

impl Drop for StatisticsAggregator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_rebuild_cycle(
    engine: Arc<Engine>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                engine.rebuild();
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    debug!("Rebuild cycle exited");
}
