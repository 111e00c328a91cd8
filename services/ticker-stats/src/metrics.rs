//! Observability for the statistics engine
//!
//! Counters for the ingestion path and the rebuild cycle, plus a bounded
//! latency tracker for rebuild durations. Everything here is updated from
//! the hot paths, so counters are plain atomics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Core metrics for the statistics engine.
pub struct ServiceMetrics {
    // Ingestion
    pub ticks_accepted: AtomicU64,
    pub ticks_rejected_stale: AtomicU64,

    // Rebuild cycle
    pub rebuilds_completed: AtomicU64,
    pub rebuild_duration_us: Mutex<LatencyTracker>,
    pub buckets_evicted: AtomicU64,
    pub observations_evicted: AtomicU64,

    // Last published snapshot
    pub live_observations: AtomicU64,
    pub live_instruments: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            ticks_accepted: AtomicU64::new(0),
            ticks_rejected_stale: AtomicU64::new(0),
            rebuilds_completed: AtomicU64::new(0),
            rebuild_duration_us: Mutex::new(LatencyTracker::new(1000)),
            buckets_evicted: AtomicU64::new(0),
            observations_evicted: AtomicU64::new(0),
            live_observations: AtomicU64::new(0),
            live_instruments: AtomicU64::new(0),
        }
    }

    pub fn record_tick_accepted(&self) {
        self.ticks_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick_rejected(&self) {
        self.ticks_rejected_stale.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed rebuild and what it evicted.
    pub fn record_rebuild(
        &self,
        duration_us: u64,
        buckets_evicted: u64,
        observations_evicted: u64,
        live_observations: u64,
        live_instruments: u64,
    ) {
        self.rebuilds_completed.fetch_add(1, Ordering::Relaxed);
        self.buckets_evicted.fetch_add(buckets_evicted, Ordering::Relaxed);
        self.observations_evicted
            .fetch_add(observations_evicted, Ordering::Relaxed);
        self.live_observations.store(live_observations, Ordering::Relaxed);
        self.live_instruments.store(live_instruments, Ordering::Relaxed);
        self.rebuild_duration_us.lock().record(duration_us);
    }

    /// Check alert thresholds and generate alerts.
    pub fn check_thresholds(&self, thresholds: &AlertThresholds) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let rejected = self.ticks_rejected_stale.load(Ordering::Relaxed);
        if rejected > thresholds.max_ticks_rejected {
            alerts.push(Alert {
                level: AlertLevel::Warning,
                metric: "ticks_rejected_stale".to_string(),
                message: format!(
                    "Stale ticks rejected: {} > threshold {}",
                    rejected, thresholds.max_ticks_rejected
                ),
            });
        }

        if let Some(p99) = self.rebuild_duration_us.lock().percentile(99) {
            if p99 > thresholds.max_rebuild_p99_us {
                alerts.push(Alert {
                    level: AlertLevel::Critical,
                    metric: "rebuild_duration_p99".to_string(),
                    message: format!(
                        "Rebuild p99: {}us > threshold {}us",
                        p99, thresholds.max_rebuild_p99_us
                    ),
                });
            }
        }

        alerts
    }

    /// Export metrics as a BTreeMap for Prometheus-style exposition.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert("ticks_accepted".to_string(), self.ticks_accepted.load(Ordering::Relaxed));
        m.insert("ticks_rejected_stale".to_string(), self.ticks_rejected_stale.load(Ordering::Relaxed));
        m.insert("rebuilds_completed".to_string(), self.rebuilds_completed.load(Ordering::Relaxed));
        m.insert("buckets_evicted".to_string(), self.buckets_evicted.load(Ordering::Relaxed));
        m.insert("observations_evicted".to_string(), self.observations_evicted.load(Ordering::Relaxed));
        m.insert("live_observations".to_string(), self.live_observations.load(Ordering::Relaxed));
        m.insert("live_instruments".to_string(), self.live_instruments.load(Ordering::Relaxed));

        let tracker = self.rebuild_duration_us.lock();
        if let Some(avg) = tracker.average() {
            m.insert("rebuild_duration_avg_us".to_string(), avg);
        }
        if let Some(p99) = tracker.percentile(99) {
            m.insert("rebuild_duration_p99_us".to_string(), p99);
        }
        m
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks latency samples for percentile calculation.
pub struct LatencyTracker {
    samples: Vec<u64>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a latency sample.
    pub fn record(&mut self, value: u64) {
        if self.samples.len() >= self.max_samples {
            self.samples.remove(0);
        }
        self.samples.push(value);
    }

    /// Get a percentile value (0-100).
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut sorted = self.samples.clone();
        sorted.sort_unstable();

        let idx = (p as f64 / 100.0 * (sorted.len() - 1) as f64) as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    /// Average latency.
    pub fn average(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as u64)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}

/// Alert severity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// An alert triggered by threshold breach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub metric: String,
    pub message: String,
}

/// Configurable alert thresholds.
#[derive(Debug, Clone)]
pub struct AlertThresholds {
    /// Stale ticks rejected before a warning.
    pub max_ticks_rejected: u64,
    /// Rebuild p99 in microseconds before a critical alert.
    pub max_rebuild_p99_us: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_ticks_rejected: 1_000,
            max_rebuild_p99_us: 250_000, // half the default rebuild period
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counters() {
        let metrics = ServiceMetrics::new();

        metrics.record_tick_accepted();
        metrics.record_tick_accepted();
        metrics.record_tick_rejected();

        let exported = metrics.export();
        assert_eq!(exported["ticks_accepted"], 2);
        assert_eq!(exported["ticks_rejected_stale"], 1);
        assert!(!exported.contains_key("rebuild_duration_avg_us"));
    }

    #[test]
    fn test_rebuild_recording() {
        let metrics = ServiceMetrics::new();
        metrics.record_rebuild(100, 2, 5, 10, 3);
        metrics.record_rebuild(300, 1, 1, 9, 3);

        let exported = metrics.export();
        assert_eq!(exported["rebuilds_completed"], 2);
        assert_eq!(exported["buckets_evicted"], 3);
        assert_eq!(exported["observations_evicted"], 6);
        assert_eq!(exported["live_observations"], 9);
        assert_eq!(exported["live_instruments"], 3);
        assert_eq!(exported["rebuild_duration_avg_us"], 200);
    }

    #[test]
    fn test_latency_tracker_percentile() {
        let mut tracker = LatencyTracker::new(100);

        for i in 1..=100 {
            tracker.record(i);
        }

        let p50 = tracker.percentile(50).unwrap();
        assert!((49..=51).contains(&p50));

        let p99 = tracker.percentile(99).unwrap();
        assert!((98..=100).contains(&p99));
    }

    #[test]
    fn test_latency_tracker_window_eviction() {
        let mut tracker = LatencyTracker::new(3);

        tracker.record(10);
        tracker.record(20);
        tracker.record(30);
        tracker.record(40); // Should evict 10

        assert_eq!(tracker.count(), 3);
        assert_eq!(tracker.average().unwrap(), 30);
    }

    #[test]
    fn test_alert_thresholds() {
        let metrics = ServiceMetrics::new();
        let thresholds = AlertThresholds {
            max_ticks_rejected: 2,
            max_rebuild_p99_us: 1_000,
        };

        assert!(metrics.check_thresholds(&thresholds).is_empty());

        for _ in 0..3 {
            metrics.record_tick_rejected();
        }
        metrics.record_rebuild(5_000, 0, 0, 0, 0);

        let alerts = metrics.check_thresholds(&thresholds);
        assert!(alerts.iter().any(|a| a.metric == "ticks_rejected_stale"));
        assert!(alerts
            .iter()
            .any(|a| a.metric == "rebuild_duration_p99" && a.level == AlertLevel::Critical));
    }
}
