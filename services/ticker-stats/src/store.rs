//! Raw tick storage keyed by timestamp
//!
//! Observations are grouped into one bucket per millisecond timestamp,
//! each bucket holding at most one price per instrument. Buckets live in a
//! `BTreeMap`, whose key order doubles as the ordered timestamp index used
//! by eviction: expired buckets are always a prefix of the map.
//!
//! Locking:
//! - The bucket collection sits behind an `RwLock`. Creating or removing a
//!   bucket takes the write lock; enumeration takes the read lock, so no
//!   bucket appears or disappears while a rebuild is reading.
//! - Each bucket has its own `Mutex`. Writes into an existing bucket only
//!   need the shared read lock, so producers hitting different buckets do
//!   not serialize on each other.

use std::collections::{BTreeMap, HashMap};

use parking_lot::{Mutex, RwLock};
use tracing::trace;
use types::ids::InstrumentId;

type Bucket = Mutex<HashMap<InstrumentId, f64>>;

/// One stored `(instrument, price)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub instrument: InstrumentId,
    pub price: f64,
}

/// Outcome of an eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionStats {
    /// Timestamp buckets removed.
    pub buckets: usize,
    /// Observations contained in the removed buckets.
    pub observations: usize,
}

/// Concurrent timestamp-bucketed tick store.
#[derive(Debug, Default)]
pub struct TickStore {
    buckets: RwLock<BTreeMap<i64, Bucket>>,
}

impl TickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the price for `(timestamp, instrument)`.
    pub fn insert(&self, timestamp: i64, instrument: InstrumentId, price: f64) {
        {
            let buckets = self.buckets.read();
            if let Some(bucket) = buckets.get(&timestamp) {
                bucket.lock().insert(instrument, price);
                return;
            }
        }

        // New timestamp: structural change, needs exclusive access.
        // Another producer may have created the bucket in between, which
        // `entry` handles.
        let mut buckets = self.buckets.write();
        buckets
            .entry(timestamp)
            .or_default()
            .get_mut()
            .insert(instrument, price);
    }

    /// Remove every bucket with a timestamp `<= cutoff`.
    ///
    /// Walks the index from the oldest timestamp and stops at the first
    /// live one, so the cost is proportional to what gets evicted.
    pub fn evict_before(&self, cutoff: i64) -> EvictionStats {
        let mut stats = EvictionStats::default();
        let mut buckets = self.buckets.write();

        while let Some(entry) = buckets.first_entry() {
            if *entry.key() > cutoff {
                break;
            }
            let (timestamp, bucket) = entry.remove_entry();
            let removed = bucket.into_inner();
            trace!(
                timestamp,
                observations = removed.len(),
                "Evicting expired bucket"
            );
            stats.buckets += 1;
            stats.observations += removed.len();
        }

        stats
    }

    /// Visit every stored observation under the shared structural lock.
    ///
    /// Buckets cannot be created or removed while the visit runs. A bucket
    /// is locked only while its own entries are visited.
    pub fn visit_entries<F>(&self, mut visit: F)
    where
        F: FnMut(&InstrumentId, f64),
    {
        let buckets = self.buckets.read();
        for bucket in buckets.values() {
            let prices = bucket.lock();
            for (instrument, &price) in prices.iter() {
                visit(instrument, price);
            }
        }
    }

    /// Collect a point-in-time copy of all stored observations.
    pub fn snapshot_entries(&self) -> Vec<Observation> {
        let mut entries = Vec::new();
        self.visit_entries(|instrument, price| {
            entries.push(Observation {
                instrument: instrument.clone(),
                price,
            });
        });
        entries
    }

    /// Number of distinct timestamps currently stored.
    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Number of stored observations across all buckets.
    pub fn observation_count(&self) -> usize {
        self.buckets
            .read()
            .values()
            .map(|bucket| bucket.lock().len())
            .sum()
    }

    /// Oldest timestamp still present, if any.
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.buckets.read().keys().next().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }
}
