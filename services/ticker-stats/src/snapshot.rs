//! Statistics snapshots
//!
//! A snapshot is the complete, immutable result of one rebuild: the global
//! statistics together with the per-instrument map. Snapshots are published
//! whole, so a reader always sees both halves from the same generation.

use std::collections::HashMap;

use types::ids::InstrumentId;
use types::statistics::Statistics;

use crate::accumulator::Accumulator;
use crate::store::TickStore;

/// Versioned statistics computed by a single rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsSnapshot {
    /// Monotonic rebuild generation; 0 means nothing has been built yet.
    pub generation: u64,
    /// Statistics across all instruments.
    pub global: Statistics,
    /// Statistics per instrument. Only instruments with at least one
    /// observation in the window are present.
    pub by_instrument: HashMap<InstrumentId, Statistics>,
}

impl StatisticsSnapshot {
    /// The snapshot readers see before the first rebuild.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            global: Statistics::EMPTY,
            by_instrument: HashMap::new(),
        }
    }

    /// Per-instrument statistics, if the instrument has live data.
    pub fn instrument(&self, instrument: &str) -> Option<Statistics> {
        self.by_instrument.get(instrument).copied()
    }

    pub fn instrument_count(&self) -> usize {
        self.by_instrument.len()
    }
}

impl Default for StatisticsSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Folds the tick store into versioned snapshots.
pub struct SnapshotBuilder {
    /// Current snapshot version counter.
    version_counter: u64,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self { version_counter: 0 }
    }

    /// Build a snapshot from everything currently in the store.
    pub fn build(&mut self, store: &TickStore) -> StatisticsSnapshot {
        let mut global = Accumulator::new();
        let mut per_instrument: HashMap<InstrumentId, Accumulator> = HashMap::new();

        store.visit_entries(|instrument, price| {
            global.add(price);
            match per_instrument.get_mut(instrument) {
                Some(acc) => acc.add(price),
                None => {
                    let mut acc = Accumulator::new();
                    acc.add(price);
                    per_instrument.insert(instrument.clone(), acc);
                }
            }
        });

        self.version_counter += 1;

        let by_instrument = per_instrument
            .into_iter()
            .filter(|(_, acc)| !acc.is_empty())
            .map(|(instrument, acc)| (instrument, acc.to_statistics()))
            .collect();

        StatisticsSnapshot {
            generation: self.version_counter,
            global: global.to_statistics(),
            by_instrument,
        }
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
