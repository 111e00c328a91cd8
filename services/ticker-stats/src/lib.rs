//! Ticker Statistics Service
//!
//! Ingests timestamped price ticks and serves average/max/min/count over
//! the trailing 60-second window, globally and per instrument.
//!
//! # Architecture
//!
//! ```text
//!   Producers (add_tick)
//!        │  admission check: timestamp >= now - window
//!    ┌───▼──────┐
//!    │TickStore │  ← timestamp buckets, one price per instrument
//!    └───┬──────┘
//!        │  every rebuild period:
//!        │  evict <= now - window, fold remaining ticks
//!    ┌───▼──────────┐
//!    │SnapshotBuilder│
//!    └───┬──────────┘
//!        │  ArcSwap::store (atomic, whole snapshot)
//!    ┌───▼──────────────────┐
//!    │ Published snapshot   │  ← readers: lock-free load
//!    └──────────────────────┘
//! ```

pub mod accumulator;
pub mod aggregator;
pub mod clock;
pub mod metrics;
pub mod snapshot;
pub mod store;

pub use aggregator::{AggregatorConfig, RebuildReport, StatisticsAggregator, WINDOW_MILLIS};
pub use clock::{Clock, ManualClock, SystemClock};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
