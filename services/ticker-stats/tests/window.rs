//! Window behaviour tests for the Ticker Statistics Service
//!
//! Exercises the aggregator end to end through its public API.
//!
//! Tests include:
//! - Reference scenarios on wall-clock time with a running rebuild cycle
//! - Deterministic expiry on a manual clock
//! - Overwrite of duplicate (timestamp, instrument) ticks
//! - Concurrent producers and readers
//! - Property tests for count/average/min/max over random tick streams

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use ticker_stats::{
    AggregatorConfig, Clock, ManualClock, StatisticsAggregator, SystemClock, WINDOW_MILLIS,
};
use types::statistics::Statistics;
use types::tick::Tick;

const IBM: &str = "IBM.N";
const KO: &str = "KO";
const SECOND: i64 = 1_000;
const T0: i64 = 1_700_000_000_000;

fn fast_aggregator() -> StatisticsAggregator {
    StatisticsAggregator::start(AggregatorConfig::with_period_millis(10))
}

fn manual_aggregator() -> (StatisticsAggregator, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let aggregator = StatisticsAggregator::start_with_clock(
        AggregatorConfig {
            rebuild_period: Duration::from_secs(3600),
            ..AggregatorConfig::default()
        },
        clock.clone(),
    );
    (aggregator, clock)
}

async fn wait_for_rebuilds() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

// ── Reference scenarios (wall clock) ───────────────────────────────

#[tokio::test]
async fn test_same_instrument_statistics() {
    let aggregator = fast_aggregator();
    let now = SystemClock.now_millis();

    assert!(aggregator.add_tick(Tick::new(IBM, 140.0, now)));
    assert!(aggregator.add_tick(Tick::new(IBM, 142.0, now - SECOND)));
    assert!(aggregator.add_tick(Tick::new(IBM, 144.0, now - 2 * SECOND)));

    wait_for_rebuilds().await;

    let stats = aggregator.statistics();
    assert_eq!(
        stats,
        Statistics {
            average: 142.0,
            max: 144.0,
            min: 140.0,
            count: 3,
        }
    );

    aggregator.shutdown().await;
}

#[tokio::test]
async fn test_multiple_instruments() {
    let aggregator = fast_aggregator();
    let now = SystemClock.now_millis();

    aggregator.add_tick(Tick::new(IBM, 140.0, now));
    aggregator.add_tick(Tick::new(KO, 12.0, now));
    aggregator.add_tick(Tick::new(KO, 16.0, now - SECOND));

    wait_for_rebuilds().await;

    let ko = aggregator.instrument_statistics(KO).expect("KO should be present");
    assert_eq!(
        ko,
        Statistics {
            average: 14.0,
            max: 16.0,
            min: 12.0,
            count: 2,
        }
    );
    assert_eq!(aggregator.statistics().count, 3);
    assert_eq!(aggregator.instrument_statistics(IBM).unwrap().count, 1);

    aggregator.shutdown().await;
}

#[tokio::test]
async fn test_old_tick_ignored() {
    let aggregator = fast_aggregator();
    let now = SystemClock.now_millis();

    assert!(aggregator.add_tick(Tick::new(IBM, 140.0, now)));
    assert!(!aggregator.add_tick(Tick::new(IBM, 142.0, now - 61 * SECOND)));

    wait_for_rebuilds().await;

    let stats = aggregator.statistics();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.average, 140.0);

    aggregator.shutdown().await;
}

#[tokio::test]
async fn test_mixed_fresh_and_stale_ticks() {
    let aggregator = fast_aggregator();
    let now = SystemClock.now_millis();

    for age in [1, 2, 3, 64, 65] {
        aggregator.add_tick(Tick::new(IBM, 140.0, now - age * SECOND));
    }

    wait_for_rebuilds().await;

    let stats = aggregator.statistics();
    assert_eq!(stats.average, 140.0);
    assert_eq!(stats.count, 3);

    aggregator.shutdown().await;
}

#[tokio::test]
async fn test_no_ticks_ever() {
    let aggregator = fast_aggregator();
    wait_for_rebuilds().await;

    assert!(aggregator.generation() >= 1);
    assert_eq!(aggregator.statistics(), Statistics::EMPTY);
    assert_eq!(aggregator.instrument_statistics(IBM), None);
    assert_eq!(aggregator.instrument_statistics(KO), None);

    aggregator.shutdown().await;
}

// ── Deterministic expiry (manual clock) ────────────────────────────

#[tokio::test]
async fn test_soon_expiring_tick() {
    let (aggregator, clock) = manual_aggregator();

    aggregator.add_tick(Tick::new(IBM, 140.0, T0 - SECOND));
    aggregator.add_tick(Tick::new(IBM, 142.0, T0 - WINDOW_MILLIS + 150));

    aggregator.rebuild_now();
    let stats = aggregator.statistics();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.average, 141.0);

    clock.advance(200);
    aggregator.rebuild_now();
    let stats = aggregator.statistics();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.average, 140.0);
}

#[tokio::test]
async fn test_expired_tick_gone_within_two_rebuilds() {
    let (aggregator, clock) = manual_aggregator();

    aggregator.add_tick(Tick::new(KO, 12.0, T0));
    aggregator.rebuild_now();
    assert_eq!(aggregator.statistics().count, 1);

    // Expires exactly at T0 + window
    clock.set(T0 + WINDOW_MILLIS);
    aggregator.rebuild_now();
    aggregator.rebuild_now();

    assert_eq!(aggregator.statistics(), Statistics::EMPTY);
    assert_eq!(aggregator.instrument_statistics(KO), None);
}

#[tokio::test]
async fn test_stale_tick_never_visible() {
    let (aggregator, _clock) = manual_aggregator();

    assert!(!aggregator.add_tick(Tick::new(KO, 99.0, T0 - WINDOW_MILLIS - 1)));
    aggregator.rebuild_now();

    assert_eq!(aggregator.statistics(), Statistics::EMPTY);
    assert_eq!(aggregator.instrument_statistics(KO), None);
}

#[tokio::test]
async fn test_duplicate_tick_overwrites() {
    let (aggregator, _clock) = manual_aggregator();

    aggregator.add_tick(Tick::new(IBM, 140.0, T0));
    aggregator.add_tick(Tick::new(IBM, 150.0, T0));
    // Same timestamp, different instrument: kept separately
    aggregator.add_tick(Tick::new(KO, 12.0, T0));
    aggregator.rebuild_now();

    let ibm = aggregator.instrument_statistics(IBM).unwrap();
    assert_eq!(ibm.count, 1);
    assert_eq!(ibm.average, 150.0);
    assert_eq!(aggregator.statistics().count, 2);
}

#[tokio::test]
async fn test_zero_price_minimum() {
    let (aggregator, _clock) = manual_aggregator();

    aggregator.add_tick(Tick::new(IBM, 10.0, T0 - 2 * SECOND));
    aggregator.add_tick(Tick::new(IBM, 0.0, T0 - SECOND));
    aggregator.add_tick(Tick::new(KO, 5.0, T0));
    aggregator.rebuild_now();

    let ibm = aggregator.instrument_statistics(IBM).unwrap();
    assert_eq!(ibm.min, 0.0);
    assert_eq!(ibm.max, 10.0);

    let global = aggregator.statistics();
    assert_eq!(global.min, 0.0);
    assert_eq!(global.max, 10.0);
    assert_eq!(global.average, 5.0);

    // KO never saw a zero; its minimum is its own price
    assert_eq!(aggregator.instrument_statistics(KO).unwrap().min, 5.0);
}

// ── Concurrency ────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_producers_and_readers() {
    let clock = Arc::new(ManualClock::new(T0));
    let aggregator = Arc::new(StatisticsAggregator::start_with_clock(
        AggregatorConfig::with_period_millis(1),
        clock,
    ));

    let symbols = ["IBM.N", "KO", "MSFT.O", "AAPL.O"];
    let per_producer = 2_000;

    let producers: Vec<_> = symbols
        .iter()
        .map(|&symbol| {
            let aggregator = Arc::clone(&aggregator);
            thread::spawn(move || {
                for i in 0..per_producer {
                    assert!(aggregator.add_tick(Tick::new(symbol, 100.0, T0 - i)));
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let aggregator = Arc::clone(&aggregator);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let stats = aggregator.statistics();
                    if stats.count == 0 {
                        assert_eq!(stats, Statistics::EMPTY);
                    } else {
                        // Every tick has price 100, from any generation
                        assert_eq!(stats.min, 100.0);
                        assert_eq!(stats.max, 100.0);
                        assert_eq!(stats.average, 100.0);
                        assert!(stats.count <= (symbols.len() as u64) * per_producer as u64);
                    }
                }
            })
        })
        .collect();

    for handle in producers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    aggregator.rebuild_now();
    let stats = aggregator.statistics();
    assert_eq!(stats.count, (symbols.len() as u64) * per_producer as u64);
    for symbol in symbols {
        assert_eq!(
            aggregator.instrument_statistics(symbol).unwrap().count,
            per_producer as u64
        );
    }
}

// ── Property tests ─────────────────────────────────────────────────

/// Reference model: the last price per (timestamp, instrument) among
/// ticks that are admitted and not yet expired at `now`.
fn expected_live(ticks: &[(usize, i64, f64)], now: i64) -> HashMap<(i64, usize), f64> {
    let mut live = HashMap::new();
    for &(instrument, timestamp, price) in ticks {
        if timestamp >= now - WINDOW_MILLIS {
            live.insert((timestamp, instrument), price);
        }
    }
    live.retain(|&(timestamp, _), _| timestamp > now - WINDOW_MILLIS);
    live
}

proptest! {
    #[test]
    fn prop_count_and_average_match_live_ticks(
        raw in prop::collection::vec((0usize..3, 0i64..120_000, 0u32..100_000), 0..200),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();
        let (aggregator, _clock) = manual_aggregator();

        let symbols = ["IBM.N", "KO", "MSFT.O"];
        let ticks: Vec<(usize, i64, f64)> = raw
            .iter()
            .map(|&(i, age, cents)| (i, T0 - age, cents as f64 / 100.0))
            .collect();

        for &(i, timestamp, price) in &ticks {
            let accepted = aggregator.add_tick(Tick::new(symbols[i], price, timestamp));
            prop_assert_eq!(accepted, timestamp >= T0 - WINDOW_MILLIS);
        }
        aggregator.rebuild_now();

        let live = expected_live(&ticks, T0);
        let stats = aggregator.statistics();
        prop_assert_eq!(stats.count, live.len() as u64);

        if live.is_empty() {
            prop_assert_eq!(stats, Statistics::EMPTY);
        } else {
            let sum: f64 = live.values().sum();
            let mean = sum / live.len() as f64;
            prop_assert!((stats.average - mean).abs() < 1e-6);

            let max = live.values().cloned().fold(f64::MIN, f64::max);
            let min = live.values().cloned().fold(f64::MAX, f64::min);
            prop_assert_eq!(stats.max, max);
            prop_assert_eq!(stats.min, min);
        }

        for (i, symbol) in symbols.iter().enumerate() {
            let expected = live.keys().filter(|&&(_, inst)| inst == i).count() as u64;
            match aggregator.instrument_statistics(symbol) {
                Some(s) => prop_assert_eq!(s.count, expected),
                None => prop_assert_eq!(expected, 0),
            }
        }
    }

    #[test]
    fn prop_duplicates_count_once(
        prices in prop::collection::vec(0u32..10_000, 1..20),
        age in 0i64..59_000,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();
        let (aggregator, _clock) = manual_aggregator();

        for &cents in &prices {
            aggregator.add_tick(Tick::new(KO, cents as f64, T0 - age));
        }
        aggregator.rebuild_now();

        let last = *prices.last().unwrap() as f64;
        let ko = aggregator.instrument_statistics(KO).unwrap();
        prop_assert_eq!(ko.count, 1);
        prop_assert_eq!(ko.average, last);
        prop_assert_eq!(ko.min, last);
        prop_assert_eq!(ko.max, last);
    }
}
