pub mod metrics;
pub mod statistics;
pub mod ticks;
