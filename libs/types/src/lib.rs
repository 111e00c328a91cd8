//! Types library for the ticker statistics service
//!
//! This library provides the core type definitions shared between the
//! aggregation engine and the HTTP gateway.
//!
//! # Modules
//! - `ids`: Instrument identifiers
//! - `tick`: Price observations and the raw boundary payload
//! - `statistics`: Aggregate statistics values
//! - `errors`: Validation error taxonomy

// Public modules
pub mod ids;
pub mod tick;
pub mod statistics;
pub mod errors;
