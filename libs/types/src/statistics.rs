//! Aggregate statistics over the trailing window
//!
//! `Statistics` is the value handed to callers: average, max, min and count
//! of the prices observed in the window. The empty state is all zeros.

use serde::{Deserialize, Serialize};

/// Aggregate price statistics
///
/// Serialized with the wire names `avg`, `max`, `min`, `count`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "avg")]
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub count: u64,
}

impl Statistics {
    /// Statistics over zero observations
    pub const EMPTY: Statistics = Statistics {
        average: 0.0,
        max: 0.0,
        min: 0.0,
        count: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::EMPTY
    }
}
