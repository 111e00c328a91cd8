//! Running statistics accumulator
//!
//! Folds prices one at a time into sum/count/max/min. The minimum is
//! seeded from the first price seen, so a legitimate price of zero is never
//! confused with "no minimum yet".

use types::statistics::Statistics;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    sum: f64,
    count: u64,
    max: f64,
    min: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one price into the running totals.
    pub fn add(&mut self, price: f64) {
        if self.count == 0 {
            self.max = price;
            self.min = price;
        } else {
            self.max = self.max.max(price);
            self.min = self.min.min(price);
        }
        self.sum += price;
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Convert to a statistics value; an empty accumulator yields all zeros.
    pub fn to_statistics(&self) -> Statistics {
        if self.count == 0 {
            return Statistics::EMPTY;
        }
        Statistics {
            average: self.sum / self.count as f64,
            max: self.max,
            min: self.min,
            count: self.count,
        }
    }
}
