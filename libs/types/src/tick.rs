//! Tick (price observation) types
//!
//! A `Tick` is one accepted observation: instrument, price, and the
//! millisecond timestamp it was observed at. `TickRequest` is the raw
//! boundary payload, where every field may be missing.

use crate::errors::TickValidationError;
use crate::ids::InstrumentId;
use serde::{Deserialize, Serialize};

/// A validated price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: InstrumentId,
    pub price: f64,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

impl Tick {
    pub fn new(instrument: impl Into<String>, price: f64, timestamp: i64) -> Self {
        Self {
            instrument: InstrumentId::new(instrument),
            price,
            timestamp,
        }
    }
}

/// Incoming tick payload prior to validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickRequest {
    pub instrument: Option<String>,
    pub price: Option<f64>,
    pub timestamp: Option<i64>,
}

impl TickRequest {
    /// Validate every field and build a `Tick`.
    ///
    /// Collects all field errors rather than stopping at the first one,
    /// so callers can report them together.
    pub fn validate(self) -> Result<Tick, Vec<TickValidationError>> {
        let mut errors = Vec::new();

        let instrument = match self.instrument {
            None => {
                errors.push(TickValidationError::MissingInstrument);
                None
            }
            Some(symbol) => {
                let id = InstrumentId::try_new(symbol);
                if id.is_none() {
                    errors.push(TickValidationError::BlankInstrument);
                }
                id
            }
        };

        let price = match self.price {
            None => {
                errors.push(TickValidationError::MissingPrice);
                None
            }
            Some(p) if !p.is_finite() => {
                errors.push(TickValidationError::NonFinitePrice);
                None
            }
            Some(p) if p < 0.0 => {
                errors.push(TickValidationError::NegativePrice { price: p });
                None
            }
            Some(p) => Some(p),
        };

        let timestamp = match self.timestamp {
            None => {
                errors.push(TickValidationError::MissingTimestamp);
                None
            }
            Some(ts) if ts < 0 => {
                errors.push(TickValidationError::NegativeTimestamp { timestamp: ts });
                None
            }
            Some(ts) => Some(ts),
        };

        match (instrument, price, timestamp) {
            (Some(instrument), Some(price), Some(timestamp)) => Ok(Tick {
                instrument,
                price,
                timestamp,
            }),
            _ => Err(errors),
        }
    }
}
