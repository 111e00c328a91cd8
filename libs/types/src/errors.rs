//! Error types for tick payload validation
//!
//! Validation happens at the service boundary; the aggregation core only
//! ever sees ticks that passed these checks.

use thiserror::Error;

/// A single field-level validation failure on an incoming tick
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TickValidationError {
    #[error("Instrument must not be null")]
    MissingInstrument,

    #[error("Instrument must not be blank")]
    BlankInstrument,

    #[error("Price must not be null")]
    MissingPrice,

    #[error("Price must be positive")]
    NegativePrice { price: f64 },

    #[error("Price must be a finite number")]
    NonFinitePrice,

    #[error("Timestamp must not be null")]
    MissingTimestamp,

    #[error("Timestamp cannot be negative")]
    NegativeTimestamp { timestamp: i64 },
}

impl TickValidationError {
    /// Name of the payload field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingInstrument | Self::BlankInstrument => "instrument",
            Self::MissingPrice | Self::NegativePrice { .. } | Self::NonFinitePrice => "price",
            Self::MissingTimestamp | Self::NegativeTimestamp { .. } => "timestamp",
        }
    }
}
