//! Identifier types for ticker entities
//!
//! Instruments are identified by their exchange symbol (e.g. "IBM.N", "KO").
//! The only structural requirement is that the symbol is not blank.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::errors::TickValidationError;

/// Instrument identifier (exchange symbol)
///
/// Serialized as a bare JSON string. Deserializing a blank string fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Create a new InstrumentId from a string
    ///
    /// # Panics
    /// Panics if the symbol is empty or only whitespace
    pub fn new(symbol: impl Into<String>) -> Self {
        let s = symbol.into();
        assert!(!s.trim().is_empty(), "InstrumentId must not be blank");
        Self(s)
    }

    /// Try to create an InstrumentId, returning None if blank
    pub fn try_new(symbol: impl Into<String>) -> Option<Self> {
        let s = symbol.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Get the symbol string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl TryFrom<String> for InstrumentId {
    type Error = TickValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or(TickValidationError::BlankInstrument)
    }
}

impl From<InstrumentId> for String {
    fn from(id: InstrumentId) -> Self {
        id.0
    }
}

// Lets `HashMap<InstrumentId, _>` be queried with a plain `&str`.
impl Borrow<str> for InstrumentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
