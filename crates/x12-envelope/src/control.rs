//! # Control Numbers
//!
//! Per-level counters owned by one builder. Each header helper advances its
//! own counter before formatting; trailers echo the current value. Counters
//! only move forward and are reset by constructing a new builder.

use x12_core::EnvelopeLevel;

use crate::error::BuildError;

/// Largest control number any level can carry (nine digits).
pub const MAX_CONTROL_NUMBER: u32 = 999_999_999;

/// Monotonic control counters for the three envelope levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlNumbers {
    interchange: u32,
    group: u32,
    set: u32,
}

impl ControlNumbers {
    /// Advance the counter for `level` and return the new value.
    pub fn advance(&mut self, level: EnvelopeLevel) -> Result<u32, BuildError> {
        let slot = self.slot_mut(level);
        if *slot >= MAX_CONTROL_NUMBER {
            return Err(BuildError::ControlNumberExhausted { level });
        }
        *slot += 1;
        Ok(*slot)
    }

    /// Current value for `level` (zero before the first header).
    pub fn current(&self, level: EnvelopeLevel) -> u32 {
        match level {
            EnvelopeLevel::Interchange => self.interchange,
            EnvelopeLevel::FunctionalGroup => self.group,
            EnvelopeLevel::TransactionSet => self.set,
        }
    }

    /// Current value for `level`, formatted for the wire.
    pub fn formatted(&self, level: EnvelopeLevel) -> String {
        format_control_number(level, self.current(level))
    }

    fn slot_mut(&mut self, level: EnvelopeLevel) -> &mut u32 {
        match level {
            EnvelopeLevel::Interchange => &mut self.interchange,
            EnvelopeLevel::FunctionalGroup => &mut self.group,
            EnvelopeLevel::TransactionSet => &mut self.set,
        }
    }
}

/// Wire form of a control number: `ISA13` is zero-padded to nine digits,
/// `ST02` to four, `GS06` is written bare.
pub fn format_control_number(level: EnvelopeLevel, value: u32) -> String {
    match level {
        EnvelopeLevel::Interchange => format!("{value:09}"),
        EnvelopeLevel::FunctionalGroup => value.to_string(),
        EnvelopeLevel::TransactionSet => format!("{value:04}"),
    }
}
