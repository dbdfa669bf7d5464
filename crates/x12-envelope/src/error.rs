//! # Builder Errors
//!
//! The builder fails fast: a half-built envelope is never emitted. Every
//! variant carries enough context to name the level or field at fault.

use thiserror::Error;
use x12_core::EnvelopeLevel;

/// Errors raised while assembling or serializing an envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// One or more of the six required control tags was never appended.
    #[error("incomplete envelope: missing required control segments {}", .missing.join(", "))]
    IncompleteEnvelope {
        /// The absent tags, in envelope order.
        missing: Vec<&'static str>,
    },

    /// No transaction-set type was declared, either through an `ST` segment
    /// or [`crate::EnvelopeBuilder::set_transaction_set_type`].
    #[error("transaction set type not specified")]
    MissingTransactionType,

    /// A level opened through a helper was never closed.
    #[error("{level} opened with {} was never closed by {}", .level.header_tag(), .level.trailer_tag())]
    UnclosedLevel {
        /// The level still open.
        level: EnvelopeLevel,
    },

    /// A close helper was called with no open span of that level.
    #[error("cannot close {level}: no {} is open", .level.header_tag())]
    LevelNotOpen {
        /// The level the caller tried to close.
        level: EnvelopeLevel,
    },

    /// An open helper was called while that level was already open.
    #[error("cannot open {level}: a previous {} is still open", .level.header_tag())]
    LevelAlreadyOpen {
        /// The level the caller tried to open.
        level: EnvelopeLevel,
    },

    /// An open helper was called outside its enclosing level.
    #[error("cannot open {level} outside an open {parent}")]
    ParentNotOpen {
        /// The level the caller tried to open.
        level: EnvelopeLevel,
        /// The enclosing level that must be open first.
        parent: EnvelopeLevel,
    },

    /// A value does not fit its fixed-width field.
    #[error("{field} must be at most {width} characters, got {value:?}")]
    FieldTooWide {
        /// Field reference, e.g. `ISA06`.
        field: &'static str,
        /// Maximum width.
        width: usize,
        /// The offending value.
        value: String,
    },

    /// A tag or field holds a delimiter and would split on the wire.
    #[error("{field} contains the delimiter {delimiter:?}")]
    DelimiterInContent {
        /// Field reference, e.g. `ISA06` or `NM103 at position 4`.
        field: String,
        /// The offending delimiter character.
        delimiter: char,
    },

    /// The control counter for a level ran past its maximum.
    #[error("{level} control numbers exhausted")]
    ControlNumberExhausted {
        /// The level whose counter overflowed.
        level: EnvelopeLevel,
    },
}
