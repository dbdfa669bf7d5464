//! # Error Types
//!
//! Errors raised by the parsing path. Validation problems are never errors
//! at this layer: they are collected by `x12-validate` into a report.

use thiserror::Error;

/// Top-level error type for `x12-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The input produced no segments at all (empty or terminator-only).
    #[error("malformed input: document contains no segments")]
    MalformedInput,

    /// A position lookup fell outside the document.
    #[error("position {position} is out of range for a document of {len} segments")]
    OutOfRange {
        /// The requested position.
        position: usize,
        /// Number of segments in the document.
        len: usize,
    },

    /// Two delimiter roles were assigned the same character.
    #[error("delimiters must be distinct, got segment={segment:?} element={element:?} sub_element={sub_element:?}")]
    AmbiguousDelimiters {
        /// Segment terminator.
        segment: char,
        /// Element (field) separator.
        element: char,
        /// Sub-element (component) separator.
        sub_element: char,
    },
}
