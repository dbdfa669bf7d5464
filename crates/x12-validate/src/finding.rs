//! # Findings
//!
//! Every problem the validator can detect. A finding's `Display` output is
//! exactly the line that lands in [`crate::ValidationReport`], prefixed by its
//! kind, so callers can surface report entries verbatim.

use thiserror::Error;

/// One detected problem, error or warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// No segment could be produced from the input.
    #[error("Malformed Input: {detail}")]
    MalformedInput {
        /// What was wrong with the input.
        detail: String,
    },

    /// One of the six required control tags is absent from the document.
    #[error("Missing Control Segment: {tag}")]
    MissingControlSegment {
        /// The absent tag.
        tag: &'static str,
    },

    /// Headers and trailers do not nest, or the document does not start with
    /// `ISA` and end with `IEA`.
    #[error("Out Of Nesting Order: {detail}")]
    OutOfNestingOrder {
        /// Which rule was broken, with positions.
        detail: String,
    },

    /// A trailer's declared count disagrees with what it encloses.
    #[error("Count Mismatch: {trailer} {unit} count expected {expected}, actual {actual} ({scope})")]
    CountMismatch {
        /// The trailer tag (`SE`, `GE` or `IEA`).
        trailer: &'static str,
        /// What is being counted.
        unit: &'static str,
        /// Count derived from the document.
        expected: usize,
        /// Count declared by the trailer.
        actual: usize,
        /// The enclosing level and its control number.
        scope: String,
    },

    /// `GS08` does not carry the interchange's major version.
    #[error("Version Mismatch: GS08 {found} does not match ISA12 {expected} ({scope})")]
    VersionMismatch {
        /// Version prefix declared by the group.
        found: String,
        /// Version declared by the interchange.
        expected: String,
        /// The group and its control number.
        scope: String,
    },

    /// A control segment is too short, or a field it must carry is blank or
    /// unparseable.
    #[error("Invalid Control Segment: {detail}")]
    InvalidControlSegment {
        /// Which field or count was wrong, with its position.
        detail: String,
    },

    /// A trailer does not echo its header's control number.
    #[error("Control Number Mismatch: {trailer_field} {trailer_value} does not echo {header_field} {header_value}")]
    ControlNumberMismatch {
        /// Trailer field reference, e.g. `SE02`.
        trailer_field: &'static str,
        /// Value found in the trailer.
        trailer_value: String,
        /// Header field reference, e.g. `ST02`.
        header_field: &'static str,
        /// Value found in the header.
        header_value: String,
    },

    /// An `ISA` element does not have its fixed width. Warning only.
    #[error("Field Width: {field} expected {expected} characters, found {actual}")]
    FieldWidth {
        /// Field reference, e.g. `ISA06`.
        field: String,
        /// Required width.
        expected: usize,
        /// Width found.
        actual: usize,
    },

    /// No content rules are registered for a transaction-set type. Warning
    /// only.
    #[error("Unregistered Content: no content rules registered for transaction set type {code}")]
    UnregisteredContent {
        /// The transaction-set type code.
        code: String,
    },

    /// A registered content rule failed. The message is passed through
    /// verbatim.
    #[error("{0}")]
    ContentRuleViolation(String),
}

impl Finding {
    /// Whether this finding is informational and never affects `passed`.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::FieldWidth { .. } | Self::UnregisteredContent { .. })
    }
}
