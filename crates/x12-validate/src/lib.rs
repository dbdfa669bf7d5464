//! # x12-validate — Envelope Validation
//!
//! Checks a raw document and returns a [`ValidationReport`] listing every
//! problem found, not just the first. The validator never fails: malformed
//! input, broken nesting and bad counts all become report entries.
//!
//! ## Extensibility
//!
//! Content checks are plugged in per transaction-set type through
//! [`EnvelopeValidator::register_content_rules`]. Any
//! `Fn(&Document, Range<usize>) -> Vec<String>` is a rule set, as is any type
//! implementing [`ContentRules`]. The bundled [`ClaimRules`] cover the
//! professional claim (`837`) and are opt-in via
//! [`EnvelopeValidator::with_bundled_rules`].
//!
//! ## Report Strings
//!
//! Every entry starts with its kind (`Missing Control Segment`,
//! `Count Mismatch`, …) followed by a colon, except content-rule messages,
//! which are passed through verbatim.

pub mod claim;
pub mod control;
pub mod finding;
pub mod report;
pub mod rules;
mod structure;
pub mod validator;

pub use claim::{is_monetary_amount, ClaimRules, PROFESSIONAL_CLAIM};
pub use control::versions_agree;
pub use finding::Finding;
pub use report::ValidationReport;
pub use rules::ContentRules;
pub use validator::{validate, EnvelopeValidator};
