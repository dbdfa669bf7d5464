//! # x12-core — Foundational Types for the Envelope Engine
//!
//! This crate is the leaf of the workspace. It owns the data model every other
//! crate reads: segments, delimiters, the tokenizer, the ordered document
//! index, and the envelope outline that reconstructs the three-level
//! `ISA`/`GS`/`ST` nesting from a flat segment stream.
//!
//! ## Key Design Principles
//!
//! 1. **Order is the primary store.** A [`Document`] keeps segments in their
//!    source top-to-bottom order. The tag → positions index is derived from
//!    that sequence in a single pass and never replaces it.
//!
//! 2. **Positions, not buckets.** Every lookup returns positions into the
//!    sequence, so a collaborator can tell which `NM1` belongs to which
//!    transaction set.
//!
//! 3. **The tokenizer is lenient; validation is elsewhere.** Tokenizing never
//!    inspects tag names or field counts. Structural judgement belongs to
//!    `x12-validate`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `x12-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod delimiters;
pub mod document;
pub mod envelope;
pub mod error;
pub mod segment;
pub mod tokenizer;

pub use delimiters::Delimiters;
pub use document::Document;
pub use envelope::{
    EnvelopeLevel, EnvelopeOutline, FunctionalGroupSpan, InterchangeSpan, NestingIssue,
    TransactionSetSpan, REQUIRED_CONTROL_TAGS,
};
pub use error::CoreError;
pub use segment::Segment;
pub use tokenizer::{parse, tokenize, Tokenizer};
