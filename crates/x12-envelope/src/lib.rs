//! # x12-envelope — Envelope Assembly
//!
//! Builds complete `ISA`/`GS`/`ST` envelopes around caller-supplied content.
//! The [`EnvelopeBuilder`] owns its control counters and derives every
//! trailer count from the segments actually appended, so a document built
//! through the open/close helpers always passes the count cross-checks in
//! `x12-validate`.
//!
//! ## Crate Policy
//!
//! - Depends only on `x12-core` within the workspace.
//! - Fail fast: `build()` returns a [`BuildError`] rather than emitting a
//!   partially valid document.
//! - No process-wide state. Two builders never share counters.

pub mod builder;
pub mod control;
pub mod error;

pub use builder::{EnvelopeBuilder, UsageIndicator, ISA_ID_WIDTH};
pub use control::{format_control_number, ControlNumbers, MAX_CONTROL_NUMBER};
pub use error::BuildError;
