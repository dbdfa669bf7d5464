//! # x12-cli — Command-Line Front End
//!
//! Provides the `x12` binary over the envelope engine.
//!
//! ## Subcommands
//!
//! - `x12 validate` — validate documents, optionally with the bundled 837
//!   claim rules; exit status `1` when any document fails.
//! - `x12 inspect` — print the envelope outline of a document.
//! - `x12 generate` — build an envelope from a YAML composition file.
//!
//! ```bash
//! x12 validate --claim-rules claims/*.x12
//! x12 -vv inspect --json claim.x12
//! x12 --config x12.yaml generate --spec claim.yaml --output claim.x12
//! ```

pub mod config;
pub mod generate;
pub mod inspect;
pub mod validate;
