//! # Envelope Validator
//!
//! A four-stage, collect-all pipeline:
//!
//! 1. **Structural**: non-empty input, the six control tags, `ISA` first and
//!    `IEA` last, and clean nesting.
//! 2. **Control cross-reference**: header shapes, version agreement, trailer
//!    counts and control-number echoes, per span.
//! 3. **Transaction content**: registered rules per transaction-set type.
//! 4. **Finalize**: `passed` iff no errors were recorded.
//!
//! No stage stops the pipeline. A check that needs a segment which is
//! missing or unclosed is skipped, never reported a second time.

use std::collections::BTreeSet;

use x12_core::{Delimiters, EnvelopeOutline, Tokenizer};

use crate::claim::{ClaimRules, PROFESSIONAL_CLAIM};
use crate::finding::Finding;
use crate::report::ValidationReport;
use crate::rules::{ContentRules, RuleRegistry};
use crate::{control, structure};

/// Validator holding the content-rule registry and tokenizing policy.
///
/// A validator holds no per-call state; one value may validate any number of
/// documents, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeValidator {
    rules: RuleRegistry,
    delimiters: Option<Delimiters>,
}

impl EnvelopeValidator {
    /// A validator with no content rules. Delimiters are read from each
    /// document's `ISA` header, falling back to the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator with the bundled professional-claim (`837`) rules.
    pub fn with_bundled_rules() -> Self {
        let mut validator = Self::new();
        validator.register_content_rules(PROFESSIONAL_CLAIM, ClaimRules);
        validator
    }

    /// Always tokenize with `delimiters` instead of reading them from the
    /// input.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = Some(delimiters);
        self
    }

    /// Register content rules for a transaction-set type code, replacing any
    /// earlier registration for the same code.
    pub fn register_content_rules(
        &mut self,
        code: impl Into<String>,
        rules: impl ContentRules + 'static,
    ) -> &mut Self {
        self.rules.register(code, rules);
        self
    }

    /// Validate one raw document.
    pub fn validate(&self, raw: &str) -> ValidationReport {
        let mut report = ValidationReport::ok();
        let tokenizer = match self.delimiters {
            Some(delimiters) => Tokenizer::new(delimiters),
            None => Tokenizer::sniffing(raw),
        };
        let doc = match tokenizer.parse(raw) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(error = %e, "nothing to validate");
                report.record(Finding::MalformedInput {
                    detail: "document contains no segments".to_string(),
                });
                report.finalize();
                return report;
            }
        };
        let outline = EnvelopeOutline::of(&doc);

        structure::check(&doc, &outline, &mut report);
        tracing::debug!(errors = report.errors.len(), "structural stage complete");

        control::check(&doc, &outline, &mut report);
        tracing::debug!(errors = report.errors.len(), "control stage complete");

        let mut unregistered = BTreeSet::new();
        for set in outline.transaction_sets() {
            // A set without a type code was reported by the control stage.
            let Some(code) = set.type_code(&doc) else { continue };
            match self.rules.get(code) {
                Some(rules) => {
                    for message in rules.check(&doc, set.range()) {
                        report.record(Finding::ContentRuleViolation(message));
                    }
                }
                None => {
                    if unregistered.insert(code) {
                        tracing::warn!(code = %code, "no content rules registered");
                        report.record(Finding::UnregisteredContent {
                            code: code.to_string(),
                        });
                    }
                }
            }
        }
        tracing::debug!(errors = report.errors.len(), "content stage complete");

        report.finalize();
        report
    }
}

/// Validate `raw` with no content rules registered.
pub fn validate(raw: &str) -> ValidationReport {
    EnvelopeValidator::new().validate(raw)
}
