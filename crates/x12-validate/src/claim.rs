//! # Professional Claim Rules (837)
//!
//! The bundled reference rule set. It checks one `837` transaction set:
//!
//! - `BHT`, `NM1` and `CLM` must each appear inside the set.
//! - Every `CLM` must carry at least five fields.
//! - Monetary amounts must be plain decimals, `digits[.digits{2}]`:
//!   `CLM02`, `SV102`, `SV203`, `SV302` and `AMT02`.
//!
//! Only segments inside the set's range are inspected, so two claims in two
//! sets are judged independently.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use x12_core::Document;

use crate::rules::ContentRules;

/// Transaction-set type code these rules apply to.
pub const PROFESSIONAL_CLAIM: &str = "837";

static MONETARY_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d{2})?$").unwrap());

const REQUIRED_SEGMENTS: [&str; 3] = ["BHT", "NM1", "CLM"];

const CLM_MIN_FIELDS: usize = 5;

struct MonetaryField {
    tag: &'static str,
    index: usize,
    reference: &'static str,
    required: bool,
}

const MONETARY_FIELDS: [MonetaryField; 5] = [
    MonetaryField { tag: "CLM", index: 1, reference: "CLM02", required: true },
    MonetaryField { tag: "SV1", index: 1, reference: "SV102", required: false },
    MonetaryField { tag: "SV2", index: 2, reference: "SV203", required: false },
    MonetaryField { tag: "SV3", index: 1, reference: "SV302", required: false },
    MonetaryField { tag: "AMT", index: 1, reference: "AMT02", required: false },
];

/// Whether `value` is a well-formed monetary amount.
pub fn is_monetary_amount(value: &str) -> bool {
    MONETARY_AMOUNT.is_match(value)
}

/// Content rules for professional claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimRules;

impl ContentRules for ClaimRules {
    fn check(&self, doc: &Document, range: Range<usize>) -> Vec<String> {
        let mut violations = Vec::new();

        for tag in REQUIRED_SEGMENTS {
            if doc.occurrences_within(tag, range.clone()).is_empty() {
                violations.push(format!(
                    "Content Rule Violation: 837 claim is missing required segment {tag} (positions {}..{})",
                    range.start, range.end
                ));
            }
        }

        for &position in doc.occurrences_within("CLM", range.clone()) {
            let Ok(clm) = doc.segment_at(position) else { continue };
            if clm.field_count() < CLM_MIN_FIELDS {
                violations.push(format!(
                    "Content Rule Violation: CLM at position {position} has {} fields, expected at least {CLM_MIN_FIELDS}",
                    clm.field_count()
                ));
            }
        }

        for field in &MONETARY_FIELDS {
            for &position in doc.occurrences_within(field.tag, range.clone()) {
                let Ok(segment) = doc.segment_at(position) else { continue };
                let value = segment.field(field.index).map(str::trim).unwrap_or_default();
                if value.is_empty() && !field.required {
                    continue;
                }
                if !is_monetary_amount(value) {
                    violations.push(format!(
                        "Content Rule Violation: {} at position {position} is not a monetary amount: {value:?}",
                        field.reference
                    ));
                }
            }
        }

        violations
    }
}
