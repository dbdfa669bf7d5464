//! Structural stage: required control tags, document bounds, and nesting.

use x12_core::{Document, EnvelopeOutline, NestingIssue, REQUIRED_CONTROL_TAGS};

use crate::finding::Finding;
use crate::report::ValidationReport;

/// Run the structural checks on a non-empty document.
pub(crate) fn check(doc: &Document, outline: &EnvelopeOutline, report: &mut ValidationReport) {
    for tag in REQUIRED_CONTROL_TAGS {
        if !doc.contains(tag) {
            report.record(Finding::MissingControlSegment { tag });
        }
    }

    let first = doc.segments().first().map(|s| s.tag());
    if doc.contains("ISA") && first != Some("ISA") {
        report.record(Finding::OutOfNestingOrder {
            detail: format!("document must begin with ISA, found {}", first.unwrap_or_default()),
        });
    }
    let last = doc.segments().last().map(|s| s.tag());
    if doc.contains("IEA") && last != Some("IEA") {
        report.record(Finding::OutOfNestingOrder {
            detail: format!("document must end with IEA, found {}", last.unwrap_or_default()),
        });
    }

    for issue in &outline.issues {
        if !explained_by_missing_tag(issue, doc) {
            report.record(Finding::OutOfNestingOrder {
                detail: issue.to_string(),
            });
        }
    }
}

/// Nesting issues that follow directly from an absent control tag are
/// already covered by its `Missing Control Segment` error.
fn explained_by_missing_tag(issue: &NestingIssue, doc: &Document) -> bool {
    issue.explained_by().is_some_and(|tag| !doc.contains(tag))
}
