//! # Control Cross-Reference Stage
//!
//! Per span: header field counts, the `GS08`/`ISA12` version agreement, and
//! every trailer's declared count and control-number echo. Spans come from
//! the [`EnvelopeOutline`], so each transaction set, group and interchange is
//! checked on its own even when a document carries several.
//!
//! Any check that needs a trailer skips the span when that trailer was never
//! found, and a trailer's count is not checked when the child header tag is
//! absent from the whole document. The structural stage has already reported
//! both. Groups and sets without a parent are still checked on their own.

use x12_core::{Document, EnvelopeLevel, EnvelopeOutline, FunctionalGroupSpan, Segment, TransactionSetSpan};

use crate::finding::Finding;
use crate::report::ValidationReport;

/// Exact field count of an `ISA` header.
pub const ISA_FIELD_COUNT: usize = 16;

/// Minimum field count of a `GS` header.
pub const GS_MIN_FIELDS: usize = 8;

/// Minimum field count of `ST` and of every trailer.
pub const MIN_FIELDS: usize = 2;

/// Fixed widths of `ISA01` … `ISA16`. `ISA12` is not width-checked because
/// implementations commonly write the full guide identifier there.
const ISA_WIDTHS: [usize; ISA_FIELD_COUNT] = [2, 10, 2, 10, 2, 15, 2, 15, 6, 4, 1, 5, 9, 1, 1, 1];
const ISA_VERSION_INDEX: usize = 11;

/// Run the control cross-reference checks.
pub(crate) fn check(doc: &Document, outline: &EnvelopeOutline, report: &mut ValidationReport) {
    for interchange in &outline.interchanges {
        let Ok(isa) = doc.segment_at(interchange.header) else { continue };
        let isa_version = check_isa(isa, interchange.header, report).and(interchange.version(doc));
        let isa_control = interchange.control_number(doc);

        if let Some(iea) = trailer_of(doc, interchange.trailer) {
            check_trailer(
                report,
                iea,
                TrailerExpectation {
                    unit: "functional group",
                    expected: counted(doc, EnvelopeLevel::FunctionalGroup, interchange.groups.len()),
                    scope: &scope(EnvelopeLevel::Interchange, isa_control),
                    header_field: "ISA13",
                    header_control: isa_control,
                },
            );
        }

        for group in &interchange.groups {
            check_group(doc, group, isa_version, report);
        }
    }

    // Spans whose parent header is absent still get every check that only
    // concerns the span itself.
    for group in &outline.orphan_groups {
        check_group(doc, group, None, report);
    }
    for set in &outline.orphan_sets {
        check_set(doc, set, report);
    }
}

fn check_group(doc: &Document, group: &FunctionalGroupSpan, isa_version: Option<&str>, report: &mut ValidationReport) {
    let Ok(gs) = doc.segment_at(group.header) else { return };
    let gs_control = group.control_number(doc);
    let group_scope = scope(EnvelopeLevel::FunctionalGroup, gs_control);

    if gs.field_count() < GS_MIN_FIELDS {
        report.record(too_short(gs, group.header, GS_MIN_FIELDS));
    } else {
        match (group.version(doc), isa_version) {
            (None, _) => report.record(Finding::InvalidControlSegment {
                detail: format!("GS at position {} carries no version (GS08)", group.header),
            }),
            (Some(found), Some(expected)) if !versions_agree(found, expected) => {
                report.record(Finding::VersionMismatch {
                    found: found.to_string(),
                    expected: expected.to_string(),
                    scope: group_scope.clone(),
                })
            }
            _ => {}
        }
    }

    if let Some(ge) = trailer_of(doc, group.trailer) {
        check_trailer(
            report,
            ge,
            TrailerExpectation {
                unit: "transaction set",
                expected: counted(doc, EnvelopeLevel::TransactionSet, group.sets.len()),
                scope: &group_scope,
                header_field: "GS06",
                header_control: gs_control,
            },
        );
    }

    for set in &group.sets {
        check_set(doc, set, report);
    }
}

fn check_set(doc: &Document, set: &TransactionSetSpan, report: &mut ValidationReport) {
    let Ok(st) = doc.segment_at(set.header) else { return };
    if st.field_count() < MIN_FIELDS {
        report.record(too_short(st, set.header, MIN_FIELDS));
    }
    if set.type_code(doc).is_none() {
        report.record(Finding::InvalidControlSegment {
            detail: format!("ST at position {} carries no transaction set type (ST01)", set.header),
        });
    }

    let st_control = set.control_number(doc);
    if let Some(se) = trailer_of(doc, set.trailer) {
        check_trailer(
            report,
            se,
            TrailerExpectation {
                unit: "segment",
                expected: Some(set.segment_count()),
                scope: &scope(EnvelopeLevel::TransactionSet, st_control),
                header_field: "ST02",
                header_control: st_control,
            },
        );
    }
}

fn trailer_of(doc: &Document, position: Option<usize>) -> Option<(usize, &Segment)> {
    position.and_then(|p| doc.segment_at(p).ok().map(|s| (p, s)))
}

/// The number of child spans a trailer should declare. `None` when the
/// child header tag never appears in the document: the count would only
/// restate its `Missing Control Segment` error.
fn counted(doc: &Document, child: EnvelopeLevel, found: usize) -> Option<usize> {
    doc.contains(child.header_tag()).then_some(found)
}

/// Field-count and width checks on an `ISA`. Returns `Some(())` when the
/// header is shaped well enough to read its version.
fn check_isa(isa: &Segment, position: usize, report: &mut ValidationReport) -> Option<()> {
    if isa.field_count() != ISA_FIELD_COUNT {
        report.record(Finding::InvalidControlSegment {
            detail: format!(
                "ISA at position {position} has {} fields, expected exactly {ISA_FIELD_COUNT}",
                isa.field_count()
            ),
        });
        return None;
    }
    for (index, (value, width)) in isa.fields().iter().zip(ISA_WIDTHS).enumerate() {
        let actual = value.chars().count();
        if index != ISA_VERSION_INDEX && actual != width {
            report.record(Finding::FieldWidth {
                field: format!("ISA{:02}", index + 1),
                expected: width,
                actual,
            });
        }
    }
    if isa.field(ISA_VERSION_INDEX).map_or(true, |v| v.trim().is_empty()) {
        report.record(Finding::InvalidControlSegment {
            detail: format!("ISA at position {position} carries no version (ISA12)"),
        });
    }
    Some(())
}

/// Whether a group's `GS08` agrees with the interchange's `ISA12` on the
/// major version (the part before the guide identifier's `X`).
///
/// `ISA12` often holds the five-character interchange version (`00501`)
/// while `GS08` holds the six-character release (`005010`), so a group
/// version that extends the interchange version also agrees.
pub fn versions_agree(group_version: &str, interchange_version: &str) -> bool {
    let group = major(group_version);
    let interchange = major(interchange_version);
    !interchange.is_empty() && group.starts_with(interchange)
}

fn major(version: &str) -> &str {
    version.split('X').next().unwrap_or_default().trim()
}

struct TrailerExpectation<'a> {
    unit: &'static str,
    expected: Option<usize>,
    scope: &'a str,
    header_field: &'static str,
    header_control: Option<&'a str>,
}

fn check_trailer(report: &mut ValidationReport, (position, trailer): (usize, &Segment), want: TrailerExpectation<'_>) {
    let tag = trailer_tag(trailer);
    if trailer.field_count() < MIN_FIELDS {
        report.record(too_short(trailer, position, MIN_FIELDS));
    }

    match trailer.field(0).map(str::trim).filter(|v| !v.is_empty()) {
        None => report.record(Finding::InvalidControlSegment {
            detail: format!("{tag} at position {position} carries no count ({tag}01)"),
        }),
        Some(raw) => match raw.parse::<usize>() {
            Err(_) => report.record(Finding::InvalidControlSegment {
                detail: format!("{tag}01 at position {position} is not a count: {raw:?}"),
            }),
            Ok(actual) => {
                if let Some(expected) = want.expected.filter(|&expected| expected != actual) {
                    report.record(Finding::CountMismatch {
                        trailer: tag,
                        unit: want.unit,
                        expected,
                        actual,
                        scope: want.scope.to_string(),
                    });
                }
            }
        },
    }

    let echoed = trailer.field(1).map(str::trim).filter(|v| !v.is_empty());
    if let (Some(echoed), Some(header)) = (echoed, want.header_control) {
        if !control_numbers_match(echoed, header) {
            report.record(Finding::ControlNumberMismatch {
                trailer_field: trailer_field_02(tag),
                trailer_value: echoed.to_string(),
                header_field: want.header_field,
                header_value: header.to_string(),
            });
        }
    }
}

/// Control numbers compare numerically when both parse, so `000000001`
/// echoes `1`.
fn control_numbers_match(a: &str, b: &str) -> bool {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

fn trailer_tag(trailer: &Segment) -> &'static str {
    EnvelopeLevel::from_trailer(trailer.tag())
        .map(EnvelopeLevel::trailer_tag)
        .unwrap_or("trailer")
}

fn trailer_field_02(tag: &'static str) -> &'static str {
    match tag {
        "SE" => "SE02",
        "GE" => "GE02",
        _ => "IEA02",
    }
}

fn too_short(segment: &Segment, position: usize, min: usize) -> Finding {
    Finding::InvalidControlSegment {
        detail: format!(
            "{} at position {position} has {} fields, expected at least {min}",
            segment.tag(),
            segment.field_count()
        ),
    }
}

fn scope(level: EnvelopeLevel, control: Option<&str>) -> String {
    match control {
        Some(control) => format!("{level} {control}"),
        None => level.to_string(),
    }
}
