//! # Envelope Scenarios
//!
//! End-to-end behaviour across tokenizer, builder and validator on
//! hand-written and generated documents.

use std::ops::Range;

use chrono::NaiveDate;
use x12_core::{tokenize, Document, EnvelopeOutline};
use x12_envelope::{BuildError, EnvelopeBuilder};
use x12_validate::{validate, EnvelopeValidator};

const ISA: &str = "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230701*1200*^*00501*000000001*0*P*:";

fn scenario_a() -> String {
    format!(
        "{ISA}~GS*HC*S*R*20230701*1200*1*X*005010~ST*837*0001~BHT*0019*00*0123*20230701*1200*CH~SE*3*0001~GE*1*1~IEA*1*000000001~"
    )
}

// ---------------------------------------------------------------------------
// Validation scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_consistent_counts_pass() {
    let report = validate(&scenario_a());
    assert!(report.passed, "{:?}", report.errors);
    assert!(report.errors.is_empty());
}

#[test]
fn scenario_b_se_undercount_is_one_count_mismatch() {
    let raw = scenario_a().replace("SE*3*0001", "SE*2*0001");
    let report = validate(&raw);
    assert!(!report.passed);
    let mismatches: Vec<_> = report.errors_of_kind("Count Mismatch").collect();
    assert_eq!(mismatches.len(), 1, "{:?}", report.errors);
    assert!(mismatches[0].contains("expected 3"));
    assert!(mismatches[0].contains("actual 2"));
}

#[test]
fn scenario_d_missing_group_trailer() {
    let raw = scenario_a().replace("GE*1*1~", "");
    let report = validate(&raw);
    assert!(!report.passed);
    assert_eq!(report.errors, ["Missing Control Segment: GE"]);
}

#[test]
fn missing_group_header_still_counts_the_set() {
    let raw = format!("{ISA}~ST*837*0001~BHT*0019~SE*9*0001~GE*1*1~IEA*1*000000001~");
    assert_eq!(
        validate(&raw).errors,
        [
            "Missing Control Segment: GS",
            "Count Mismatch: SE segment count expected 3, actual 9 (transaction set 0001)",
        ]
    );

    let report = EnvelopeValidator::with_bundled_rules().validate(&raw);
    assert_eq!(
        report.errors_of_kind("Content Rule Violation").collect::<Vec<_>>(),
        [
            "Content Rule Violation: 837 claim is missing required segment NM1 (positions 1..4)",
            "Content Rule Violation: 837 claim is missing required segment CLM (positions 1..4)",
        ]
    );
}

#[test]
fn missing_interchange_header_still_checks_groups_and_sets() {
    let raw = "GS*HC*S*R*20230701*1200*1*X*005010~ST*837*0001~BHT*0019~SE*9*0001~GE*1*1~IEA*1*000000001~";
    assert_eq!(
        validate(raw).errors,
        [
            "Missing Control Segment: ISA",
            "Count Mismatch: SE segment count expected 3, actual 9 (transaction set 0001)",
        ]
    );

    let report = EnvelopeValidator::with_bundled_rules().validate(raw);
    assert_eq!(report.errors_of_kind("Content Rule Violation").count(), 2);
}

#[test]
fn missing_set_header_is_the_only_error() {
    let raw = format!("{ISA}~GS*HC*S*R*20230701*1200*1*X*005010~BHT*0019~SE*3*0001~GE*1*1~IEA*1*000000001~");
    let report = validate(&raw);
    assert!(!report.passed);
    assert_eq!(report.errors, ["Missing Control Segment: ST"]);
}

#[test]
fn terminator_only_input_fails_without_panicking() {
    let report = validate("~");
    assert!(!report.passed);
    assert!(!report.errors.is_empty());
    assert!(tokenize("~").is_empty());
}

#[test]
fn every_missing_tag_is_listed() {
    let report = validate("BHT*0019~NM1*41~");
    for tag in ["ISA", "GS", "ST", "SE", "GE", "IEA"] {
        assert!(
            report.errors.contains(&format!("Missing Control Segment: {tag}")),
            "{tag} not reported: {:?}",
            report.errors
        );
    }
}

#[test]
fn multiple_sets_are_validated_independently() {
    let raw = format!(
        "{ISA}~GS*HC*S*R*20230701*1200*1*X*005010~\
         ST*837*0001~BHT~SE*3*0001~\
         ST*837*0002~BHT~NM1*41~SE*3*0002~\
         GE*2*1~IEA*1*000000001~"
    );
    let report = validate(&raw);
    assert_eq!(
        report.errors,
        ["Count Mismatch: SE segment count expected 4, actual 3 (transaction set 0002)"]
    );
}

#[test]
fn registered_rules_run_per_set_and_unregistered_types_warn() {
    let mut validator = EnvelopeValidator::new();
    validator.register_content_rules("270", |doc: &Document, range: Range<usize>| {
        if doc.occurrences_within("EQ", range).is_empty() {
            vec!["eligibility inquiry needs an EQ segment".to_string()]
        } else {
            Vec::new()
        }
    });
    let raw = format!(
        "{ISA}~GS*HS*S*R*20230701*1200*1*X*005010~\
         ST*270*0001~BHT~SE*3*0001~\
         ST*276*0002~BHT~SE*3*0002~\
         GE*2*1~IEA*1*000000001~"
    );
    let report = validator.validate(&raw);
    assert_eq!(report.errors, ["eligibility inquiry needs an EQ segment"]);
    assert_eq!(
        report.warnings,
        ["Unregistered Content: no content rules registered for transaction set type 276"]
    );
}

#[test]
fn bundled_claim_rules_reject_bad_amounts() {
    let raw = format!(
        "{ISA}~GS*HC*S*R*20230701*1200*1*X*005010~ST*837*0001~BHT*0019~NM1*41*2*ACME~\
         CLM*P1*100.00***11:B:1~SV1*HC:99213*75.5~SE*6*0001~GE*1*1~IEA*1*000000001~"
    );
    let report = EnvelopeValidator::with_bundled_rules().validate(&raw);
    assert_eq!(
        report.errors,
        ["Content Rule Violation: SV102 at position 6 is not a monetary amount: \"75.5\""]
    );
}

// ---------------------------------------------------------------------------
// Builder scenarios
// ---------------------------------------------------------------------------

fn fixed_builder(version: &str, code: &str) -> EnvelopeBuilder {
    let clock = NaiveDate::from_ymd_opt(2023, 7, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    let mut b = EnvelopeBuilder::new(version).with_timestamp(clock);
    b.set_transaction_set_type(code);
    b
}

#[test]
fn scenario_c_builder_output_has_one_counted_set() {
    let mut b = fixed_builder("005010X222A1", "837");
    b.open_interchange("SENDER", "RECEIVER").unwrap();
    b.open_functional_group("HC", "SENDER", "RECEIVER").unwrap();
    b.open_transaction_set().unwrap();
    b.add_segment("CLM", ["PATIENT1", "100.00", "", "", "11:B:1"]);
    b.close_transaction_set().unwrap();
    b.close_functional_group().unwrap();
    b.close_interchange().unwrap();

    let raw = b.build().unwrap();
    let doc = tokenize(&raw);
    assert_eq!(doc.occurrences("ST").len(), 1);
    assert_eq!(doc.occurrences("SE").len(), 1);

    let (st, se) = (doc.occurrences("ST")[0], doc.occurrences("SE")[0]);
    let declared: usize = doc.segment_at(se).unwrap().field(0).unwrap().parse().unwrap();
    assert_eq!(declared, se - st + 1);

    assert!(validate(&raw).passed);
}

#[test]
fn builder_output_round_trips_through_the_outline() {
    let mut b = fixed_builder("005010X279A1", "270");
    b.open_interchange("SUBMITTER", "PAYER").unwrap();
    for _ in 0..2 {
        b.open_functional_group("HS", "SUBMITTER", "PAYER").unwrap();
        b.open_transaction_set().unwrap();
        b.add_segment("BHT", ["0022", "13"]);
        b.add_segment("EQ", ["30"]);
        b.close_transaction_set().unwrap();
        b.close_functional_group().unwrap();
    }
    b.close_interchange().unwrap();

    let doc = tokenize(&b.build().unwrap());
    assert_eq!(doc.segments(), b.segments());

    let outline = EnvelopeOutline::of(&doc);
    assert!(outline.is_well_nested());
    assert_eq!(outline.groups().count(), 2);
    let controls: Vec<_> = outline.groups().filter_map(|g| g.control_number(&doc)).collect();
    assert_eq!(controls, ["1", "2"]);
    let sets: Vec<_> = outline
        .transaction_sets()
        .filter_map(|s| s.control_number(&doc))
        .collect();
    assert_eq!(sets, ["0001", "0002"]);
}

#[test]
fn incomplete_builder_refuses_to_build() {
    let mut b = fixed_builder("005010X222A1", "837");
    b.open_interchange("S", "R").unwrap();
    b.open_functional_group("HC", "S", "R").unwrap();
    assert_eq!(
        b.build(),
        Err(BuildError::IncompleteEnvelope {
            missing: vec!["ST", "SE", "GE", "IEA"]
        })
    );
}

#[test]
fn builder_refuses_fields_that_would_split_on_the_wire() {
    let mut b = fixed_builder("005010X222A1", "837");
    b.open_interchange("SENDER", "RECEIVER").unwrap();
    b.open_functional_group("HC", "SENDER", "RECEIVER").unwrap();
    b.open_transaction_set().unwrap();
    b.add_segment("NM1", ["A*B", "C~D"]);
    b.close_transaction_set().unwrap();
    b.close_functional_group().unwrap();
    b.close_interchange().unwrap();

    assert!(matches!(
        b.build(),
        Err(BuildError::DelimiterInContent { delimiter: '*', .. })
    ));
}
