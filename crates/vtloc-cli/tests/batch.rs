//! Integration tests for batch input and outcome summaries.

use vtloc_catalog::load_embedded;
use vtloc_cli::batch::read_rows;
use vtloc_cli::summary::outcome_headline;
use vtloc_engine::analyze_draft;
use vtloc_model::{BbbPattern, Lead, Polarity, TransitionPoint};

const HEADER: &str = "case_id,patient_id,I,II,III,aVR,aVL,aVF,V1,V2,V3,V4,V5,V6,qrs_duration_ms,bbb_pattern,transition_point,mdi";

fn csv(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

#[test]
fn parses_complete_row() {
    let input = csv(&["vt-1,MRN-9,+,+,+,-,+,+,-,-,+,+,+,+,140,none,V4,0.4"]);
    let rows = read_rows(input.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.case_id, "vt-1");
    assert_eq!(row.line, 2);
    let draft = row.draft.as_ref().unwrap();
    assert!(draft.completeness().is_complete);
    assert_eq!(draft.leads[&Lead::AVR].polarity(), Polarity::Negative);
    assert_eq!(draft.bbb_pattern, Some(BbbPattern::None));
    assert_eq!(draft.transition_point, Some(TransitionPoint::V4));
    assert_eq!(draft.patient_id.as_deref(), Some("MRN-9"));
    assert_eq!(
        draft.measurements.and_then(|m| m.max_deflection_index),
        Some(0.4)
    );
}

#[test]
fn empty_cells_leave_fields_missing() {
    let input = csv(&[",,+,+,+,-,+,,-,-,+,+,+,+,140,,,"]);
    let rows = read_rows(input.as_bytes()).unwrap();
    let row = &rows[0];
    assert_eq!(row.case_id, "row-1");

    let missing = row.draft.as_ref().unwrap().missing_fields();
    assert_eq!(missing, ["Lead aVF", "Bundle Branch Block Pattern"]);
}

#[test]
fn bad_cell_fails_only_its_row() {
    let input = csv(&[
        "a,,+,+,+,-,+,+,-,-,+,+,+,+,140,none,,",
        "b,,+,+,+,-,+,+,-,-,+,+,+,+,wide,none,,",
        "c,,+,+,+,-,+,+,sideways,-,+,+,+,+,140,none,,",
    ]);
    let rows = read_rows(input.as_bytes()).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].draft.is_ok());
    assert_eq!(rows[1].draft.as_ref().unwrap_err(), "Invalid QRS duration: wide");
    assert_eq!(rows[2].draft.as_ref().unwrap_err(), "Unknown polarity: sideways");
}

#[test]
fn undecodable_record_fails_only_its_row() {
    let mut input = csv(&["a,,+,+,+,-,+,+,-,-,+,+,+,+,140,none,,"]).into_bytes();
    input.extend_from_slice(b"b,,+,+,+,-,+,+,-,-,+,+,+,+,140,none,,\xff\n");
    input.extend_from_slice(b"c,,+,+,+,-,+,+,-,-,+,+,+,+,140,none,,\n");

    let rows = read_rows(input.as_slice()).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].draft.is_ok());
    assert_eq!(rows[1].case_id, "row-2");
    assert_eq!(rows[1].line, 3);
    assert!(rows[1].draft.as_ref().unwrap_err().starts_with("Unreadable row"));
    assert_eq!(rows[2].case_id, "c");
    assert!(rows[2].draft.is_ok());
}

#[test]
fn headlines_describe_each_outcome() {
    let (catalog, _) = load_embedded().unwrap();
    let input = csv(&[
        "narrow,,+,+,+,-,+,+,-,-,+,+,+,+,90,none,,",
        "wide,,+,+,+,-,+,+,+,+,+,+,+,+,140,none,,",
    ]);
    let rows = read_rows(input.as_bytes()).unwrap();
    let headlines: Vec<String> = rows
        .into_iter()
        .map(|row| outcome_headline(&analyze_draft(row.draft.unwrap(), &catalog).unwrap()))
        .collect();

    insta::assert_snapshot!(
        headlines[0].as_str(),
        @"Screening failed: QRS 90 ms is below the 120 ms threshold"
    );
    insta::assert_snapshot!(
        headlines[1].as_str(),
        @"Localized: Para-Hisian (moderate confidence, score 42)"
    );
}
