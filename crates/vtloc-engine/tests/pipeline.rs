use vtloc_catalog::{SiteCatalog, load_embedded};
use vtloc_engine::{AnalysisError, analyze, analyze_draft};
use vtloc_model::{
    AnalysisOutcome, BbbPattern, ConfidenceLevel, HorizontalAxis, Lead, Observation,
    ObservationDraft, OutcomeKind, Polarity, Quadrant, TransitionPoint, VerticalAxis,
};

fn bundled() -> SiteCatalog {
    load_embedded().expect("embedded catalog").0
}

fn observation(
    overrides: &[(Lead, Polarity)],
    qrs_duration_ms: f64,
    bbb: BbbPattern,
) -> Observation {
    let mut leads = [Polarity::Positive; Lead::COUNT];
    for &(lead, polarity) in overrides {
        leads[lead.index()] = polarity;
    }
    Observation::new(leads, qrs_duration_ms, bbb).unwrap()
}

const TIE_CATALOG: &str = r#"
[catalog]
schema = "vtloc.site-catalog"
schema_version = 1
version = "tie-test"

[[sites]]
id = "beta"
name = "Beta Site"
region = "Other"
quadrant = "rightUpper"
description = "listed first"

[sites.typical]
vertical_axis = "inferior"
horizontal_axis = "leftward"
bbb_pattern = "none"

[sites.clinical]
ablation_approach = "endocardial"

[[sites.rule.high_confidence]]
criterion = "I = positive"
weight = 3

[[sites.rule.supporting]]
criterion = "V1 = negative"
weight = 2

[[sites]]
id = "alpha"
name = "Alpha Site"
region = "Other"
quadrant = "rightUpper"
description = "listed second"

[sites.typical]
vertical_axis = "inferior"
horizontal_axis = "leftward"
bbb_pattern = "none"

[sites.clinical]
ablation_approach = "both"
success_rate = "50%"

[[sites.rule.high_confidence]]
criterion = "II = positive"
weight = 6

[[sites.rule.supporting]]
criterion = "aVR = positive"
weight = 4
"#;

const LEFT_LOWER_ONLY: &str = r#"
[catalog]
schema = "vtloc.site-catalog"
schema_version = 1
version = "sparse-test"

[[sites]]
id = "lonely"
name = "Lonely Site"
region = "Other"
quadrant = "leftLower"
description = "the only site"

[sites.typical]
vertical_axis = "superior"
horizontal_axis = "rightward"
bbb_pattern = "RBBB"

[sites.clinical]
ablation_approach = "endocardial"

[[sites.rule.high_confidence]]
criterion = "I = negative"
weight = 5
"#;

#[test]
fn narrow_complex_fails_screening() {
    let catalog = bundled();
    let outcome = analyze(&observation(&[], 80.0, BbbPattern::None), &catalog).unwrap();

    assert_eq!(outcome.kind(), OutcomeKind::ScreeningFailed);
    assert!(outcome.result().is_none());
    assert!(outcome.primary_site().is_none());
    assert_eq!(outcome.screening().qrs_duration_ms, 80.0);
    assert!(!outcome.screening().meets_threshold);
    assert_eq!(outcome.overall_confidence(), ConfidenceLevel::Low);
}

#[test]
fn inferior_leftward_pattern_stays_in_its_quadrant() {
    let catalog = bundled();
    let obs = observation(&[(Lead::AVR, Polarity::Negative)], 140.0, BbbPattern::None);
    let outcome = analyze(&obs, &catalog).unwrap();
    let result = outcome.result().expect("analysis ran");

    assert_eq!(result.vertical_axis.axis, VerticalAxis::Inferior);
    assert!(!result.vertical_axis.has_discordance);
    assert_eq!(result.horizontal_axis.axis, HorizontalAxis::Leftward);
    assert!(!result.horizontal_axis.low_confidence);

    let expected = catalog
        .policy()
        .quadrants
        .quadrant(VerticalAxis::Inferior, HorizontalAxis::Leftward);
    assert_eq!(result.quadrant.quadrant, expected);
    assert!(result.quadrant.adjacent_quadrants.is_empty());

    assert_eq!(outcome.kind(), OutcomeKind::Localized);
    for prediction in result.predictions() {
        assert_eq!(prediction.quadrant, expected, "{}", prediction.site);
        assert!(!prediction.from_adjacent_quadrant);
        assert!(prediction.clinical_implications.is_some());
    }

    let primary = result.primary_site.as_ref().unwrap();
    assert_eq!(primary.site, "Para-Hisian");
    assert_eq!(primary.confidence_score, 42);
    assert_eq!(primary.confidence, ConfidenceLevel::Moderate);
    assert_eq!(result.overall_confidence, ConfidenceLevel::Moderate);
    assert_eq!(result.differential_diagnoses.len(), 1);
    assert_eq!(result.differential_diagnoses[0].site, "Right Coronary Cusp (RCC)");
    assert_eq!(result.differential_diagnoses[0].confidence_score, 39);

    let excluded: Vec<&str> = result.excluded_sites.iter().map(|e| e.site.as_str()).collect();
    assert_eq!(excluded, ["Posterior RVOT", "Superior Tricuspid Annulus"]);
}

#[test]
fn equal_scores_rank_by_name() {
    let catalog = SiteCatalog::from_toml_str_partial(TIE_CATALOG).unwrap();
    let obs = observation(&[(Lead::AVR, Polarity::Negative)], 140.0, BbbPattern::None);
    let outcome = analyze(&obs, &catalog).unwrap();
    let result = outcome.result().unwrap();

    let ranked: Vec<(&str, u8)> = result
        .predictions()
        .map(|p| (p.site.as_str(), p.confidence_score))
        .collect();
    assert_eq!(ranked, [("Alpha Site", 60), ("Beta Site", 60)]);

    let alpha = result.primary_site.as_ref().unwrap();
    let implications = alpha.clinical_implications.as_ref().unwrap();
    assert_eq!(implications.success_rate_expectation.as_deref(), Some("50%"));
}

#[test]
fn empty_quadrant_yields_no_candidates() {
    let catalog = SiteCatalog::from_toml_str_partial(LEFT_LOWER_ONLY).unwrap();
    let obs = observation(&[], 140.0, BbbPattern::None);
    let outcome = analyze(&obs, &catalog).unwrap();

    assert_eq!(outcome.kind(), OutcomeKind::NoCandidateSites);
    let AnalysisOutcome::NoCandidateSites { result } = &outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert_eq!(result.quadrant.quadrant, Quadrant::RightUpper);
    assert!(result.quadrant.possible_sites.is_empty());
    assert!(result.primary_site.is_none());
    assert!(result.differential_diagnoses.is_empty());
    assert_eq!(result.overall_confidence, ConfidenceLevel::Low);
}

#[test]
fn exclusion_removes_matching_site() {
    let catalog = bundled();
    let obs = observation(
        &[(Lead::AVL, Polarity::Negative), (Lead::V1, Polarity::Negative)],
        150.0,
        BbbPattern::Lbbb,
    )
    .with_transition_point(Some(TransitionPoint::V2));
    let result = analyze(&obs, &catalog).unwrap().result().cloned().unwrap();

    let vetoed = result
        .excluded_sites
        .iter()
        .find(|e| e.site == "Posterior RVOT")
        .expect("posterior RVOT excluded");
    assert!(vetoed.reason.starts_with("Exclusion: "), "{}", vetoed.reason);
    assert!(result.predictions().all(|p| p.site != "Posterior RVOT"));
}

#[test]
fn vertical_discordance_pulls_in_boundary_sites() {
    let catalog = bundled();
    let obs = observation(
        &[(Lead::III, Polarity::Negative), (Lead::I, Polarity::Negative)],
        130.0,
        BbbPattern::Rbbb,
    );
    let result = analyze(&obs, &catalog).unwrap().result().cloned().unwrap();

    assert!(result.vertical_axis.has_discordance);
    assert_eq!(result.quadrant.quadrant, Quadrant::LeftUpper);
    assert_eq!(result.quadrant.adjacent_quadrants, [Quadrant::LeftLower]);

    let fascicle = result
        .predictions()
        .find(|p| p.site == "Left Anterior Fascicle")
        .expect("boundary site from the adjacent quadrant");
    assert!(fascicle.from_adjacent_quadrant);
    assert_eq!(fascicle.quadrant, Quadrant::LeftLower);
    assert!(
        result
            .predictions()
            .filter(|p| p.from_adjacent_quadrant)
            .all(|p| catalog.by_name(&p.site).unwrap().boundary)
    );
}

#[test]
fn isoelectric_lead_i_without_mapping_is_low_confidence() {
    let catalog = bundled();
    let obs = observation(&[(Lead::I, Polarity::Isoelectric)], 140.0, BbbPattern::None);
    let result = analyze(&obs, &catalog).unwrap().result().cloned().unwrap();

    assert_eq!(result.horizontal_axis.axis, HorizontalAxis::Rightward);
    assert!(result.horizontal_axis.low_confidence);
    assert!(result.horizontal_axis.has_discordance);
    assert_eq!(result.quadrant.adjacent_quadrants, [Quadrant::RightUpper]);
    assert!(
        result
            .supporting_evidence
            .iter()
            .any(|line| line.contains("low confidence"))
    );
}

#[test]
fn predictions_carry_their_own_sites_guidance() {
    let catalog = bundled();
    let obs = observation(
        &[(Lead::III, Polarity::Negative), (Lead::I, Polarity::Negative)],
        130.0,
        BbbPattern::Rbbb,
    );
    let outcome = analyze(&obs, &catalog).unwrap();
    let result = outcome.result().unwrap();
    assert!(result.primary_site.is_some());
    for prediction in result.predictions() {
        let entry = catalog.by_name(&prediction.site).unwrap();
        let implications = prediction.clinical_implications.as_ref().unwrap();
        assert_eq!(implications.recommended_approach, entry.clinical.ablation_approach);
        assert_eq!(implications.proximity_warnings, entry.clinical.proximity_risks);
    }
}

#[test]
fn incomplete_draft_is_rejected_before_screening() {
    let catalog = bundled();
    let draft = ObservationDraft::new()
        .with_lead(Lead::I, Polarity::Positive)
        .with_qrs_duration(140.0);
    let err = analyze_draft(draft, &catalog).unwrap_err();
    let AnalysisError::IncompleteData { missing } = &err else {
        panic!("unexpected error {err}");
    };
    assert!(missing.iter().any(|field| field == "Lead aVR"), "{missing:?}");
    assert!(!missing.iter().any(|field| field == "Lead I"));
}

#[test]
fn outcome_serializes_with_kind_tag() {
    let catalog = bundled();
    let obs = observation(&[(Lead::AVR, Polarity::Negative)], 140.0, BbbPattern::None);
    let outcome = analyze(&obs, &catalog).unwrap();

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["outcome"], "localized");
    assert_eq!(value["result"]["quadrant"]["quadrant"], "rightUpper");
    assert_eq!(value["result"]["primary_site"]["site"], "Para-Hisian");

    let back: AnalysisOutcome = serde_json::from_value(value).unwrap();
    assert_eq!(back, outcome);
}
