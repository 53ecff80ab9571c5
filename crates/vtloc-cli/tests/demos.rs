//! The sample inputs under `demos/` stay analyzable.

use vtloc_catalog::load_embedded;
use vtloc_cli::batch::read_rows;
use vtloc_engine::{AnalysisError, analyze_draft};
use vtloc_model::{ConfidenceLevel, ObservationDraft, OutcomeKind, Quadrant};

const OBSERVATION: &str = include_str!("../../../demos/observation.json");
const OBSERVATIONS: &str = include_str!("../../../demos/observations.csv");

#[test]
fn sample_observation_localizes_to_posterior_rvot() {
    let (catalog, _) = load_embedded().unwrap();
    let draft: ObservationDraft = serde_json::from_str(OBSERVATION).unwrap();
    let outcome = analyze_draft(draft, &catalog).unwrap();

    let primary = outcome.primary_site().unwrap();
    assert_eq!(primary.site, "Posterior RVOT");
    assert_eq!(primary.confidence_score, 100);
    assert_eq!(outcome.overall_confidence(), ConfidenceLevel::High);
    assert_eq!(outcome.result().unwrap().quadrant.quadrant, Quadrant::RightUpper);
}

#[test]
fn sample_batch_covers_each_outcome() {
    let (catalog, _) = load_embedded().unwrap();
    let rows = read_rows(OBSERVATIONS.as_bytes()).unwrap();
    let kinds: Vec<Result<OutcomeKind, String>> = rows
        .into_iter()
        .map(|row| {
            let draft = row.draft?;
            match analyze_draft(draft, &catalog) {
                Ok(outcome) => Ok(outcome.kind()),
                Err(AnalysisError::IncompleteData { missing }) => Err(missing.join(", ")),
                Err(other) => Err(other.to_string()),
            }
        })
        .collect();

    assert_eq!(
        kinds,
        [
            Ok(OutcomeKind::Localized),
            Ok(OutcomeKind::ScreeningFailed),
            Ok(OutcomeKind::Localized),
            Err("Lead III".to_string()),
        ]
    );
}
