//! End-to-end analysis of one observation.

use std::time::Instant;

use tracing::{debug, info, info_span};
use vtloc_catalog::{EvalContext, SiteCatalog};
use vtloc_model::{
    AnalysisOutcome, AnalysisResult, ConfidenceLevel, HorizontalAxisResult, Observation,
    ObservationDraft, QuadrantResult, ScreeningResult, VerticalAxisResult,
};

use crate::annotate::annotate;
use crate::axis::{resolve_horizontal, resolve_vertical};
use crate::error::Result;
use crate::quadrant::assign_quadrant;
use crate::ranking::rank;
use crate::refine::refine;
use crate::rules::{candidates, evaluate};
use crate::screening::screen;

/// Validate a draft, then analyze it.
///
/// Missing fields surface as [`crate::AnalysisError::IncompleteData`]
/// before any stage runs.
pub fn analyze_draft(draft: ObservationDraft, catalog: &SiteCatalog) -> Result<AnalysisOutcome> {
    let observation = Observation::try_from(draft)?;
    analyze(&observation, catalog)
}

/// Run every stage over a validated observation.
///
/// 1. Screening against the QRS duration threshold
/// 2. Vertical and horizontal axis resolution
/// 3. Quadrant assignment
/// 4. Candidate filtering and scoring
/// 5. Ranking and confidence buckets
/// 6. Clinical annotation
///
/// The same observation and catalog always produce the same outcome.
pub fn analyze(observation: &Observation, catalog: &SiteCatalog) -> Result<AnalysisOutcome> {
    let analysis_span = info_span!(
        "analyze",
        catalog_version = %catalog.version(),
        qrs_duration_ms = observation.qrs_duration_ms(),
        bbb_pattern = %observation.bbb_pattern()
    );
    let _analysis_guard = analysis_span.enter();
    let analysis_start = Instant::now();
    let policy = catalog.policy();

    let screening = info_span!("screening").in_scope(|| {
        let start = Instant::now();
        let result = screen(observation, &policy.screening);
        debug!(
            meets_threshold = result.meets_threshold,
            threshold_ms = result.threshold_ms,
            duration_ms = start.elapsed().as_millis(),
            "screening complete"
        );
        result
    });
    if !screening.meets_threshold {
        info!(
            duration_ms = analysis_start.elapsed().as_millis(),
            outcome = "screening_failed",
            "analysis complete"
        );
        return Ok(AnalysisOutcome::ScreeningFailed { screening });
    }

    let (vertical, horizontal) = info_span!("axis").in_scope(|| {
        let start = Instant::now();
        let vertical = resolve_vertical(observation, &policy.vertical);
        let horizontal = resolve_horizontal(observation, &policy.horizontal);
        debug!(
            vertical = %vertical.axis,
            horizontal = %horizontal.axis,
            vertical_discordance = vertical.has_discordance,
            horizontal_discordance = horizontal.has_discordance,
            low_confidence = horizontal.low_confidence,
            duration_ms = start.elapsed().as_millis(),
            "axis resolution complete"
        );
        (vertical, horizontal)
    });

    let quadrant = info_span!("quadrant").in_scope(|| {
        let result = assign_quadrant(&vertical, &horizontal, catalog);
        debug!(
            quadrant = %result.quadrant,
            possible_sites = result.possible_sites.len(),
            adjacent_quadrants = result.adjacent_quadrants.len(),
            "quadrant assigned"
        );
        result
    });

    let context = EvalContext {
        observation,
        vertical: vertical.axis,
        horizontal: horizontal.axis,
    };
    let rules = info_span!("rules").in_scope(|| {
        let start = Instant::now();
        let candidates = candidates(catalog, &quadrant);
        let outcome = evaluate(&candidates, &context);
        debug!(
            candidates = candidates.len(),
            survivors = outcome.scored.len(),
            excluded = outcome.excluded.len(),
            duration_ms = start.elapsed().as_millis(),
            "rule evaluation complete"
        );
        outcome
    });

    let mut predictions = info_span!("ranking")
        .in_scope(|| rank(rules.scored, &policy.confidence));
    info_span!("annotate").in_scope(|| annotate(&mut predictions, catalog))?;

    let refined_localization = refine(observation, policy);

    let mut supporting_evidence = stage_evidence(&screening, &vertical, &horizontal, &quadrant);
    supporting_evidence.extend(rules.supporting_evidence);

    let mut predictions = predictions.into_iter();
    let primary_site = predictions.next();
    let differential_diagnoses: Vec<_> = predictions.collect();
    let overall_confidence = primary_site
        .as_ref()
        .map_or(ConfidenceLevel::Low, |primary| primary.confidence);

    let result = AnalysisResult {
        catalog_version: catalog.version().to_string(),
        screening,
        vertical_axis: vertical,
        horizontal_axis: horizontal,
        quadrant,
        refined_localization,
        primary_site,
        differential_diagnoses,
        excluded_sites: rules.excluded,
        supporting_evidence,
        matched_criteria: rules.matched_criteria,
        overall_confidence,
    };

    info!(
        quadrant = %result.quadrant.quadrant,
        predictions = result.prediction_count(),
        overall_confidence = %result.overall_confidence,
        duration_ms = analysis_start.elapsed().as_millis(),
        "analysis complete"
    );

    if result.primary_site.is_some() {
        Ok(AnalysisOutcome::Localized { result })
    } else {
        Ok(AnalysisOutcome::NoCandidateSites { result })
    }
}

fn stage_evidence(
    screening: &ScreeningResult,
    vertical: &VerticalAxisResult,
    horizontal: &HorizontalAxisResult,
    quadrant: &QuadrantResult,
) -> Vec<String> {
    let inferior_leads = vertical
        .leads
        .iter()
        .map(|reading| format!("{} {}", reading.lead, reading.polarity))
        .collect::<Vec<_>>()
        .join(", ");
    let mut evidence = vec![
        format!(
            "QRS duration {} ms meets the {} ms threshold",
            screening.qrs_duration_ms, screening.threshold_ms
        ),
        format!(
            "{} axis: {} of {} leads positive ({inferior_leads})",
            capitalize(vertical.axis.as_str()),
            vertical.positive_count,
            vertical.leads.len()
        ),
        format!(
            "{} axis: lead {} {} with {} pattern",
            capitalize(horizontal.axis.as_str()),
            horizontal.lead.lead,
            horizontal.lead.polarity,
            horizontal.bbb_pattern
        ),
        format!("Quadrant: {}", quadrant.quadrant.label()),
    ];
    evidence.extend(
        [&vertical.notes, &horizontal.notes, &quadrant.notes]
            .into_iter()
            .flatten()
            .cloned(),
    );
    evidence
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtloc_catalog::load_embedded;
    use vtloc_model::{BbbPattern, Lead, Polarity};

    #[test]
    fn evidence_starts_with_stage_lines() {
        let (catalog, _) = load_embedded().unwrap();
        let observation =
            Observation::new([Polarity::Positive; Lead::COUNT], 140.0, BbbPattern::None).unwrap();
        let outcome = analyze(&observation, &catalog).unwrap();
        let result = outcome.result().unwrap();
        assert_eq!(
            &result.supporting_evidence[..4],
            [
                "QRS duration 140 ms meets the 120 ms threshold",
                "Inferior axis: 3 of 3 leads positive (II positive, III positive, aVF positive)",
                "Leftward axis: lead I positive with none pattern",
                "Quadrant: Right upper",
            ]
        );
    }

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalize("inferior"), "Inferior");
        assert_eq!(capitalize(""), "");
    }
}
