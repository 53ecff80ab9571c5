//! Ordering of scored sites and confidence bucketing.

use std::cmp::Ordering;

use vtloc_catalog::ConfidenceThresholds;
use vtloc_model::SitePrediction;

use crate::rules::ScoredSite;

/// Score descending, then site name ascending.
pub fn compare(a: &ScoredSite<'_>, b: &ScoredSite<'_>) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.site.name.cmp(&b.site.name))
}

/// Turn survivors into predictions in rank order. The first element is the
/// primary site.
pub fn rank(
    mut scored: Vec<ScoredSite<'_>>,
    thresholds: &ConfidenceThresholds,
) -> Vec<SitePrediction> {
    scored.sort_by(compare);
    scored
        .into_iter()
        .map(|scored| SitePrediction {
            site: scored.site.name.clone(),
            region: scored.site.region,
            quadrant: scored.site.quadrant,
            confidence: thresholds.bucket(scored.score),
            confidence_score: scored.score,
            distinguishing_features: scored
                .matched
                .iter()
                .map(|indicator| indicator.description.clone())
                .collect(),
            from_adjacent_quadrant: scored.from_adjacent_quadrant,
            clinical_implications: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtloc_catalog::load_embedded;
    use vtloc_model::ConfidenceLevel;

    #[test]
    fn orders_by_score_then_name() {
        let (catalog, _) = load_embedded().unwrap();
        let entry = |name: &str, score: u8| ScoredSite {
            site: catalog.get(name).unwrap(),
            score,
            matched_weight: 0,
            max_weight: 0,
            matched: Vec::new(),
            from_adjacent_quadrant: false,
        };

        let ranked = rank(
            vec![
                entry("Right Ventricular Apex", 40),
                entry("Moderator Band", 75),
                entry("Inferior Tricuspid Annulus", 40),
                entry("Cardiac Crux", 12),
            ],
            &ConfidenceThresholds::default(),
        );
        let names: Vec<&str> = ranked.iter().map(|p| p.site.as_str()).collect();
        assert_eq!(
            names,
            [
                "Moderator Band",
                "Inferior Tricuspid Annulus",
                "Right Ventricular Apex",
                "Cardiac Crux"
            ]
        );
        let levels: Vec<ConfidenceLevel> = ranked.iter().map(|p| p.confidence).collect();
        assert_eq!(
            levels,
            [
                ConfidenceLevel::High,
                ConfidenceLevel::Moderate,
                ConfidenceLevel::Moderate,
                ConfidenceLevel::Low
            ]
        );
    }
}
