//! Candidate selection, hard filters and weighted scoring.

use tracing::debug;
use vtloc_catalog::{EvalContext, Indicator, RequiredCriteria, SiteCatalog, SiteEntry};
use vtloc_model::{ExcludedSite, QuadrantResult};

/// A catalog site under consideration for one analysis.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub site: &'a SiteEntry,
    pub from_adjacent_quadrant: bool,
}

/// A candidate that passed every filter.
#[derive(Debug, Clone)]
pub struct ScoredSite<'a> {
    pub site: &'a SiteEntry,
    pub score: u8,
    pub matched_weight: u32,
    pub max_weight: u32,
    pub matched: Vec<&'a Indicator>,
    pub from_adjacent_quadrant: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RuleOutcome<'a> {
    /// Survivors in candidate order.
    pub scored: Vec<ScoredSite<'a>>,
    pub excluded: Vec<ExcludedSite>,
    pub matched_criteria: Vec<String>,
    pub supporting_evidence: Vec<String>,
}

/// Home-quadrant sites in catalog order, then boundary sites of each
/// adjacent quadrant.
pub fn candidates<'a>(catalog: &'a SiteCatalog, quadrant: &QuadrantResult) -> Vec<Candidate<'a>> {
    let home = catalog.sites_in(quadrant.quadrant).map(|site| Candidate {
        site,
        from_adjacent_quadrant: false,
    });
    let adjacent = quadrant.adjacent_quadrants.iter().flat_map(|&adjacent| {
        catalog
            .sites_in(adjacent)
            .filter(|site| site.boundary)
            .map(|site| Candidate {
                site,
                from_adjacent_quadrant: true,
            })
    });
    home.chain(adjacent).collect()
}

/// Run required criteria, exclusions and scoring over every candidate.
pub fn evaluate<'a>(candidates: &[Candidate<'a>], context: &EvalContext<'_>) -> RuleOutcome<'a> {
    let mut outcome = RuleOutcome::default();

    for candidate in candidates {
        let site = candidate.site;

        if let Some(reason) = required_mismatch(&site.rule.required, context) {
            debug!(site = %site.name, %reason, "candidate failed required criteria");
            outcome.excluded.push(ExcludedSite {
                site: site.name.clone(),
                reason,
            });
            continue;
        }

        if let Some(exclusion) = site
            .rule
            .exclusions
            .iter()
            .find(|exclusion| exclusion.criterion.evaluate(context))
        {
            debug!(site = %site.name, exclusion = %exclusion.criterion, "candidate vetoed");
            outcome.excluded.push(ExcludedSite {
                site: site.name.clone(),
                reason: format!("Exclusion: {}", exclusion.description),
            });
            continue;
        }

        let matched: Vec<&Indicator> = site
            .rule
            .indicators()
            .filter(|indicator| indicator.criterion.evaluate(context))
            .collect();
        let matched_weight: u32 = matched
            .iter()
            .map(|indicator| u32::from(indicator.weight))
            .sum();
        let max_weight = site.rule.max_weight();
        let score = score(matched_weight, max_weight);
        debug!(site = %site.name, matched_weight, max_weight, score, "candidate scored");

        outcome.matched_criteria.extend(
            matched
                .iter()
                .map(|indicator| format!("{}: {}", site.name, indicator.description)),
        );
        outcome.supporting_evidence.push(format!(
            "{}: {} of {} indicator weight matched",
            site.name, matched_weight, max_weight
        ));
        outcome.scored.push(ScoredSite {
            site,
            score,
            matched_weight,
            max_weight,
            matched,
            from_adjacent_quadrant: candidate.from_adjacent_quadrant,
        });
    }
    outcome
}

/// `round(100 * matched / max)` with halves rounded up, clamped to 0..=100.
///
/// A zero `max` scores zero.
pub fn score(matched: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    let matched = u64::from(matched.min(max));
    let max = u64::from(max);
    let rounded = (200 * matched + max) / (2 * max);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

fn required_mismatch(required: &RequiredCriteria, context: &EvalContext<'_>) -> Option<String> {
    let observation = context.observation;
    if let Some(range) = required.qrs_duration
        && !range.contains(observation.qrs_duration_ms())
    {
        return Some(format!(
            "Requires {} (observed {} ms)",
            range.describe(),
            observation.qrs_duration_ms()
        ));
    }
    if let Some(vertical) = required.vertical_axis
        && vertical != context.vertical
    {
        return Some(format!(
            "Requires {vertical} axis (observed {})",
            context.vertical
        ));
    }
    if let Some(horizontal) = required.horizontal_axis
        && horizontal != context.horizontal
    {
        return Some(format!(
            "Requires {horizontal} axis (observed {})",
            context.horizontal
        ));
    }
    if let Some(bbb) = required.bbb_pattern
        && bbb != observation.bbb_pattern()
    {
        return Some(format!(
            "Requires {bbb} pattern (observed {})",
            observation.bbb_pattern()
        ));
    }
    None
}
