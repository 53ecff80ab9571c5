//! Frontal-plane axis resolution.
//!
//! The vertical axis is a vote over the configured inferior leads; the
//! horizontal axis is a table lookup on one lead's polarity and the block
//! pattern. Both are total over a validated observation.

use tracing::warn;
use vtloc_catalog::{HorizontalPolicy, VerticalPolicy};
use vtloc_model::{
    HorizontalAxisResult, LeadReading, Observation, Polarity, VerticalAxis, VerticalAxisResult,
};

pub fn resolve_vertical(observation: &Observation, policy: &VerticalPolicy) -> VerticalAxisResult {
    let leads: Vec<LeadReading> = policy
        .leads
        .iter()
        .map(|&lead| LeadReading {
            lead,
            polarity: observation.polarity(lead),
        })
        .collect();
    let positive_count = leads
        .iter()
        .filter(|reading| policy.counts_as_positive(reading.polarity))
        .count();
    let axis = if positive_count >= policy.min_positive {
        VerticalAxis::Inferior
    } else {
        VerticalAxis::Superior
    };
    let has_discordance = leads
        .windows(2)
        .any(|pair| pair[0].polarity != pair[1].polarity);
    let notes = has_discordance.then(|| {
        format!(
            "Inferior leads disagree ({}); {positive_count} of {} counted positive",
            describe_readings(&leads),
            leads.len()
        )
    });
    VerticalAxisResult {
        axis,
        leads,
        positive_count,
        has_discordance,
        notes,
    }
}

pub fn resolve_horizontal(
    observation: &Observation,
    policy: &HorizontalPolicy,
) -> HorizontalAxisResult {
    let reading = LeadReading {
        lead: policy.lead,
        polarity: observation.polarity(policy.lead),
    };
    let bbb_pattern = observation.bbb_pattern();
    let has_discordance = reading.polarity == Polarity::Isoelectric;

    let (axis, low_confidence, notes) = match policy.lookup(reading.polarity, bbb_pattern) {
        Some(axis) => {
            let notes = has_discordance.then(|| {
                format!(
                    "Lead {} is isoelectric; horizontal axis taken from the {} pattern",
                    reading.lead, bbb_pattern
                )
            });
            (axis, false, notes)
        }
        None => {
            warn!(
                lead = %reading.lead,
                polarity = %reading.polarity,
                bbb_pattern = %bbb_pattern,
                fallback = %policy.fallback,
                "no horizontal axis mapping, using fallback"
            );
            let notes = format!(
                "No mapping for lead {} {} with block pattern {}; defaulted to {} (low confidence)",
                reading.lead, reading.polarity, bbb_pattern, policy.fallback
            );
            (policy.fallback, true, Some(notes))
        }
    };

    HorizontalAxisResult {
        axis,
        lead: reading,
        bbb_pattern,
        has_discordance,
        low_confidence,
        notes,
    }
}

fn describe_readings(readings: &[LeadReading]) -> String {
    readings
        .iter()
        .map(|reading| format!("{} {}", reading.lead, reading.polarity.symbol()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtloc_catalog::IsoelectricVote;
    use vtloc_model::{BbbPattern, HorizontalAxis, Lead};

    fn observation(inferior: [Polarity; 3], lead_i: Polarity, bbb: BbbPattern) -> Observation {
        let mut leads = [Polarity::Positive; Lead::COUNT];
        leads[Lead::II.index()] = inferior[0];
        leads[Lead::III.index()] = inferior[1];
        leads[Lead::AVF.index()] = inferior[2];
        leads[Lead::I.index()] = lead_i;
        Observation::new(leads, 150.0, bbb).unwrap()
    }

    use Polarity::{Isoelectric as Iso, Negative as Neg, Positive as Pos};

    #[test]
    fn unanimous_positive_is_inferior_without_discordance() {
        let result = resolve_vertical(
            &observation([Pos, Pos, Pos], Pos, BbbPattern::None),
            &VerticalPolicy::default(),
        );
        assert_eq!(result.axis, VerticalAxis::Inferior);
        assert_eq!(result.positive_count, 3);
        assert!(!result.has_discordance);
        assert!(result.notes.is_none());
    }

    #[test]
    fn two_of_three_is_inferior_with_discordance() {
        let result = resolve_vertical(
            &observation([Pos, Neg, Pos], Pos, BbbPattern::None),
            &VerticalPolicy::default(),
        );
        assert_eq!(result.axis, VerticalAxis::Inferior);
        assert!(result.has_discordance);
        assert_eq!(
            result.notes.as_deref(),
            Some("Inferior leads disagree (II +, III -, aVF +); 2 of 3 counted positive")
        );
    }

    #[test]
    fn isoelectric_counts_as_non_positive_by_default() {
        let obs = observation([Pos, Iso, Iso], Pos, BbbPattern::None);
        let result = resolve_vertical(&obs, &VerticalPolicy::default());
        assert_eq!(result.axis, VerticalAxis::Superior);
        assert_eq!(result.positive_count, 1);

        let lenient = VerticalPolicy {
            isoelectric: IsoelectricVote::Positive,
            ..VerticalPolicy::default()
        };
        assert_eq!(resolve_vertical(&obs, &lenient).axis, VerticalAxis::Inferior);
    }

    #[test]
    fn all_negative_is_superior() {
        let result = resolve_vertical(
            &observation([Neg, Neg, Neg], Pos, BbbPattern::Lbbb),
            &VerticalPolicy::default(),
        );
        assert_eq!(result.axis, VerticalAxis::Superior);
        assert!(!result.has_discordance);
    }

    #[test]
    fn empty_lead_list_is_superior_without_discordance() {
        let policy = VerticalPolicy {
            leads: Vec::new(),
            ..VerticalPolicy::default()
        };
        let result = resolve_vertical(&observation([Pos, Neg, Pos], Pos, BbbPattern::None), &policy);
        assert_eq!(result.axis, VerticalAxis::Superior);
        assert_eq!(result.positive_count, 0);
        assert!(!result.has_discordance);
        assert!(result.leads.is_empty());
    }

    #[test]
    fn horizontal_table_lookup() {
        let policy = HorizontalPolicy::default();
        let left = resolve_horizontal(&observation([Pos; 3], Pos, BbbPattern::Lbbb), &policy);
        assert_eq!(left.axis, HorizontalAxis::Leftward);
        assert!(!left.low_confidence);

        let right = resolve_horizontal(&observation([Pos; 3], Pos, BbbPattern::Rbbb), &policy);
        assert_eq!(right.axis, HorizontalAxis::Rightward);
        assert_eq!(right.lead.lead, Lead::I);
    }

    #[test]
    fn unmapped_combination_falls_back_with_low_confidence() {
        let result = resolve_horizontal(
            &observation([Pos; 3], Iso, BbbPattern::None),
            &HorizontalPolicy::default(),
        );
        assert_eq!(result.axis, HorizontalAxis::Rightward);
        assert!(result.low_confidence);
        assert!(result.has_discordance);
        assert!(result.notes.unwrap().contains("low confidence"));
    }
}
