//! Descriptive refinement reported alongside the ranking.
//!
//! Nothing here changes scores or order; it summarizes the precordial
//! transition, the QRS width and a few lead and marker observations.

use vtloc_catalog::{MarkerThresholds, Policy};
use vtloc_model::{
    Lead, Observation, Polarity, RefinedLocalization, TransitionCategory, TransitionPoint,
};

pub fn transition_category(point: TransitionPoint) -> TransitionCategory {
    match point {
        TransitionPoint::V1 | TransitionPoint::V2 => TransitionCategory::Early,
        TransitionPoint::V3 => TransitionCategory::Intermediate,
        TransitionPoint::V4 | TransitionPoint::V5 | TransitionPoint::V6 => TransitionCategory::Late,
    }
}

/// Band the QRS width: below the screening threshold is narrow, then the
/// marker bands split wide, markedly wide and very wide.
pub fn describe_qrs_duration(duration_ms: f64, policy: &Policy) -> String {
    let markers = &policy.markers;
    let band = if duration_ms < policy.screening.min_qrs_duration_ms {
        "narrow"
    } else if duration_ms < markers.markedly_wide_qrs_ms {
        "wide"
    } else if duration_ms < markers.very_wide_qrs_ms {
        "markedly wide"
    } else {
        "very wide, consistent with epicardial or myocardial spread"
    };
    format!("QRS {duration_ms} ms: {band}")
}

pub fn refine(observation: &Observation, policy: &Policy) -> RefinedLocalization {
    let precordial_transition = observation.transition_point();
    let category = precordial_transition.map(transition_category);

    let specific_lead_characteristics = lead_characteristics(observation);
    let special_markers = special_markers(observation, &policy.markers);

    let notes = match precordial_transition.zip(category) {
        Some((point, category)) => match category {
            TransitionCategory::Early => {
                format!("Early transition at {point} favours a left-sided origin")
            }
            TransitionCategory::Intermediate => format!(
                "Transition at {point} does not separate right from left outflow origins"
            ),
            TransitionCategory::Late => {
                format!("Late transition at {point} favours a right-sided origin")
            }
        },
        None => "No precordial transition recorded".to_string(),
    };

    RefinedLocalization {
        precordial_transition,
        transition_category: category,
        qrs_duration_analysis: describe_qrs_duration(observation.qrs_duration_ms(), policy),
        specific_lead_characteristics,
        special_markers,
        notes: Some(notes),
    }
}

fn lead_characteristics(observation: &Observation) -> Vec<String> {
    let mut lines = Vec::new();
    match observation.polarity(Lead::AVR) {
        Polarity::Positive => {
            lines.push("aVR positive: unusual for outflow tract origins".to_string())
        }
        Polarity::Negative => lines.push("aVR negative".to_string()),
        Polarity::Isoelectric => lines.push("aVR isoelectric".to_string()),
    }
    match observation.polarity(Lead::AVL) {
        Polarity::Negative => {
            lines.push("aVL negative: consistent with a superiorly placed origin on the left".to_string())
        }
        polarity => lines.push(format!("aVL {polarity}")),
    }
    match observation.polarity(Lead::V1) {
        Polarity::Positive => {
            lines.push("V1 positive: right bundle-like morphology, left ventricular origin".to_string())
        }
        Polarity::Negative => {
            lines.push("V1 negative: left bundle-like morphology, right ventricular or septal origin".to_string())
        }
        Polarity::Isoelectric => lines.push("V1 isoelectric".to_string()),
    }
    lines
}

fn special_markers(observation: &Observation, thresholds: &MarkerThresholds) -> Vec<String> {
    let measurements = observation.measurements();
    let mut markers = Vec::new();
    if let Some(mdi) = measurements.max_deflection_index {
        if mdi >= thresholds.max_deflection_index {
            markers.push(format!(
                "Maximum deflection index {mdi} >= {}: suggests epicardial origin",
                thresholds.max_deflection_index
            ));
        } else {
            markers.push(format!(
                "Maximum deflection index {mdi} < {}: endocardial origin more likely",
                thresholds.max_deflection_index
            ));
        }
    }
    if let Some(ratio) = measurements.v2_transition_ratio {
        if ratio >= thresholds.v2_transition_ratio {
            markers.push(format!(
                "V2 transition ratio {ratio} >= {}: favours LVOT origin",
                thresholds.v2_transition_ratio
            ));
        } else {
            markers.push(format!(
                "V2 transition ratio {ratio} < {}: favours RVOT origin",
                thresholds.v2_transition_ratio
            ));
        }
    }
    markers
}
