//! Per-stage results and the final analysis record.

use serde::{Deserialize, Serialize};

use crate::enums::{
    AblationApproach, AnatomicalRegion, ConfidenceLevel, HorizontalAxis, Quadrant,
    TransitionCategory, VerticalAxis,
};
use crate::lead::{BbbPattern, Lead, Polarity, TransitionPoint};

/// Result of the QRS duration gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub qrs_duration_ms: f64,
    pub threshold_ms: f64,
    pub meets_threshold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A lead and the polarity observed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadReading {
    pub lead: Lead,
    pub polarity: Polarity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalAxisResult {
    pub axis: VerticalAxis,
    pub leads: Vec<LeadReading>,
    pub positive_count: usize,
    /// The contributing leads do not all share the same polarity.
    pub has_discordance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizontalAxisResult {
    pub axis: HorizontalAxis,
    pub lead: LeadReading,
    pub bbb_pattern: BbbPattern,
    /// The indicator lead is isoelectric.
    pub has_discordance: bool,
    /// The lookup table had no entry and the configured fallback was used.
    pub low_confidence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantResult {
    pub quadrant: Quadrant,
    pub vertical_axis: VerticalAxis,
    pub horizontal_axis: HorizontalAxis,
    /// Catalog sites homed in this quadrant, in catalog order.
    pub possible_sites: Vec<String>,
    /// Neighbouring quadrants whose boundary sites were also considered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjacent_quadrants: Vec<Quadrant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Descriptive refinement of the localization. Does not affect ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedLocalization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precordial_transition: Option<TransitionPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_category: Option<TransitionCategory>,
    pub qrs_duration_analysis: String,
    pub specific_lead_characteristics: Vec<String>,
    pub special_markers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Procedural guidance copied from the catalog entry of a predicted site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalImplications {
    pub recommended_approach: AblationApproach,
    pub proximity_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate_expectation: Option<String>,
    pub procedural_considerations: Vec<String>,
}

/// One ranked candidate origin site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePrediction {
    pub site: String,
    pub region: AnatomicalRegion,
    pub quadrant: Quadrant,
    pub confidence: ConfidenceLevel,
    /// Normalized match score, 0-100.
    pub confidence_score: u8,
    pub distinguishing_features: Vec<String>,
    /// The site was pulled in from a neighbouring quadrant on discordance.
    #[serde(default)]
    pub from_adjacent_quadrant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_implications: Option<ClinicalImplications>,
}

/// A candidate removed by a required criterion or an exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedSite {
    pub site: String,
    pub reason: String,
}

/// Full record of one analysis that got past screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub catalog_version: String,
    pub screening: ScreeningResult,
    pub vertical_axis: VerticalAxisResult,
    pub horizontal_axis: HorizontalAxisResult,
    pub quadrant: QuadrantResult,
    pub refined_localization: RefinedLocalization,
    /// Highest ranked site; `None` when no candidate survived.
    pub primary_site: Option<SitePrediction>,
    pub differential_diagnoses: Vec<SitePrediction>,
    pub excluded_sites: Vec<ExcludedSite>,
    pub supporting_evidence: Vec<String>,
    pub matched_criteria: Vec<String>,
    pub overall_confidence: ConfidenceLevel,
}

impl AnalysisResult {
    /// Primary followed by differentials, in rank order.
    pub fn predictions(&self) -> impl Iterator<Item = &SitePrediction> {
        self.primary_site
            .iter()
            .chain(self.differential_diagnoses.iter())
    }

    pub fn prediction_count(&self) -> usize {
        self.predictions().count()
    }
}

/// Outcome kinds a caller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    ScreeningFailed,
    NoCandidateSites,
    Localized,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::ScreeningFailed => "screening_failed",
            OutcomeKind::NoCandidateSites => "no_candidate_sites",
            OutcomeKind::Localized => "localized",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::ScreeningFailed => "Screening failed",
            OutcomeKind::NoCandidateSites => "Pattern not recognized",
            OutcomeKind::Localized => "Localized",
        }
    }
}

/// Typed result of one pipeline invocation.
///
/// None of these are errors: a narrow QRS and an unrecognized pattern are
/// both reportable clinical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// QRS duration below the threshold; later stages never ran.
    ScreeningFailed { screening: ScreeningResult },
    /// Every stage ran but no site survived filtering.
    NoCandidateSites { result: AnalysisResult },
    /// At least one site was ranked.
    Localized { result: AnalysisResult },
}

impl AnalysisOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            AnalysisOutcome::ScreeningFailed { .. } => OutcomeKind::ScreeningFailed,
            AnalysisOutcome::NoCandidateSites { .. } => OutcomeKind::NoCandidateSites,
            AnalysisOutcome::Localized { .. } => OutcomeKind::Localized,
        }
    }

    pub fn screening(&self) -> &ScreeningResult {
        match self {
            AnalysisOutcome::ScreeningFailed { screening } => screening,
            AnalysisOutcome::NoCandidateSites { result }
            | AnalysisOutcome::Localized { result } => &result.screening,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::ScreeningFailed { .. } => None,
            AnalysisOutcome::NoCandidateSites { result }
            | AnalysisOutcome::Localized { result } => Some(result),
        }
    }

    pub fn primary_site(&self) -> Option<&SitePrediction> {
        self.result().and_then(|result| result.primary_site.as_ref())
    }

    /// Overall confidence; an outcome without a primary site is low.
    pub fn overall_confidence(&self) -> ConfidenceLevel {
        self.result()
            .map_or(ConfidenceLevel::Low, |result| result.overall_confidence)
    }
}
