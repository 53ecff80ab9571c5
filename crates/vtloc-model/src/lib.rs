//! Data model for ventricular arrhythmia origin localization.
//!
//! - [`lead`]: lead names, polarity, block pattern, transition point
//! - [`observation`]: draft and validated 12-lead observations
//! - [`enums`]: axes, quadrants, confidence, ablation approach, regions
//! - [`analysis`]: per-stage results, predictions and the analysis outcome
//! - [`case`]: case records and list summaries

pub mod analysis;
pub mod case;
pub mod enums;
pub mod error;
pub mod lead;
pub mod observation;

pub use analysis::{
    AnalysisOutcome, AnalysisResult, ClinicalImplications, ExcludedSite, HorizontalAxisResult,
    LeadReading, OutcomeKind, QuadrantResult, RefinedLocalization, ScreeningResult,
    SitePrediction, VerticalAxisResult,
};
pub use case::{CaseRecord, CaseSummary};
pub use enums::{
    AblationApproach, AnatomicalRegion, ConfidenceLevel, HorizontalAxis, Quadrant,
    TransitionCategory, VerticalAxis,
};
pub use error::{ObservationError, Result};
pub use lead::{BbbPattern, Lead, Polarity, TransitionPoint};
pub use observation::{
    COMPLETENESS_FIELDS, CompletenessReport, LeadEntry, MAX_QRS_DURATION_MS, Measurements,
    Observation, ObservationDraft,
};
