//! Error types for the analysis pipeline.

use thiserror::Error;
use vtloc_model::ObservationError;

/// Failures that stop an analysis.
///
/// Clinical outcomes such as a narrow QRS or an unrecognized pattern are not
/// errors; they are variants of [`vtloc_model::AnalysisOutcome`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The observation is missing required fields.
    #[error("incomplete observation, missing: {}", missing.join(", "))]
    IncompleteData { missing: Vec<String> },

    /// A field is present but unusable.
    #[error(transparent)]
    InvalidObservation(ObservationError),

    /// A predicted site has no catalog entry.
    #[error("catalog integrity error: no catalog entry for predicted site '{site}'")]
    CatalogIntegrity { site: String },
}

impl From<ObservationError> for AnalysisError {
    fn from(error: ObservationError) -> Self {
        match error {
            ObservationError::IncompleteData { missing } => AnalysisError::IncompleteData { missing },
            other => AnalysisError::InvalidObservation(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
