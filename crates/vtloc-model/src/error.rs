use thiserror::Error;

/// Errors raised while turning a draft into a validated observation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    /// One or more required fields were never entered.
    #[error("incomplete observation, missing: {}", missing.join(", "))]
    IncompleteData { missing: Vec<String> },

    /// A field is present but outside its allowed range.
    #[error("invalid {field} value {value}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ObservationError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, ObservationError>;
