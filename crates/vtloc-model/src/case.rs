//! Case records that embed an observation and its outcome verbatim.
//!
//! Storage is the caller's concern; these types only fix the shape that a
//! case-history collaborator persists and lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOutcome, OutcomeKind};
use crate::enums::ConfidenceLevel;
use crate::observation::Observation;

/// An analyzed case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub observation: Observation,
    pub outcome: AnalysisOutcome,
}

impl CaseRecord {
    pub fn new(id: impl Into<String>, observation: Observation, outcome: AnalysisOutcome) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            case_name: None,
            tags: Vec::new(),
            notes: None,
            observation,
            outcome,
        }
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    #[must_use]
    pub fn with_case_name(mut self, name: impl Into<String>) -> Self {
        self.case_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn summary(&self) -> CaseSummary {
        CaseSummary::from(self)
    }
}

/// Row shown in a case list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub outcome: OutcomeKind,
    /// Primary site name, or the outcome label when there is none.
    pub primary_site: String,
    pub confidence: ConfidenceLevel,
    pub qrs_duration_ms: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl From<&CaseRecord> for CaseSummary {
    fn from(record: &CaseRecord) -> Self {
        let primary_site = record.outcome.primary_site().map_or_else(
            || record.outcome.kind().label().to_string(),
            |prediction| prediction.site.clone(),
        );
        Self {
            id: record.id.clone(),
            case_name: record.case_name.clone(),
            created_at: record.created_at,
            outcome: record.outcome.kind(),
            primary_site,
            confidence: record.outcome.overall_confidence(),
            qrs_duration_ms: record.observation.qrs_duration_ms(),
            tags: record.tags.clone(),
        }
    }
}
