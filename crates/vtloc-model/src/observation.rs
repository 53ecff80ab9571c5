//! Observation records.
//!
//! Data entry produces an [`ObservationDraft`] where every field is optional.
//! The draft is converted into an [`Observation`] exactly once, at the
//! boundary; the pipeline only ever sees the validated type, so it never has
//! to re-check lead presence or duration ranges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ObservationError, Result};
use crate::lead::{BbbPattern, Lead, Polarity, TransitionPoint};

/// Upper plausibility bound for a QRS duration.
pub const MAX_QRS_DURATION_MS: f64 = 300.0;

/// Number of fields counted by [`ObservationDraft::completeness`]:
/// 12 leads, QRS duration, block pattern.
pub const COMPLETENESS_FIELDS: usize = Lead::COUNT + 2;

/// Optional quantitative measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurements {
    /// V2 transition ratio (0.0 to 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v2_transition_ratio: Option<f64>,
    /// Maximum deflection index (0.0 to 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_deflection_index: Option<f64>,
}

impl Measurements {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("v2_transition_ratio", self.v2_transition_ratio),
            ("max_deflection_index", self.max_deflection_index),
        ] {
            if let Some(value) = value
                && !(0.0..=1.0).contains(&value)
            {
                return Err(ObservationError::invalid(
                    field,
                    value,
                    "must be between 0 and 1",
                ));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.v2_transition_ratio.is_none() && self.max_deflection_index.is_none()
    }
}

/// Polarity entry for one lead, either bare or with a free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeadEntry {
    Polarity(Polarity),
    Annotated {
        polarity: Polarity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

impl LeadEntry {
    pub fn polarity(&self) -> Polarity {
        match self {
            LeadEntry::Polarity(polarity) | LeadEntry::Annotated { polarity, .. } => *polarity,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match self {
            LeadEntry::Polarity(_) => None,
            LeadEntry::Annotated { notes, .. } => notes.as_deref(),
        }
    }
}

impl From<Polarity> for LeadEntry {
    fn from(polarity: Polarity) -> Self {
        LeadEntry::Polarity(polarity)
    }
}

/// Data-entry state: every field may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationDraft {
    pub leads: BTreeMap<Lead, LeadEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qrs_duration_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbb_pattern: Option<BbbPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_point: Option<TransitionPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ObservationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the polarity of one lead.
    pub fn set_lead(&mut self, lead: Lead, polarity: Polarity) {
        self.leads.insert(lead, LeadEntry::Polarity(polarity));
    }

    #[must_use]
    pub fn with_lead(mut self, lead: Lead, polarity: Polarity) -> Self {
        self.set_lead(lead, polarity);
        self
    }

    #[must_use]
    pub fn with_qrs_duration(mut self, duration_ms: f64) -> Self {
        self.qrs_duration_ms = Some(duration_ms);
        self
    }

    #[must_use]
    pub fn with_bbb_pattern(mut self, pattern: BbbPattern) -> Self {
        self.bbb_pattern = Some(pattern);
        self
    }

    #[must_use]
    pub fn with_transition_point(mut self, point: TransitionPoint) -> Self {
        self.transition_point = Some(point);
        self
    }

    #[must_use]
    pub fn with_measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = Some(measurements);
        self
    }

    /// Fields still missing, labelled for display.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing: Vec<String> = Lead::ALL
            .iter()
            .filter(|lead| !self.leads.contains_key(lead))
            .map(|lead| format!("Lead {lead}"))
            .collect();
        if !self.qrs_duration_entered() {
            missing.push("QRS Duration".to_string());
        }
        if self.bbb_pattern.is_none() {
            missing.push("Bundle Branch Block Pattern".to_string());
        }
        missing
    }

    /// How far data entry has progressed.
    pub fn completeness(&self) -> CompletenessReport {
        let missing_fields = self.missing_fields();
        let completed = COMPLETENESS_FIELDS - missing_fields.len();
        let percentage = ((completed * 200 + COMPLETENESS_FIELDS) / (COMPLETENESS_FIELDS * 2)) as u8;
        CompletenessReport {
            is_complete: missing_fields.is_empty(),
            missing_fields,
            percentage,
        }
    }

    /// A zero or negative duration counts as not entered.
    fn qrs_duration_entered(&self) -> bool {
        self.qrs_duration_ms.is_some_and(|value| value > 0.0)
    }
}

/// Data-entry progress summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub is_complete: bool,
    pub missing_fields: Vec<String>,
    /// Completed fields as a rounded percentage (0-100).
    pub percentage: u8,
}

/// A complete, validated 12-lead observation.
///
/// Every lead has a polarity and the QRS duration is a positive number no
/// larger than [`MAX_QRS_DURATION_MS`]. Instances are immutable; edits go
/// through a new draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObservationDraft", into = "ObservationDraft")]
pub struct Observation {
    leads: [Polarity; Lead::COUNT],
    lead_notes: BTreeMap<Lead, String>,
    qrs_duration_ms: f64,
    bbb_pattern: BbbPattern,
    transition_point: Option<TransitionPoint>,
    measurements: Measurements,
    patient_id: Option<String>,
    notes: Option<String>,
}

impl Observation {
    /// Build an observation from polarities in [`Lead::ALL`] order.
    pub fn new(
        leads: [Polarity; Lead::COUNT],
        qrs_duration_ms: f64,
        bbb_pattern: BbbPattern,
    ) -> Result<Self> {
        validate_qrs_duration(qrs_duration_ms)?;
        Ok(Self {
            leads,
            lead_notes: BTreeMap::new(),
            qrs_duration_ms,
            bbb_pattern,
            transition_point: None,
            measurements: Measurements::default(),
            patient_id: None,
            notes: None,
        })
    }

    #[must_use]
    pub fn with_transition_point(mut self, point: Option<TransitionPoint>) -> Self {
        self.transition_point = point;
        self
    }

    pub fn with_measurements(mut self, measurements: Measurements) -> Result<Self> {
        measurements.validate()?;
        self.measurements = measurements;
        Ok(self)
    }

    pub fn polarity(&self, lead: Lead) -> Polarity {
        self.leads[lead.index()]
    }

    /// All leads with their polarity, in display order.
    pub fn leads(&self) -> impl Iterator<Item = (Lead, Polarity)> + '_ {
        Lead::ALL.into_iter().map(|lead| (lead, self.polarity(lead)))
    }

    pub fn lead_notes(&self, lead: Lead) -> Option<&str> {
        self.lead_notes.get(&lead).map(String::as_str)
    }

    pub fn qrs_duration_ms(&self) -> f64 {
        self.qrs_duration_ms
    }

    pub fn bbb_pattern(&self) -> BbbPattern {
        self.bbb_pattern
    }

    pub fn transition_point(&self) -> Option<TransitionPoint> {
        self.transition_point
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Start a new draft from this observation, for re-analysis after edits.
    pub fn to_draft(&self) -> ObservationDraft {
        ObservationDraft::from(self.clone())
    }
}

fn validate_qrs_duration(value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ObservationError::invalid(
            "qrs_duration_ms",
            value,
            "must be a finite number",
        ));
    }
    if value <= 0.0 {
        return Err(ObservationError::IncompleteData {
            missing: vec!["QRS Duration".to_string()],
        });
    }
    if value > MAX_QRS_DURATION_MS {
        return Err(ObservationError::invalid(
            "qrs_duration_ms",
            value,
            "exceeds the 300 ms plausibility limit",
        ));
    }
    Ok(())
}

impl TryFrom<ObservationDraft> for Observation {
    type Error = ObservationError;

    fn try_from(draft: ObservationDraft) -> Result<Self> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(ObservationError::IncompleteData { missing });
        }
        let ObservationDraft {
            leads: entries,
            qrs_duration_ms,
            bbb_pattern,
            transition_point,
            measurements,
            patient_id,
            notes,
        } = draft;

        // missing_fields() has already confirmed these are present.
        let (Some(qrs_duration_ms), Some(bbb_pattern)) = (qrs_duration_ms, bbb_pattern) else {
            return Err(ObservationError::IncompleteData {
                missing: vec!["QRS Duration".to_string()],
            });
        };

        let mut leads = [Polarity::Isoelectric; Lead::COUNT];
        let mut lead_notes = BTreeMap::new();
        for (lead, entry) in entries {
            leads[lead.index()] = entry.polarity();
            if let Some(note) = entry.notes() {
                lead_notes.insert(lead, note.to_string());
            }
        }

        let mut observation = Observation::new(leads, qrs_duration_ms, bbb_pattern)?
            .with_transition_point(transition_point)
            .with_measurements(measurements.unwrap_or_default())?;
        observation.lead_notes = lead_notes;
        observation.patient_id = patient_id;
        observation.notes = notes;
        Ok(observation)
    }
}

impl From<Observation> for ObservationDraft {
    fn from(observation: Observation) -> Self {
        let leads = Lead::ALL
            .into_iter()
            .map(|lead| {
                let polarity = observation.polarity(lead);
                let entry = match observation.lead_notes.get(&lead) {
                    Some(note) => LeadEntry::Annotated {
                        polarity,
                        notes: Some(note.clone()),
                    },
                    None => LeadEntry::Polarity(polarity),
                };
                (lead, entry)
            })
            .collect();
        ObservationDraft {
            leads,
            qrs_duration_ms: Some(observation.qrs_duration_ms),
            bbb_pattern: Some(observation.bbb_pattern),
            transition_point: observation.transition_point,
            measurements: (!observation.measurements.is_empty())
                .then_some(observation.measurements),
            patient_id: observation.patient_id,
            notes: observation.notes,
        }
    }
}
