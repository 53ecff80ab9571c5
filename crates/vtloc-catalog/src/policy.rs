//! Lookup tables and thresholds that drive the pipeline.
//!
//! Every number and table the engine consults lives here and is loaded from
//! the `[policy]` section of the catalog file. Missing sections fall back to
//! the values in the `Default` impls.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vtloc_model::{
    BbbPattern, ConfidenceLevel, HorizontalAxis, Lead, Polarity, Quadrant, VerticalAxis,
};

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Policy {
    pub screening: ScreeningPolicy,
    pub vertical: VerticalPolicy,
    pub horizontal: HorizontalPolicy,
    pub quadrants: QuadrantTable,
    pub confidence: ConfidenceThresholds,
    pub discordance: DiscordancePolicy,
    pub markers: MarkerThresholds,
}

impl Policy {
    pub fn validate(&self) -> Result<()> {
        self.screening.validate()?;
        self.vertical.validate()?;
        self.horizontal.validate()?;
        self.confidence.validate()?;
        self.markers.validate()?;
        if self.markers.markedly_wide_qrs_ms <= self.screening.min_qrs_duration_ms {
            return Err(CatalogError::policy(format!(
                "markers.markedly_wide_qrs_ms ({}) must exceed screening.min_qrs_duration_ms ({})",
                self.markers.markedly_wide_qrs_ms, self.screening.min_qrs_duration_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreeningPolicy {
    /// Minimum QRS duration for a wide-complex arrhythmia.
    pub min_qrs_duration_ms: f64,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            min_qrs_duration_ms: 120.0,
        }
    }
}

impl ScreeningPolicy {
    fn validate(&self) -> Result<()> {
        if !self.min_qrs_duration_ms.is_finite() || self.min_qrs_duration_ms <= 0.0 {
            return Err(CatalogError::policy(format!(
                "screening.min_qrs_duration_ms must be positive, got {}",
                self.min_qrs_duration_ms
            )));
        }
        Ok(())
    }
}

/// How an isoelectric lead votes on the vertical axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsoelectricVote {
    #[default]
    NonPositive,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerticalPolicy {
    /// Inferior leads polled for the vertical axis.
    pub leads: Vec<Lead>,
    /// Positive votes needed for an inferior axis.
    pub min_positive: usize,
    pub isoelectric: IsoelectricVote,
}

impl Default for VerticalPolicy {
    fn default() -> Self {
        Self {
            leads: vec![Lead::II, Lead::III, Lead::AVF],
            min_positive: 2,
            isoelectric: IsoelectricVote::NonPositive,
        }
    }
}

impl VerticalPolicy {
    pub fn counts_as_positive(&self, polarity: Polarity) -> bool {
        match polarity {
            Polarity::Positive => true,
            Polarity::Negative => false,
            Polarity::Isoelectric => self.isoelectric == IsoelectricVote::Positive,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.leads.is_empty() {
            return Err(CatalogError::policy("vertical.leads must not be empty"));
        }
        let unique: BTreeSet<Lead> = self.leads.iter().copied().collect();
        if unique.len() != self.leads.len() {
            return Err(CatalogError::policy("vertical.leads contains duplicates"));
        }
        if self.min_positive == 0 || self.min_positive > self.leads.len() {
            return Err(CatalogError::policy(format!(
                "vertical.min_positive must be between 1 and {}, got {}",
                self.leads.len(),
                self.min_positive
            )));
        }
        Ok(())
    }
}

/// One row of the horizontal-axis lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HorizontalRule {
    pub polarity: Polarity,
    pub bbb: BbbPattern,
    pub axis: HorizontalAxis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HorizontalPolicy {
    pub lead: Lead,
    pub table: Vec<HorizontalRule>,
    /// Axis reported for combinations missing from `table`.
    pub fallback: HorizontalAxis,
}

impl Default for HorizontalPolicy {
    fn default() -> Self {
        use HorizontalAxis::{Leftward, Rightward};
        let rule = |polarity, bbb, axis| HorizontalRule {
            polarity,
            bbb,
            axis,
        };
        Self {
            lead: Lead::I,
            table: vec![
                rule(Polarity::Positive, BbbPattern::None, Leftward),
                rule(Polarity::Positive, BbbPattern::Lbbb, Leftward),
                rule(Polarity::Positive, BbbPattern::Rbbb, Rightward),
                rule(Polarity::Negative, BbbPattern::None, Rightward),
                rule(Polarity::Negative, BbbPattern::Lbbb, Rightward),
                rule(Polarity::Negative, BbbPattern::Rbbb, Rightward),
                rule(Polarity::Isoelectric, BbbPattern::Rbbb, Rightward),
            ],
            fallback: Rightward,
        }
    }
}

impl HorizontalPolicy {
    /// Table lookup; `None` when the combination is unmapped.
    pub fn lookup(&self, polarity: Polarity, bbb: BbbPattern) -> Option<HorizontalAxis> {
        self.table
            .iter()
            .find(|rule| rule.polarity == polarity && rule.bbb == bbb)
            .map(|rule| rule.axis)
    }

    fn validate(&self) -> Result<()> {
        for (index, rule) in self.table.iter().enumerate() {
            let duplicate = self.table[..index]
                .iter()
                .any(|earlier| earlier.polarity == rule.polarity && earlier.bbb == rule.bbb);
            if duplicate {
                return Err(CatalogError::policy(format!(
                    "horizontal.table maps ({}, {}) more than once",
                    rule.polarity, rule.bbb
                )));
            }
        }
        Ok(())
    }
}

/// One cell of the quadrant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuadrantCell {
    pub vertical: VerticalAxis,
    pub horizontal: HorizontalAxis,
    pub quadrant: Quadrant,
}

/// Total, bijective mapping from the two axes to a quadrant.
///
/// Totality and bijectivity are checked on construction, so [`Self::quadrant`]
/// has no failure case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QuadrantCell>", into = "Vec<QuadrantCell>")]
pub struct QuadrantTable {
    cells: [Quadrant; 4],
}

impl QuadrantTable {
    pub fn new(cells: &[QuadrantCell]) -> Result<Self> {
        let mut slots: [Option<Quadrant>; 4] = [None; 4];
        for cell in cells {
            let slot = &mut slots[Self::index(cell.vertical, cell.horizontal)];
            if slot.is_some() {
                return Err(CatalogError::policy(format!(
                    "quadrant table maps ({}, {}) more than once",
                    cell.vertical, cell.horizontal
                )));
            }
            *slot = Some(cell.quadrant);
        }

        let mut resolved = [Quadrant::RightUpper; 4];
        for vertical in VerticalAxis::ALL {
            for horizontal in HorizontalAxis::ALL {
                let index = Self::index(vertical, horizontal);
                resolved[index] = slots[index].ok_or_else(|| {
                    CatalogError::policy(format!(
                        "quadrant table has no entry for ({vertical}, {horizontal})"
                    ))
                })?;
            }
        }

        let distinct: BTreeSet<Quadrant> = resolved.iter().copied().collect();
        if distinct.len() != Quadrant::ALL.len() {
            return Err(CatalogError::policy(
                "quadrant table must map each axis pair to a different quadrant",
            ));
        }
        Ok(Self { cells: resolved })
    }

    fn index(vertical: VerticalAxis, horizontal: HorizontalAxis) -> usize {
        let row = match vertical {
            VerticalAxis::Inferior => 0,
            VerticalAxis::Superior => 2,
        };
        let column = match horizontal {
            HorizontalAxis::Leftward => 0,
            HorizontalAxis::Rightward => 1,
        };
        row + column
    }

    pub fn quadrant(&self, vertical: VerticalAxis, horizontal: HorizontalAxis) -> Quadrant {
        self.cells[Self::index(vertical, horizontal)]
    }

    /// Axis pair that maps to `quadrant`.
    pub fn axes(&self, quadrant: Quadrant) -> (VerticalAxis, HorizontalAxis) {
        for vertical in VerticalAxis::ALL {
            for horizontal in HorizontalAxis::ALL {
                if self.quadrant(vertical, horizontal) == quadrant {
                    return (vertical, horizontal);
                }
            }
        }
        // Unreachable for a bijective table.
        (VerticalAxis::Inferior, HorizontalAxis::Leftward)
    }

    pub fn cells(&self) -> Vec<QuadrantCell> {
        let mut cells = Vec::with_capacity(4);
        for vertical in VerticalAxis::ALL {
            for horizontal in HorizontalAxis::ALL {
                cells.push(QuadrantCell {
                    vertical,
                    horizontal,
                    quadrant: self.quadrant(vertical, horizontal),
                });
            }
        }
        cells
    }
}

impl Default for QuadrantTable {
    fn default() -> Self {
        Self {
            cells: [
                Quadrant::RightUpper,
                Quadrant::LeftUpper,
                Quadrant::RightLower,
                Quadrant::LeftLower,
            ],
        }
    }
}

impl TryFrom<Vec<QuadrantCell>> for QuadrantTable {
    type Error = String;

    fn try_from(cells: Vec<QuadrantCell>) -> std::result::Result<Self, Self::Error> {
        QuadrantTable::new(&cells).map_err(|error| error.to_string())
    }
}

impl From<QuadrantTable> for Vec<QuadrantCell> {
    fn from(table: QuadrantTable) -> Self {
        table.cells()
    }
}

/// Score cut-offs for the confidence buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfidenceThresholds {
    pub high: u8,
    pub moderate: u8,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 70,
            moderate: 40,
        }
    }
}

impl ConfidenceThresholds {
    pub fn bucket(&self, score: u8) -> ConfidenceLevel {
        if score >= self.high {
            ConfidenceLevel::High
        } else if score >= self.moderate {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    fn validate(&self) -> Result<()> {
        if self.moderate == 0 || self.moderate >= self.high || self.high > 100 {
            return Err(CatalogError::policy(format!(
                "confidence thresholds must satisfy 0 < moderate < high <= 100, got moderate={} high={}",
                self.moderate, self.high
            )));
        }
        Ok(())
    }
}

/// Whether a discordant axis pulls in boundary sites from the neighbouring
/// quadrant across that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscordancePolicy {
    pub widen_on_vertical: bool,
    pub widen_on_horizontal: bool,
}

impl Default for DiscordancePolicy {
    fn default() -> Self {
        Self {
            widen_on_vertical: true,
            widen_on_horizontal: true,
        }
    }
}

/// Cut-offs for the descriptive markers in the refined localization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerThresholds {
    /// Maximum deflection index at or above which an epicardial origin is
    /// suggested.
    pub max_deflection_index: f64,
    /// V2 transition ratio at or above which an LVOT origin is favoured.
    pub v2_transition_ratio: f64,
    /// QRS bands above the screening threshold: wide, markedly wide, very wide.
    pub markedly_wide_qrs_ms: f64,
    pub very_wide_qrs_ms: f64,
}

impl Default for MarkerThresholds {
    fn default() -> Self {
        Self {
            max_deflection_index: 0.55,
            v2_transition_ratio: 0.6,
            markedly_wide_qrs_ms: 140.0,
            very_wide_qrs_ms: 160.0,
        }
    }
}

impl MarkerThresholds {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_deflection_index", self.max_deflection_index),
            ("v2_transition_ratio", self.v2_transition_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CatalogError::policy(format!(
                    "markers.{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        if !self.markedly_wide_qrs_ms.is_finite()
            || !self.very_wide_qrs_ms.is_finite()
            || self.very_wide_qrs_ms <= self.markedly_wide_qrs_ms
        {
            return Err(CatalogError::policy(format!(
                "markers QRS bands must increase, got markedly_wide={} very_wide={}",
                self.markedly_wide_qrs_ms, self.very_wide_qrs_ms
            )));
        }
        Ok(())
    }
}
