//! Type-safe enumerations for the localization pipeline.
//!
//! The catalog and the analysis result both refer to these values by their
//! serialized names (`inferior`, `leftUpper`, `high`, ...), so every enum here
//! has a stable string form plus a lenient [`FromStr`] for hand-written input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Frontal-plane vertical axis derived from the inferior leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAxis {
    Inferior,
    Superior,
}

impl VerticalAxis {
    pub const ALL: [VerticalAxis; 2] = [VerticalAxis::Inferior, VerticalAxis::Superior];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAxis::Inferior => "inferior",
            VerticalAxis::Superior => "superior",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            VerticalAxis::Inferior => VerticalAxis::Superior,
            VerticalAxis::Superior => VerticalAxis::Inferior,
        }
    }
}

impl fmt::Display for VerticalAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerticalAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inferior" => Ok(VerticalAxis::Inferior),
            "superior" => Ok(VerticalAxis::Superior),
            _ => Err(format!("Unknown vertical axis: {s}")),
        }
    }
}

/// Horizontal axis derived from the lateral limb lead and block pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAxis {
    Leftward,
    Rightward,
}

impl HorizontalAxis {
    pub const ALL: [HorizontalAxis; 2] = [HorizontalAxis::Leftward, HorizontalAxis::Rightward];

    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAxis::Leftward => "leftward",
            HorizontalAxis::Rightward => "rightward",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            HorizontalAxis::Leftward => HorizontalAxis::Rightward,
            HorizontalAxis::Rightward => HorizontalAxis::Leftward,
        }
    }
}

impl fmt::Display for HorizontalAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HorizontalAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leftward" | "left" => Ok(HorizontalAxis::Leftward),
            "rightward" | "right" => Ok(HorizontalAxis::Rightward),
            _ => Err(format!("Unknown horizontal axis: {s}")),
        }
    }
}

/// Coarse anatomical region formed by crossing the two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quadrant {
    RightUpper,
    LeftUpper,
    RightLower,
    LeftLower,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::RightUpper,
        Quadrant::LeftUpper,
        Quadrant::RightLower,
        Quadrant::LeftLower,
    ];

    /// Serialized tag, as used in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::RightUpper => "rightUpper",
            Quadrant::LeftUpper => "leftUpper",
            Quadrant::RightLower => "rightLower",
            Quadrant::LeftLower => "leftLower",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::RightUpper => "Right upper",
            Quadrant::LeftUpper => "Left upper",
            Quadrant::RightLower => "Right lower",
            Quadrant::LeftLower => "Left lower",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Quadrant {
    type Err = String;

    /// Accepts the camelCase tag as well as spaced or dashed variants
    /// (`right-upper`, `Right upper`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "rightupper" => Ok(Quadrant::RightUpper),
            "leftupper" => Ok(Quadrant::LeftUpper),
            "rightlower" => Ok(Quadrant::RightLower),
            "leftlower" => Ok(Quadrant::LeftLower),
            _ => Err(format!("Unknown quadrant: {s}")),
        }
    }
}

/// Discrete confidence bucket derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Moderate => "moderate",
            ConfidenceLevel::Low => "low",
        }
    }

    /// Sort rank, higher is more confident.
    pub fn rank(&self) -> u8 {
        match self {
            ConfidenceLevel::High => 3,
            ConfidenceLevel::Moderate => 2,
            ConfidenceLevel::Low => 1,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(ConfidenceLevel::High),
            "moderate" | "medium" => Ok(ConfidenceLevel::Moderate),
            "low" => Ok(ConfidenceLevel::Low),
            _ => Err(format!("Unknown confidence level: {s}")),
        }
    }
}

/// Recommended ablation access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AblationApproach {
    Endocardial,
    Epicardial,
    Both,
}

impl AblationApproach {
    pub fn as_str(&self) -> &'static str {
        match self {
            AblationApproach::Endocardial => "endocardial",
            AblationApproach::Epicardial => "epicardial",
            AblationApproach::Both => "both",
        }
    }
}

impl fmt::Display for AblationApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Major anatomical region of an origin site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnatomicalRegion {
    /// Right ventricular outflow tract.
    #[serde(rename = "RVOT")]
    Rvot,
    /// Left ventricular outflow tract.
    #[serde(rename = "LVOT")]
    Lvot,
    AorticCusps,
    TricuspidAnnulus,
    MitralAnnulus,
    Fascicles,
    PapillaryMuscles,
    Other,
}

impl AnatomicalRegion {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnatomicalRegion::Rvot => "RVOT",
            AnatomicalRegion::Lvot => "LVOT",
            AnatomicalRegion::AorticCusps => "AorticCusps",
            AnatomicalRegion::TricuspidAnnulus => "TricuspidAnnulus",
            AnatomicalRegion::MitralAnnulus => "MitralAnnulus",
            AnatomicalRegion::Fascicles => "Fascicles",
            AnatomicalRegion::PapillaryMuscles => "PapillaryMuscles",
            AnatomicalRegion::Other => "Other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnatomicalRegion::Rvot => "Right ventricular outflow tract",
            AnatomicalRegion::Lvot => "Left ventricular outflow tract",
            AnatomicalRegion::AorticCusps => "Aortic cusps",
            AnatomicalRegion::TricuspidAnnulus => "Tricuspid annulus",
            AnatomicalRegion::MitralAnnulus => "Mitral annulus",
            AnatomicalRegion::Fascicles => "Fascicles",
            AnatomicalRegion::PapillaryMuscles => "Papillary muscles",
            AnatomicalRegion::Other => "Other",
        }
    }
}

impl fmt::Display for AnatomicalRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of the precordial transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionCategory {
    /// V1-V2.
    Early,
    /// V3.
    Intermediate,
    /// V4-V6.
    Late,
}

impl TransitionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionCategory::Early => "early",
            TransitionCategory::Intermediate => "intermediate",
            TransitionCategory::Late => "late",
        }
    }
}

impl fmt::Display for TransitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrant_from_str_variants() {
        assert_eq!("leftUpper".parse::<Quadrant>().unwrap(), Quadrant::LeftUpper);
        assert_eq!("right-lower".parse::<Quadrant>().unwrap(), Quadrant::RightLower);
        assert_eq!("Left lower".parse::<Quadrant>().unwrap(), Quadrant::LeftLower);
        assert!("center".parse::<Quadrant>().is_err());
    }

    #[test]
    fn axes_have_opposites() {
        for axis in VerticalAxis::ALL {
            assert_ne!(axis, axis.opposite());
            assert_eq!(axis, axis.opposite().opposite());
        }
        for axis in HorizontalAxis::ALL {
            assert_ne!(axis, axis.opposite());
        }
    }

    #[test]
    fn confidence_rank_orders_levels() {
        assert!(ConfidenceLevel::High.rank() > ConfidenceLevel::Moderate.rank());
        assert!(ConfidenceLevel::Moderate.rank() > ConfidenceLevel::Low.rank());
        assert_eq!(
            "medium".parse::<ConfidenceLevel>().unwrap(),
            ConfidenceLevel::Moderate
        );
    }
}
