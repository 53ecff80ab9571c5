//! Lead names, QRS polarity and bundle-branch-block patterns.
//!
//! These are the vocabulary of an [`Observation`](crate::Observation): one
//! polarity per standard lead, the block pattern, and the precordial lead at
//! which the R wave first exceeds the S wave.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the 12 standard ECG leads.
///
/// The declaration order is the conventional display order (limb leads, then
/// precordial leads) and is used as the storage index in an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lead {
    I,
    II,
    III,
    #[serde(rename = "aVR")]
    AVR,
    #[serde(rename = "aVL")]
    AVL,
    #[serde(rename = "aVF")]
    AVF,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl Lead {
    /// Number of leads in a standard recording.
    pub const COUNT: usize = 12;

    /// All leads in display order.
    pub const ALL: [Lead; Lead::COUNT] = [
        Lead::I,
        Lead::II,
        Lead::III,
        Lead::AVR,
        Lead::AVL,
        Lead::AVF,
        Lead::V1,
        Lead::V2,
        Lead::V3,
        Lead::V4,
        Lead::V5,
        Lead::V6,
    ];

    /// Position of this lead in [`Lead::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the conventional lead label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lead::I => "I",
            Lead::II => "II",
            Lead::III => "III",
            Lead::AVR => "aVR",
            Lead::AVL => "aVL",
            Lead::AVF => "aVF",
            Lead::V1 => "V1",
            Lead::V2 => "V2",
            Lead::V3 => "V3",
            Lead::V4 => "V4",
            Lead::V5 => "V5",
            Lead::V6 => "V6",
        }
    }

    /// Returns true for the chest leads V1-V6.
    pub fn is_precordial(&self) -> bool {
        self.index() >= Lead::V1.index()
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Lead {
    type Err = String;

    /// Parse a lead label (case-insensitive, so `AVF` and `aVF` both work).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        Lead::ALL
            .into_iter()
            .find(|lead| lead.as_str().to_uppercase() == normalized)
            .ok_or_else(|| format!("Unknown lead: {s}"))
    }
}

/// Dominant deflection of a lead's QRS complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Isoelectric,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
            Polarity::Isoelectric => "isoelectric",
        }
    }

    /// Single-character symbol used in compact tables.
    pub fn symbol(&self) -> &'static str {
        match self {
            Polarity::Positive => "+",
            Polarity::Negative => "-",
            Polarity::Isoelectric => "=",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" | "+" => Ok(Polarity::Positive),
            "negative" | "neg" | "-" => Ok(Polarity::Negative),
            "isoelectric" | "iso" | "biphasic" | "=" | "0" => Ok(Polarity::Isoelectric),
            _ => Err(format!("Unknown polarity: {s}")),
        }
    }
}

/// Bundle-branch-block morphology of the QRS complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BbbPattern {
    /// Right bundle-branch-block morphology.
    #[serde(rename = "RBBB")]
    Rbbb,
    /// Left bundle-branch-block morphology.
    #[serde(rename = "LBBB")]
    Lbbb,
    #[serde(rename = "none")]
    None,
}

impl BbbPattern {
    pub const ALL: [BbbPattern; 3] = [BbbPattern::Rbbb, BbbPattern::Lbbb, BbbPattern::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            BbbPattern::Rbbb => "RBBB",
            BbbPattern::Lbbb => "LBBB",
            BbbPattern::None => "none",
        }
    }
}

impl fmt::Display for BbbPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BbbPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RBBB" => Ok(BbbPattern::Rbbb),
            "LBBB" => Ok(BbbPattern::Lbbb),
            "NONE" | "" => Ok(BbbPattern::None),
            _ => Err(format!("Unknown bundle branch block pattern: {s}")),
        }
    }
}

/// Precordial lead at which the R wave first exceeds the S wave.
///
/// Ordered from V1 to V6 so that "transition at or before V3" is a plain
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransitionPoint {
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl TransitionPoint {
    pub const ALL: [TransitionPoint; 6] = [
        TransitionPoint::V1,
        TransitionPoint::V2,
        TransitionPoint::V3,
        TransitionPoint::V4,
        TransitionPoint::V5,
        TransitionPoint::V6,
    ];

    pub fn as_str(&self) -> &'static str {
        self.lead().as_str()
    }

    /// The precordial lead this transition point refers to.
    pub fn lead(&self) -> Lead {
        match self {
            TransitionPoint::V1 => Lead::V1,
            TransitionPoint::V2 => Lead::V2,
            TransitionPoint::V3 => Lead::V3,
            TransitionPoint::V4 => Lead::V4,
            TransitionPoint::V5 => Lead::V5,
            TransitionPoint::V6 => Lead::V6,
        }
    }
}

impl fmt::Display for TransitionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransitionPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lead: Lead = s.parse()?;
        TransitionPoint::try_from(lead)
    }
}

impl TryFrom<Lead> for TransitionPoint {
    type Error = String;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        TransitionPoint::ALL
            .into_iter()
            .find(|point| point.lead() == lead)
            .ok_or_else(|| format!("{lead} is not a precordial lead"))
    }
}
