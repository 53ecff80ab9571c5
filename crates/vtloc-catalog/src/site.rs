//! Catalog entries and their matching rules.
//!
//! Entries are read from TOML as [`SiteDef`] and compiled into [`SiteEntry`]:
//! criteria are parsed, weights range-checked and indicator descriptions
//! filled in. Only compiled entries are visible outside the crate.

use serde::{Deserialize, Serialize};
use vtloc_model::{
    AblationApproach, AnatomicalRegion, BbbPattern, HorizontalAxis, Quadrant, VerticalAxis,
};

use crate::criterion::Criterion;
use crate::error::{CatalogError, Result};

pub const HIGH_CONFIDENCE_WEIGHTS: std::ops::RangeInclusive<u8> = 1..=10;
pub const SUPPORTING_WEIGHTS: std::ops::RangeInclusive<u8> = 1..=5;

/// Block pattern as described for a site; `variable` is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypicalBbbPattern {
    #[serde(rename = "RBBB")]
    Rbbb,
    #[serde(rename = "LBBB")]
    Lbbb,
    #[serde(rename = "none")]
    None,
    #[serde(rename = "variable")]
    Variable,
}

impl TypicalBbbPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypicalBbbPattern::Rbbb => "RBBB",
            TypicalBbbPattern::Lbbb => "LBBB",
            TypicalBbbPattern::None => "none",
            TypicalBbbPattern::Variable => "variable",
        }
    }
}

/// ECG pattern usually produced by a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypicalCharacteristics {
    pub vertical_axis: VerticalAxis,
    pub horizontal_axis: HorizontalAxis,
    pub bbb_pattern: TypicalBbbPattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precordial_transition: Option<String>,
    #[serde(default)]
    pub specific_features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClinicalProfile {
    pub ablation_approach: AblationApproach,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub proximity_risks: Vec<String>,
}

/// Inclusive QRS duration bounds in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl DurationRange {
    pub fn contains(&self, duration_ms: f64) -> bool {
        self.min.is_none_or(|min| duration_ms >= min)
            && self.max.is_none_or(|max| duration_ms <= max)
    }

    pub fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("QRS {min}-{max} ms"),
            (Some(min), None) => format!("QRS >= {min} ms"),
            (None, Some(max)) => format!("QRS <= {max} ms"),
            (None, None) => "any QRS duration".to_string(),
        }
    }
}

/// Hard filters. Every field that is present must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequiredCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qrs_duration: Option<DurationRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_axis: Option<VerticalAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_axis: Option<HorizontalAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbb_pattern: Option<BbbPattern>,
}

impl RequiredCriteria {
    pub fn is_empty(&self) -> bool {
        self.qrs_duration.is_none()
            && self.vertical_axis.is_none()
            && self.horizontal_axis.is_none()
            && self.bbb_pattern.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    HighConfidence,
    Supporting,
}

/// A weighted criterion that adds to a site's score when it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub description: String,
    pub criterion: Criterion,
    pub weight: u8,
}

/// A criterion that removes a site when it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub description: String,
    pub criterion: Criterion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchingRule {
    pub required: RequiredCriteria,
    pub high_confidence: Vec<Indicator>,
    pub supporting: Vec<Indicator>,
    pub exclusions: Vec<Exclusion>,
}

impl MatchingRule {
    /// High-confidence indicators followed by supporting ones.
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        self.high_confidence.iter().chain(self.supporting.iter())
    }

    /// Sum of every declared indicator weight. Never zero for a loaded rule.
    pub fn max_weight(&self) -> u32 {
        self.indicators().map(|indicator| u32::from(indicator.weight)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteEntry {
    pub id: String,
    pub name: String,
    pub region: AnatomicalRegion,
    /// Home quadrant.
    pub quadrant: Quadrant,
    pub description: String,
    /// Site lies near a quadrant border and may be considered from the
    /// neighbouring quadrant when an axis is discordant.
    pub boundary: bool,
    pub typical: TypicalCharacteristics,
    pub clinical: ClinicalProfile,
    pub rule: MatchingRule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SiteDef {
    id: String,
    name: String,
    region: AnatomicalRegion,
    quadrant: Quadrant,
    description: String,
    #[serde(default)]
    boundary: bool,
    typical: TypicalCharacteristics,
    clinical: ClinicalProfile,
    rule: RuleDef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RuleDef {
    required: RequiredCriteria,
    high_confidence: Vec<IndicatorDef>,
    supporting: Vec<IndicatorDef>,
    exclusions: Vec<ExclusionDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndicatorDef {
    criterion: String,
    weight: u8,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ExclusionDef {
    Plain(String),
    Described {
        criterion: String,
        description: String,
    },
}

impl SiteDef {
    pub(crate) fn compile(self) -> Result<SiteEntry> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::site(&self.id, "name must not be empty"));
        }
        if self.id.trim().is_empty() {
            return Err(CatalogError::site(&name, "id must not be empty"));
        }

        let RuleDef {
            required,
            high_confidence,
            supporting,
            exclusions,
        } = self.rule;

        if let Some(range) = required.qrs_duration {
            check_duration_range(&name, range)?;
        }

        let high_confidence = compile_indicators(
            &name,
            high_confidence,
            IndicatorKind::HighConfidence,
            HIGH_CONFIDENCE_WEIGHTS,
        )?;
        let supporting = compile_indicators(
            &name,
            supporting,
            IndicatorKind::Supporting,
            SUPPORTING_WEIGHTS,
        )?;
        if high_confidence.is_empty() && supporting.is_empty() {
            return Err(CatalogError::site(
                &name,
                "rule must declare at least one indicator",
            ));
        }

        let exclusions = exclusions
            .into_iter()
            .map(|def| {
                let (criterion_text, description) = match def {
                    ExclusionDef::Plain(text) => (text.clone(), text),
                    ExclusionDef::Described {
                        criterion,
                        description,
                    } => (criterion, description),
                };
                let criterion = parse_criterion(&name, &criterion_text)?;
                Ok(Exclusion {
                    description,
                    criterion,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SiteEntry {
            id: self.id,
            name,
            region: self.region,
            quadrant: self.quadrant,
            description: self.description,
            boundary: self.boundary,
            typical: self.typical,
            clinical: self.clinical,
            rule: MatchingRule {
                required,
                high_confidence,
                supporting,
                exclusions,
            },
        })
    }
}

fn compile_indicators(
    site: &str,
    defs: Vec<IndicatorDef>,
    kind: IndicatorKind,
    weights: std::ops::RangeInclusive<u8>,
) -> Result<Vec<Indicator>> {
    defs.into_iter()
        .map(|def| {
            if !weights.contains(&def.weight) {
                return Err(CatalogError::site(
                    site,
                    format!(
                        "weight {} for '{}' is outside {}-{}",
                        def.weight,
                        def.criterion,
                        weights.start(),
                        weights.end()
                    ),
                ));
            }
            let criterion = parse_criterion(site, &def.criterion)?;
            let description = def.description.unwrap_or_else(|| criterion.to_string());
            Ok(Indicator {
                kind,
                description,
                criterion,
                weight: def.weight,
            })
        })
        .collect()
}

fn parse_criterion(site: &str, text: &str) -> Result<Criterion> {
    Criterion::parse(text).map_err(|source| CatalogError::InvalidCriterion {
        site: site.to_string(),
        source,
    })
}

fn check_duration_range(site: &str, range: DurationRange) -> Result<()> {
    for bound in [range.min, range.max].into_iter().flatten() {
        if !bound.is_finite() || bound <= 0.0 {
            return Err(CatalogError::site(
                site,
                format!("QRS duration bound {bound} must be positive"),
            ));
        }
    }
    if let (Some(min), Some(max)) = (range.min, range.max)
        && min > max
    {
        return Err(CatalogError::site(
            site,
            format!("QRS duration range {min}-{max} is inverted"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(body: &str) -> SiteDef {
        let toml = format!(
            r#"
id = "test-site"
name = "Test Site"
region = "RVOT"
quadrant = "rightUpper"
description = "A test site"

[typical]
vertical_axis = "inferior"
horizontal_axis = "leftward"
bbb_pattern = "LBBB"

[clinical]
ablation_approach = "endocardial"

{body}
"#
        );
        toml::from_str(&toml).unwrap()
    }

    #[test]
    fn compiles_rule_and_defaults_descriptions() {
        let entry = def(r#"
[rule.required]
vertical_axis = "inferior"
qrs_duration = { min = 120 }

[[rule.high_confidence]]
criterion = "transition >= V4"
weight = 8

[[rule.supporting]]
criterion = "aVL = negative"
weight = 3
description = "Negative aVL"

[[rule.exclusions]]
criterion = "bbb = RBBB"
description = "Right bundle branch block"
"#)
        .compile()
        .unwrap();

        assert_eq!(entry.rule.max_weight(), 11);
        assert_eq!(entry.rule.high_confidence[0].description, "transition >= V4");
        assert_eq!(entry.rule.supporting[0].description, "Negative aVL");
        assert_eq!(entry.rule.exclusions[0].description, "Right bundle branch block");
        assert_eq!(entry.rule.required.vertical_axis, Some(VerticalAxis::Inferior));
        assert!(entry.rule.required.qrs_duration.unwrap().contains(120.0));
    }

    #[test]
    fn plain_string_exclusions_are_accepted() {
        let entry = def(r#"
[rule]
exclusions = ["V1 = positive"]

[[rule.supporting]]
criterion = "I = positive"
weight = 2
"#)
        .compile()
        .unwrap();
        assert_eq!(entry.rule.exclusions[0].description, "V1 = positive");
    }

    #[test]
    fn rejects_out_of_range_weights() {
        let err = def(r#"
[[rule.supporting]]
criterion = "I = positive"
weight = 6
"#)
        .compile()
        .unwrap_err();
        assert!(err.to_string().contains("outside 1-5"), "{err}");
    }

    #[test]
    fn rejects_rule_without_indicators() {
        let err = def("[rule]\n").compile().unwrap_err();
        assert!(err.to_string().contains("at least one indicator"), "{err}");
    }

    #[test]
    fn rejects_malformed_criterion() {
        let err = def(r#"
[[rule.high_confidence]]
criterion = "V9 = positive"
weight = 5
"#)
        .compile()
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCriterion { .. }));
    }

    #[test]
    fn rejects_inverted_duration_range() {
        let err = def(r#"
[rule.required]
qrs_duration = { min = 180, max = 140 }

[[rule.high_confidence]]
criterion = "I = positive"
weight = 5
"#)
        .compile()
        .unwrap_err();
        assert!(err.to_string().contains("inverted"), "{err}");
    }

    #[test]
    fn duration_range_bounds_are_inclusive() {
        let range = DurationRange {
            min: Some(120.0),
            max: Some(160.0),
        };
        assert!(range.contains(120.0));
        assert!(range.contains(160.0));
        assert!(!range.contains(161.0));
        assert_eq!(range.describe(), "QRS 120-160 ms");
    }
}
