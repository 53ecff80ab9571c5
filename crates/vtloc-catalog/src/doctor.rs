#![deny(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;
use vtloc_model::Quadrant;

use crate::catalog::SiteCatalog;
use crate::policy::Policy;
use crate::registry::{CatalogSource, VerifySummary};

/// Non-fatal finding about one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogWarning {
    pub site: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub schema: String,
    pub schema_version: u32,
    pub catalog_version: String,
    pub source: CatalogSource,
    pub catalog_sha256: String,
    pub policy: Policy,
    pub counts: DoctorCounts,
    pub warnings: Vec<CatalogWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorCounts {
    pub sites: usize,
    pub boundary_sites: usize,
    pub high_confidence_indicators: usize,
    pub supporting_indicators: usize,
    pub exclusions: usize,
    pub sites_per_quadrant: BTreeMap<Quadrant, usize>,
}

impl DoctorReport {
    pub fn new(catalog: &SiteCatalog, summary: &VerifySummary) -> Self {
        let sites = catalog.sites();
        Self {
            schema: "vtloc.catalog-doctor".to_string(),
            schema_version: 1,
            catalog_version: catalog.version().to_string(),
            source: summary.source.clone(),
            catalog_sha256: summary.catalog_sha256.clone(),
            policy: catalog.policy().clone(),
            counts: DoctorCounts {
                sites: sites.len(),
                boundary_sites: sites.iter().filter(|site| site.boundary).count(),
                high_confidence_indicators: sites
                    .iter()
                    .map(|site| site.rule.high_confidence.len())
                    .sum(),
                supporting_indicators: sites.iter().map(|site| site.rule.supporting.len()).sum(),
                exclusions: sites.iter().map(|site| site.rule.exclusions.len()).sum(),
                sites_per_quadrant: catalog.count_by_quadrant(),
            },
            warnings: catalog_warnings(catalog),
        }
    }
}

/// Consistency findings that do not stop a catalog from loading.
///
/// A site marked `boundary` may legitimately require or describe the axes of
/// a neighbouring quadrant, so axis findings are skipped for those.
pub fn catalog_warnings(catalog: &SiteCatalog) -> Vec<CatalogWarning> {
    let table = &catalog.policy().quadrants;
    let mut warnings = Vec::new();
    let mut push = |site: &str, message: String| {
        warnings.push(CatalogWarning {
            site: site.to_string(),
            message,
        });
    };

    for site in catalog.sites() {
        let (home_vertical, home_horizontal) = table.axes(site.quadrant);
        let required = &site.rule.required;

        if !site.boundary {
            if let Some(vertical) = required.vertical_axis
                && vertical != home_vertical
            {
                push(
                    &site.name,
                    format!(
                        "requires a {vertical} axis but is homed in {} ({home_vertical})",
                        site.quadrant
                    ),
                );
            }
            if let Some(horizontal) = required.horizontal_axis
                && horizontal != home_horizontal
            {
                push(
                    &site.name,
                    format!(
                        "requires a {horizontal} axis but is homed in {} ({home_horizontal})",
                        site.quadrant
                    ),
                );
            }
            let typical = table.quadrant(site.typical.vertical_axis, site.typical.horizontal_axis);
            if typical != site.quadrant {
                push(
                    &site.name,
                    format!(
                        "typical axes map to {typical} but the site is homed in {}",
                        site.quadrant
                    ),
                );
            }
        }

        if site.rule.high_confidence.is_empty() {
            push(&site.name, "has no high-confidence indicators".to_string());
        }

        for exclusion in &site.rule.exclusions {
            if let Some(indicator) = site
                .rule
                .indicators()
                .find(|indicator| indicator.criterion == exclusion.criterion)
            {
                push(
                    &site.name,
                    format!(
                        "indicator '{}' can never score because the same criterion is an exclusion",
                        indicator.description
                    ),
                );
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[catalog]
schema = "vtloc.site-catalog"
schema_version = 1
version = "doctor-test"

[[sites]]
id = "misplaced"
name = "Misplaced"
region = "Other"
quadrant = "rightUpper"
description = "requires superior but lives in an inferior quadrant"

[sites.typical]
vertical_axis = "inferior"
horizontal_axis = "leftward"
bbb_pattern = "none"

[sites.clinical]
ablation_approach = "endocardial"

[sites.rule.required]
vertical_axis = "superior"

[[sites.rule.supporting]]
criterion = "V1 = positive"
weight = 2

[[sites.rule.exclusions]]
criterion = "V1 = positive"
description = "positive V1"

[[sites]]
id = "edge"
name = "Edge"
region = "Other"
quadrant = "leftUpper"
description = "boundary site"
boundary = true

[sites.typical]
vertical_axis = "superior"
horizontal_axis = "rightward"
bbb_pattern = "variable"

[sites.clinical]
ablation_approach = "both"

[sites.rule.required]
vertical_axis = "superior"

[[sites.rule.high_confidence]]
criterion = "I = negative"
weight = 4
"#;

    #[test]
    fn reports_axis_and_rule_findings() {
        let catalog = SiteCatalog::from_toml_str_partial(CATALOG).unwrap();
        let warnings = catalog_warnings(&catalog);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();

        assert!(warnings.iter().all(|w| w.site == "Misplaced"), "{warnings:?}");
        assert_eq!(messages.len(), 3, "{messages:?}");
        assert_eq!(
            messages[0],
            "requires a superior axis but is homed in rightUpper (inferior)"
        );
        assert_eq!(messages[1], "has no high-confidence indicators");
        assert!(messages[2].contains("can never score"));
    }
}
