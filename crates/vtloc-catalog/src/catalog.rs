#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vtloc_model::Quadrant;

use crate::error::{CatalogError, Result};
use crate::policy::Policy;
use crate::site::{SiteDef, SiteEntry};

pub const CATALOG_SCHEMA: &str = "vtloc.site-catalog";
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogHeader {
    pub schema: String,
    pub schema_version: u32,
    /// Content version, pinned by the directory manifest.
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl CatalogHeader {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            schema: CATALOG_SCHEMA.to_string(),
            schema_version: CATALOG_SCHEMA_VERSION,
            version: version.into(),
            summary: None,
        }
    }

    fn check(&self) -> Result<()> {
        if self.schema != CATALOG_SCHEMA {
            return Err(CatalogError::UnsupportedSchema {
                message: format!("unsupported schema: {}", self.schema),
            });
        }
        if self.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(CatalogError::UnsupportedSchema {
                message: format!("unsupported schema_version: {}", self.schema_version),
            });
        }
        if self.version.trim().is_empty() {
            return Err(CatalogError::UnsupportedSchema {
                message: "catalog version must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    catalog: CatalogHeader,
    #[serde(default)]
    policy: Policy,
    #[serde(default)]
    sites: Vec<SiteDef>,
}

/// Immutable set of candidate sites plus the policy tables.
///
/// Loaded once at startup and shared read-only by every analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteCatalog {
    header: CatalogHeader,
    policy: Policy,
    sites: Vec<SiteEntry>,
}

impl SiteCatalog {
    /// Parse a complete catalog: every quadrant must home at least one site.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let catalog = Self::from_toml_str_partial(contents)?;
        catalog.ensure_quadrant_coverage()?;
        Ok(catalog)
    }

    /// Parse a catalog that may leave quadrants empty, such as a fixture or
    /// a catalog still under review. All other integrity checks apply.
    pub fn from_toml_str_partial(contents: &str) -> Result<Self> {
        Self::parse(Path::new("<inline>"), contents)
    }

    pub(crate) fn parse(path: &Path, contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents).map_err(|source| CatalogError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        file.catalog.check()?;
        let sites = file
            .sites
            .into_iter()
            .map(SiteDef::compile)
            .collect::<Result<Vec<_>>>()?;
        let catalog = Self::from_parts(file.catalog, file.policy, sites)?;
        debug!(
            path = %path.display(),
            version = %catalog.version(),
            sites = catalog.len(),
            "parsed site catalog"
        );
        Ok(catalog)
    }

    /// Assemble a catalog from compiled parts. Checks the policy and name
    /// uniqueness but not quadrant coverage.
    pub fn from_parts(header: CatalogHeader, policy: Policy, sites: Vec<SiteEntry>) -> Result<Self> {
        policy.validate()?;
        let mut names = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for site in &sites {
            if !names.insert(site.name.to_lowercase()) {
                return Err(CatalogError::DuplicateSite {
                    name: site.name.clone(),
                });
            }
            if !ids.insert(site.id.to_lowercase()) {
                return Err(CatalogError::site(
                    &site.name,
                    format!("id '{}' is used by another site", site.id),
                ));
            }
            if site.rule.max_weight() == 0 {
                return Err(CatalogError::site(
                    &site.name,
                    "rule must declare at least one indicator",
                ));
            }
        }
        for site in &sites {
            let id = site.id.to_lowercase();
            if names.contains(&id) && site.name.to_lowercase() != id {
                return Err(CatalogError::site(
                    &site.name,
                    format!("id '{}' is the name of another site", site.id),
                ));
            }
        }
        Ok(Self {
            header,
            policy,
            sites,
        })
    }

    pub fn ensure_quadrant_coverage(&self) -> Result<()> {
        let counts = self.count_by_quadrant();
        for quadrant in Quadrant::ALL {
            if counts.get(&quadrant).copied().unwrap_or(0) == 0 {
                return Err(CatalogError::EmptyQuadrant { quadrant });
            }
        }
        info!(
            version = %self.version(),
            sites = self.len(),
            "site catalog covers all quadrants"
        );
        Ok(())
    }

    pub fn header(&self) -> &CatalogHeader {
        &self.header
    }

    pub fn version(&self) -> &str {
        &self.header.version
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// All sites in catalog order.
    pub fn sites(&self) -> &[SiteEntry] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Sites homed in `quadrant`, in catalog order.
    pub fn sites_in(&self, quadrant: Quadrant) -> impl Iterator<Item = &SiteEntry> {
        self.sites.iter().filter(move |site| site.quadrant == quadrant)
    }

    /// Look up a site by name or id, ignoring case.
    pub fn get(&self, key: &str) -> Option<&SiteEntry> {
        self.sites
            .iter()
            .find(|site| site.name.eq_ignore_ascii_case(key) || site.id.eq_ignore_ascii_case(key))
    }

    /// The site with exactly this display name.
    pub fn by_name(&self, name: &str) -> Option<&SiteEntry> {
        self.sites.iter().find(|site| site.name == name)
    }

    pub fn count_by_quadrant(&self) -> BTreeMap<Quadrant, usize> {
        let mut counts: BTreeMap<Quadrant, usize> =
            Quadrant::ALL.into_iter().map(|quadrant| (quadrant, 0)).collect();
        for site in &self.sites {
            *counts.entry(site.quadrant).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"
[catalog]
schema = "vtloc.site-catalog"
schema_version = 1
version = "test-1"
"#;

    fn site(id: &str, name: &str, quadrant: &str) -> String {
        format!(
            r#"
[[sites]]
id = "{id}"
name = "{name}"
region = "Other"
quadrant = "{quadrant}"
description = "fixture"

[sites.typical]
vertical_axis = "inferior"
horizontal_axis = "leftward"
bbb_pattern = "none"

[sites.clinical]
ablation_approach = "endocardial"

[[sites.rule.high_confidence]]
criterion = "I = positive"
weight = 5
"#
        )
    }

    fn full_catalog() -> String {
        let mut contents = HEADER.to_string();
        for (index, quadrant) in Quadrant::ALL.iter().enumerate() {
            contents.push_str(&site(&format!("s{index}"), &format!("Site {index}"), quadrant.as_str()));
        }
        contents
    }

    #[test]
    fn parses_minimal_catalog_with_default_policy() {
        let catalog = SiteCatalog::from_toml_str(&full_catalog()).unwrap();
        assert_eq!(catalog.version(), "test-1");
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.policy(), &Policy::default());
        assert_eq!(catalog.sites_in(Quadrant::LeftLower).count(), 1);
        assert_eq!(catalog.get("site 2").unwrap().id, "s2");
        assert_eq!(catalog.get("S3").unwrap().name, "Site 3");
    }

    #[test]
    fn empty_quadrant_is_rejected_unless_partial() {
        let contents = format!("{HEADER}{}", site("a", "Alpha", "rightUpper"));
        let err = SiteCatalog::from_toml_str(&contents).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyQuadrant { .. }));

        let partial = SiteCatalog::from_toml_str_partial(&contents).unwrap();
        assert_eq!(partial.count_by_quadrant()[&Quadrant::LeftLower], 0);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let contents = format!(
            "{HEADER}{}{}",
            site("a", "Alpha", "rightUpper"),
            site("b", "ALPHA", "leftUpper")
        );
        let err = SiteCatalog::from_toml_str_partial(&contents).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSite { .. }));
    }

    #[test]
    fn id_shadowing_another_name_is_rejected() {
        let contents = format!(
            "{HEADER}{}{}",
            site("beta site", "Alpha Site", "rightUpper"),
            site("b", "Beta Site", "rightUpper")
        );
        let err = SiteCatalog::from_toml_str_partial(&contents).unwrap_err();
        assert!(err.to_string().contains("is the name of another site"), "{err}");

        let own_name = format!("{HEADER}{}", site("alpha", "Alpha", "rightUpper"));
        assert!(SiteCatalog::from_toml_str_partial(&own_name).is_ok());
    }

    #[test]
    fn by_name_ignores_ids() {
        let catalog = SiteCatalog::from_toml_str(&full_catalog()).unwrap();
        assert_eq!(catalog.by_name("Site 1").unwrap().id, "s1");
        assert!(catalog.by_name("s1").is_none());
        assert!(catalog.by_name("site 1").is_none());
    }

    #[test]
    fn wrong_schema_is_rejected() {
        let contents = full_catalog().replace("vtloc.site-catalog", "other.catalog");
        let err = SiteCatalog::from_toml_str(&contents).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedSchema { .. }));
    }

    #[test]
    fn policy_section_overrides_defaults() {
        let contents = format!(
            "{HEADER}\n[policy.confidence]\nhigh = 80\nmoderate = 50\n\n[policy.vertical]\nmin_positive = 3\n{}",
            full_catalog().trim_start_matches(HEADER)
        );
        let catalog = SiteCatalog::from_toml_str(&contents).unwrap();
        assert_eq!(catalog.policy().confidence.high, 80);
        assert_eq!(catalog.policy().vertical.min_positive, 3);
        assert_eq!(catalog.policy().vertical.leads.len(), 3);
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let contents = format!(
            "{HEADER}\n[policy.confidence]\nhigh = 30\nmoderate = 50\n{}",
            full_catalog().trim_start_matches(HEADER)
        );
        let err = SiteCatalog::from_toml_str(&contents).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPolicy { .. }));
    }
}
