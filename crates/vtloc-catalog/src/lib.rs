#![deny(unsafe_code)]

//! Versioned site catalog for origin localization.
//!
//! A catalog directory holds `manifest.toml` and the site catalog TOML it
//! pins by sha256. [`load_catalog`] resolves the directory (flag, then
//! `VTLOC_CATALOG_DIR`, then the embedded copy), verifies it and returns an
//! immutable [`SiteCatalog`].

pub mod catalog;
pub mod criterion;
pub mod doctor;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod paths;
pub mod policy;
pub mod registry;
pub mod site;

pub use crate::catalog::{CATALOG_SCHEMA, CATALOG_SCHEMA_VERSION, CatalogHeader, SiteCatalog};
pub use crate::criterion::{Criterion, CriterionError, EvalContext};
pub use crate::doctor::{CatalogWarning, DoctorReport, catalog_warnings};
pub use crate::error::CatalogError;
pub use crate::paths::{CATALOG_ENV_VAR, resolve_catalog_dir};
pub use crate::policy::{
    ConfidenceThresholds, DiscordancePolicy, HorizontalPolicy, HorizontalRule, IsoelectricVote,
    MarkerThresholds, Policy, QuadrantCell, QuadrantTable, ScreeningPolicy, VerticalPolicy,
};
pub use crate::registry::{
    CatalogSource, VerifySummary, load_catalog, load_embedded, verify_and_load,
};
pub use crate::site::{
    ClinicalProfile, DurationRange, Exclusion, Indicator, IndicatorKind, MatchingRule,
    RequiredCriteria, SiteEntry, TypicalBbbPattern, TypicalCharacteristics,
};
