#![deny(unsafe_code)]

//! Localization pipeline for ventricular arrhythmia origins.
//!
//! [`analyze`] runs screening, axis resolution, quadrant assignment, rule
//! matching, ranking and clinical annotation over one [`Observation`]
//! against a loaded [`SiteCatalog`]. Every stage is a pure function; the
//! catalog is shared read-only.
//!
//! [`Observation`]: vtloc_model::Observation
//! [`SiteCatalog`]: vtloc_catalog::SiteCatalog

pub mod annotate;
pub mod axis;
pub mod error;
pub mod pipeline;
pub mod quadrant;
pub mod ranking;
pub mod refine;
pub mod rules;
pub mod screening;

pub use crate::error::{AnalysisError, Result};
pub use crate::pipeline::{analyze, analyze_draft};
pub use crate::rules::score;
