#![deny(unsafe_code)]

use std::path::PathBuf;

use vtloc_model::Quadrant;

use crate::criterion::CriterionError;

/// Failures while loading or checking a site catalog.
///
/// All of these are fatal at startup: an engine never runs against a catalog
/// that failed to load.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported catalog: {message}")]
    UnsupportedSchema { message: String },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("missing required role in manifest: {role}")]
    MissingRole { role: String },

    #[error("duplicate role in manifest: {role}")]
    DuplicateRole { role: String },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("missing file listed in manifest: {path}")]
    MissingFile { path: PathBuf },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid policy: {message}")]
    InvalidPolicy { message: String },

    #[error("invalid site '{site}': {message}")]
    InvalidSite { site: String, message: String },

    #[error("invalid criterion in site '{site}': {source}")]
    InvalidCriterion {
        site: String,
        #[source]
        source: CriterionError,
    },

    #[error("duplicate site name: {name}")]
    DuplicateSite { name: String },

    #[error("no sites are homed in quadrant {quadrant}")]
    EmptyQuadrant { quadrant: Quadrant },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn policy(message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            message: message.into(),
        }
    }

    pub(crate) fn site(site: &str, message: impl Into<String>) -> Self {
        Self::InvalidSite {
            site: site.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
