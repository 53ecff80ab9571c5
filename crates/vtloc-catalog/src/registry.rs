#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::SiteCatalog;
use crate::doctor::catalog_warnings;
use crate::error::{CatalogError, Result};
use crate::hash::sha256_hex;
use crate::manifest::{MANIFEST_FILE, MANIFEST_SCHEMA, Manifest, ManifestFile, Pins, SITE_CATALOG_ROLE};
use crate::paths::resolve_catalog_dir;

const EMBEDDED_MANIFEST: &str = include_str!("../data/v1/manifest.toml");
const EMBEDDED_CATALOG: &str = include_str!("../data/v1/sites.toml");

/// Where a loaded catalog came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum CatalogSource {
    Embedded,
    Directory(PathBuf),
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::Embedded => write!(f, "embedded"),
            CatalogSource::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifySummary {
    pub source: CatalogSource,
    pub manifest_pins: Pins,
    pub file_count: usize,
    pub catalog_sha256: String,
    pub site_count: usize,
    pub warning_count: usize,
}

/// Load the catalog from `explicit`, then `VTLOC_CATALOG_DIR`, then the
/// embedded copy.
pub fn load_catalog(explicit: Option<&Path>) -> Result<(SiteCatalog, VerifySummary)> {
    match resolve_catalog_dir(explicit) {
        Some(dir) => verify_and_load(&dir),
        None => load_embedded(),
    }
}

/// The catalog compiled into the binary, verified against its manifest.
pub fn load_embedded() -> Result<(SiteCatalog, VerifySummary)> {
    let manifest = parse_manifest(Path::new(MANIFEST_FILE), EMBEDDED_MANIFEST)?;
    validate_manifest(&manifest)?;
    let file = site_catalog_file(&manifest)?;
    let catalog_path = Path::new(&file.path);
    let sha256 = check_sha256(catalog_path, EMBEDDED_CATALOG.as_bytes(), &file.sha256)?;
    let catalog = SiteCatalog::parse(catalog_path, EMBEDDED_CATALOG)?;
    finish(catalog, &manifest, CatalogSource::Embedded, sha256)
}

/// Verify every file listed in `catalog_dir/manifest.toml` and load the site
/// catalog it names.
pub fn verify_and_load(catalog_dir: &Path) -> Result<(SiteCatalog, VerifySummary)> {
    let manifest_path = catalog_dir.join(MANIFEST_FILE);
    let contents =
        std::fs::read_to_string(&manifest_path).map_err(|e| CatalogError::io(&manifest_path, e))?;
    let manifest = parse_manifest(&manifest_path, &contents)?;
    validate_manifest(&manifest)?;

    let mut catalog_sha256 = String::new();
    let mut catalog_contents = String::new();
    for file in &manifest.files {
        let full_path = catalog_dir.join(&file.path);
        let bytes = std::fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CatalogError::MissingFile {
                    path: full_path.clone(),
                }
            } else {
                CatalogError::io(full_path.clone(), e)
            }
        })?;
        let actual = check_sha256(&full_path, &bytes, &file.sha256)?;
        if file.role == SITE_CATALOG_ROLE {
            catalog_sha256 = actual;
            catalog_contents = String::from_utf8(bytes).map_err(|e| CatalogError::InvalidManifest {
                message: format!("{} is not valid UTF-8: {e}", full_path.display()),
            })?;
        }
    }

    let catalog_path = catalog_dir.join(&site_catalog_file(&manifest)?.path);
    let catalog = SiteCatalog::parse(&catalog_path, &catalog_contents)?;
    finish(
        catalog,
        &manifest,
        CatalogSource::Directory(catalog_dir.to_path_buf()),
        catalog_sha256,
    )
}

fn finish(
    catalog: SiteCatalog,
    manifest: &Manifest,
    source: CatalogSource,
    catalog_sha256: String,
) -> Result<(SiteCatalog, VerifySummary)> {
    catalog.ensure_quadrant_coverage()?;
    if manifest.pins.catalog != catalog.version() {
        return Err(CatalogError::InvalidManifest {
            message: format!(
                "manifest pins catalog version {} but the catalog declares {}",
                manifest.pins.catalog,
                catalog.version()
            ),
        });
    }

    let warnings = catalog_warnings(&catalog);
    for warning in &warnings {
        warn!(site = %warning.site, "{}", warning.message);
    }

    info!(
        source = %source,
        version = %catalog.version(),
        sites = catalog.len(),
        warnings = warnings.len(),
        "site catalog verified"
    );

    let summary = VerifySummary {
        source,
        manifest_pins: manifest.pins.clone(),
        file_count: manifest.files.len(),
        catalog_sha256,
        site_count: catalog.len(),
        warning_count: warnings.len(),
    };
    Ok((catalog, summary))
}

fn parse_manifest(path: &Path, contents: &str) -> Result<Manifest> {
    toml::from_str(contents).map_err(|e| CatalogError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest) -> Result<()> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(CatalogError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != 1 {
        return Err(CatalogError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut roles: BTreeSet<&str> = BTreeSet::new();
    for file in &manifest.files {
        if !roles.insert(file.role.as_str()) {
            return Err(CatalogError::DuplicateRole {
                role: file.role.clone(),
            });
        }
        validate_sha(&file.sha256, &file.path)?;
        validate_path(&file.path)?;
    }

    if !roles.contains(SITE_CATALOG_ROLE) {
        return Err(CatalogError::MissingRole {
            role: SITE_CATALOG_ROLE.to_string(),
        });
    }
    Ok(())
}

fn site_catalog_file(manifest: &Manifest) -> Result<&ManifestFile> {
    manifest
        .files
        .iter()
        .find(|file| file.role == SITE_CATALOG_ROLE)
        .ok_or_else(|| CatalogError::MissingRole {
            role: SITE_CATALOG_ROLE.to_string(),
        })
}

fn check_sha256(path: &Path, bytes: &[u8], expected: &str) -> Result<String> {
    let actual = sha256_hex(bytes);
    let expected = expected.to_ascii_lowercase();
    if actual != expected {
        return Err(CatalogError::Sha256Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(actual)
}

fn validate_sha(sha: &str, path: &str) -> Result<()> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CatalogError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf> {
    if path.contains('\\') {
        return Err(CatalogError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(CatalogError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }

    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(CatalogError::InvalidPath {
            path: p,
            message: "manifest path must not leave the catalog directory".to_string(),
        });
    }

    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_verifies() {
        let (catalog, summary) = load_embedded().unwrap();
        assert_eq!(summary.source, CatalogSource::Embedded);
        assert_eq!(summary.site_count, catalog.len());
        assert_eq!(summary.manifest_pins.catalog, catalog.version());
        assert_eq!(summary.catalog_sha256, sha256_hex(EMBEDDED_CATALOG.as_bytes()));
    }

    #[test]
    fn rejects_escaping_paths() {
        assert!(validate_path("../sites.toml").is_err());
        assert!(validate_path("/etc/sites.toml").is_err());
        assert!(validate_path("nested\\sites.toml").is_err());
        assert!(validate_path("v1/sites.toml").is_ok());
    }

    #[test]
    fn rejects_short_sha() {
        assert!(validate_sha("abc", "sites.toml").is_err());
    }
}
