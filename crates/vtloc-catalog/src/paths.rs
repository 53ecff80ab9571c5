//! Catalog directory resolution.

use std::path::{Path, PathBuf};

/// Environment variable for overriding the catalog directory.
pub const CATALOG_ENV_VAR: &str = "VTLOC_CATALOG_DIR";

/// Pick the catalog directory to load, if any.
///
/// Resolution order:
/// 1. an explicit directory (usually the `--catalog` flag)
/// 2. `VTLOC_CATALOG_DIR` environment variable
/// 3. `None`: use the catalog embedded in the binary
pub fn resolve_catalog_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }
    std::env::var_os(CATALOG_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

