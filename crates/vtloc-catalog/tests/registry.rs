use std::fs;
use std::path::{Path, PathBuf};

use vtloc_catalog::hash::sha256_hex;
use vtloc_catalog::{
    CatalogError, CatalogSource, DoctorReport, SiteCatalog, catalog_warnings, load_catalog,
    load_embedded, verify_and_load,
};
use vtloc_model::{AblationApproach, Quadrant};

const BUNDLED_SITES: &str = include_str!("../data/v1/sites.toml");

fn unique_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "vtloc-catalog-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn manifest(sha256: &str, pin: &str) -> String {
    format!(
        r#"[manifest]
schema = "vtloc.catalog-manifest"
schema_version = 1

[pins]
catalog = "{pin}"

[[files]]
path = "sites.toml"
sha256 = "{sha256}"
role = "site_catalog"
"#
    )
}

fn catalog_dir(name: &str) -> PathBuf {
    let dir = unique_temp_dir(name);
    write(&dir.join("sites.toml"), BUNDLED_SITES.as_bytes());
    let sha = sha256_hex(BUNDLED_SITES.as_bytes());
    write(&dir.join("manifest.toml"), manifest(&sha, "2025.1").as_bytes());
    dir
}

#[test]
fn bundled_catalog_has_twenty_sites_across_quadrants() {
    let (catalog, summary) = load_embedded().expect("embedded catalog");
    assert_eq!(catalog.len(), 20);
    assert_eq!(catalog.version(), "2025.1");
    assert_eq!(summary.warning_count, 0);

    let counts = catalog.count_by_quadrant();
    assert_eq!(counts[&Quadrant::RightUpper], 4);
    assert_eq!(counts[&Quadrant::LeftUpper], 6);
    assert_eq!(counts[&Quadrant::RightLower], 4);
    assert_eq!(counts[&Quadrant::LeftLower], 6);

    let summit = catalog.get("LV Summit").expect("LV Summit");
    assert_eq!(summit.clinical.ablation_approach, AblationApproach::Epicardial);
    assert!(summit.boundary);
    assert!(catalog_warnings(&catalog).is_empty());
}

#[test]
fn bundled_catalog_policy_matches_defaults() {
    let (catalog, _) = load_embedded().unwrap();
    assert_eq!(catalog.policy(), &vtloc_catalog::Policy::default());
}

#[test]
fn verify_and_load_reads_directory() {
    let dir = catalog_dir("ok");
    let (catalog, summary) = verify_and_load(&dir).expect("verify_and_load should succeed");
    assert_eq!(summary.source, CatalogSource::Directory(dir.clone()));
    assert_eq!(summary.file_count, 1);
    assert_eq!(catalog.len(), 20);

    let (explicit, _) = load_catalog(Some(dir.as_path())).unwrap();
    assert_eq!(explicit, catalog);
}

#[test]
fn tampered_catalog_fails_checksum() {
    let dir = catalog_dir("tampered");
    let tampered = BUNDLED_SITES.replace("weight = 8", "weight = 9");
    write(&dir.join("sites.toml"), tampered.as_bytes());
    let err = verify_and_load(&dir).unwrap_err();
    assert!(matches!(err, CatalogError::Sha256Mismatch { .. }), "{err}");
}

#[test]
fn missing_catalog_file_is_reported() {
    let dir = catalog_dir("missing");
    fs::remove_file(dir.join("sites.toml")).unwrap();
    let err = verify_and_load(&dir).unwrap_err();
    assert!(matches!(err, CatalogError::MissingFile { .. }), "{err}");
}

#[test]
fn version_pin_must_match() {
    let dir = catalog_dir("pin");
    let sha = sha256_hex(BUNDLED_SITES.as_bytes());
    write(&dir.join("manifest.toml"), manifest(&sha, "2024.9").as_bytes());
    let err = verify_and_load(&dir).unwrap_err();
    assert!(err.to_string().contains("2024.9"), "{err}");
}

#[test]
fn doctor_report_counts_rules() {
    let dir = catalog_dir("doctor");
    let (catalog, summary) = verify_and_load(&dir).unwrap();
    let report = DoctorReport::new(&catalog, &summary);
    assert_eq!(report.counts.sites, 20);
    assert_eq!(report.counts.boundary_sites, 5);
    assert_eq!(report.catalog_sha256, sha256_hex(BUNDLED_SITES.as_bytes()));

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["counts"]["sites_per_quadrant"]["leftUpper"], 6);
    assert_eq!(value["source"]["kind"], "directory");
    assert_eq!(value["policy"]["confidence"]["high"], 70);
}

#[test]
fn criteria_are_rendered_in_site_listing() {
    let catalog = SiteCatalog::from_toml_str(BUNDLED_SITES).unwrap();
    let posterior = catalog.get("posterior-rvot").unwrap();
    let value = serde_json::to_value(posterior).unwrap();
    assert_eq!(
        value["rule"]["high_confidence"][1]["criterion"],
        "I = positive & aVL = negative"
    );
    assert_eq!(value["rule"]["exclusions"][0]["criterion"], "transition <= V2");
}
