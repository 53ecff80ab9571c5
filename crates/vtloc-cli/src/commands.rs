use std::fs::File;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, info_span, trace, warn};
use vtloc_catalog::{DoctorReport, SiteCatalog, VerifySummary, load_catalog};
use vtloc_cli::batch::read_rows;
use vtloc_cli::logging::{log_data_enabled, redact_value};
use vtloc_cli::summary::{print_doctor, sites_table};
use vtloc_cli::types::{AnalyzeResult, BatchResult, BatchRowResult};
use vtloc_engine::{analyze, analyze_draft};
use vtloc_model::{CaseRecord, Observation, ObservationDraft, Quadrant};

use crate::cli::{AnalyzeArgs, BatchArgs, CatalogArgs, DoctorArgs, SitesArgs};

fn load(args: &CatalogArgs) -> Result<(SiteCatalog, VerifySummary)> {
    load_catalog(args.catalog.as_deref()).context("load site catalog")
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalyzeResult> {
    let (catalog, _) = load(&args.catalog)?;
    let span = info_span!("analyze_file", path = %args.observation.display());
    let _guard = span.enter();

    let draft = read_draft(&args.observation)?;
    let completeness = draft.completeness();
    debug!(
        patient_id = %redact_value(draft.patient_id.as_deref().unwrap_or("-")),
        percentage = completeness.percentage,
        "observation loaded"
    );
    let observation = Observation::try_from(draft)
        .with_context(|| format!("validate {}", args.observation.display()))?;
    if log_data_enabled() {
        trace!(observation = ?observation, "observation values");
    }

    let outcome = analyze(&observation, &catalog)
        .with_context(|| format!("analyze {}", args.observation.display()))?;

    let case_file = match &args.case_out {
        Some(path) => {
            let id = args.case_id.clone().unwrap_or_else(generated_case_id);
            let record = CaseRecord::new(id, observation, outcome.clone());
            write_case(path, &record)?;
            info!(case_id = %record.id, path = %path.display(), "case record written");
            Some(path.clone())
        }
        None => {
            if args.case_id.is_some() {
                warn!("--case-id has no effect without --case-out");
            }
            None
        }
    };

    Ok(AnalyzeResult {
        source: args.observation.clone(),
        outcome,
        case_file,
    })
}

pub fn run_batch(args: &BatchArgs) -> Result<BatchResult> {
    let (catalog, summary) = load(&args.catalog)?;
    let span = info_span!("batch", path = %args.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let file = File::open(&args.input).with_context(|| format!("open {}", args.input.display()))?;
    let rows = read_rows(file).with_context(|| format!("read {}", args.input.display()))?;

    let results: Vec<BatchRowResult> = rows
        .into_iter()
        .map(|row| {
            let outcome = row.draft.and_then(|draft| {
                analyze_draft(draft, &catalog).map_err(|error| error.to_string())
            });
            if let Err(message) = &outcome {
                warn!(line = row.line, case_id = %row.case_id, %message, "row failed");
            }
            BatchRowResult {
                line: row.line,
                case_id: row.case_id,
                outcome,
            }
        })
        .collect();

    let result = BatchResult {
        source: args.input.clone(),
        catalog: summary,
        rows: results,
    };
    info!(
        rows = result.rows.len(),
        errors = result.error_count(),
        duration_ms = start.elapsed().as_millis(),
        "batch complete"
    );
    Ok(result)
}

pub fn run_sites(args: &SitesArgs) -> Result<()> {
    let (catalog, summary) = load(&args.catalog)?;
    let quadrant = args.quadrant.map(Quadrant::from);
    let sites = catalog
        .sites()
        .iter()
        .filter(|site| quadrant.is_none_or(|q| site.quadrant == q));
    println!("Catalog: {} ({})", catalog.version(), summary.source);
    println!("{}", sites_table(sites));
    Ok(())
}

pub fn run_doctor(args: &DoctorArgs) -> Result<()> {
    let (catalog, summary) = load(&args.catalog)?;
    let report = DoctorReport::new(&catalog, &summary);
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("serialize doctor report")?;
        println!("{json}");
    } else {
        print_doctor(&report);
    }
    Ok(())
}

fn read_draft(path: &Path) -> Result<ObservationDraft> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

fn write_case(path: &Path, record: &CaseRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("serialize case record")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

fn generated_case_id() -> String {
    format!("case-{}", Utc::now().format("%Y%m%dT%H%M%S"))
}
