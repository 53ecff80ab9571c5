use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use vtloc_catalog::{DoctorReport, SiteEntry};
use vtloc_model::{AnalysisOutcome, AnalysisResult, ConfidenceLevel, SitePrediction};

use crate::types::{AnalyzeResult, BatchResult};

/// One-line description of an outcome.
pub fn outcome_headline(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::ScreeningFailed { screening } => format!(
            "{}: QRS {} ms is below the {} ms threshold",
            outcome.kind().label(),
            screening.qrs_duration_ms,
            screening.threshold_ms
        ),
        AnalysisOutcome::NoCandidateSites { result } => format!(
            "{}: no catalog site matched in the {} quadrant",
            outcome.kind().label(),
            result.quadrant.quadrant.label().to_lowercase()
        ),
        AnalysisOutcome::Localized { result } => match &result.primary_site {
            Some(primary) => format!(
                "{}: {} ({} confidence, score {})",
                outcome.kind().label(),
                primary.site,
                primary.confidence,
                primary.confidence_score
            ),
            None => outcome.kind().label().to_string(),
        },
    }
}

pub fn print_analysis(result: &AnalyzeResult) {
    println!("Observation: {}", result.source.display());
    println!("{}", outcome_headline(&result.outcome));
    if let Some(path) = &result.case_file {
        println!("Case record: {}", path.display());
    }
    let Some(analysis) = result.outcome.result() else {
        if let Some(notes) = &result.outcome.screening().notes {
            println!("{notes}");
        }
        return;
    };
    print_stages(analysis);
    if analysis.prediction_count() > 0 {
        println!();
        println!("{}", prediction_table(analysis));
        print_guidance(analysis);
    }
    if !analysis.excluded_sites.is_empty() {
        println!();
        println!("Excluded:");
        for excluded in &analysis.excluded_sites {
            println!("- {}: {}", excluded.site, excluded.reason);
        }
    }
}

fn print_stages(analysis: &AnalysisResult) {
    println!("Catalog: {}", analysis.catalog_version);
    println!();
    for line in &analysis.supporting_evidence {
        println!("- {line}");
    }
    let refined = &analysis.refined_localization;
    println!("- {}", refined.qrs_duration_analysis);
    if let Some(notes) = &refined.notes {
        println!("- {notes}");
    }
    for line in refined
        .specific_lead_characteristics
        .iter()
        .chain(&refined.special_markers)
    {
        println!("- {line}");
    }
}

pub fn prediction_table(analysis: &AnalysisResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rank"),
        header_cell("Site"),
        header_cell("Region"),
        header_cell("Quadrant"),
        header_cell("Score"),
        header_cell("Confidence"),
        header_cell("Approach"),
        header_cell("Matched features"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for (index, prediction) in analysis.predictions().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            site_cell(prediction, index == 0),
            Cell::new(prediction.region.label()),
            Cell::new(prediction.quadrant.label()),
            Cell::new(prediction.confidence_score),
            confidence_cell(prediction.confidence),
            prediction
                .clinical_implications
                .as_ref()
                .map_or_else(|| dim_cell("-"), |c| Cell::new(c.recommended_approach)),
            features_cell(&prediction.distinguishing_features),
        ]);
    }
    table
}

fn print_guidance(analysis: &AnalysisResult) {
    let Some(primary) = &analysis.primary_site else {
        return;
    };
    let Some(implications) = &primary.clinical_implications else {
        return;
    };
    println!();
    println!(
        "Primary site guidance ({} approach):",
        implications.recommended_approach
    );
    if let Some(rate) = &implications.success_rate_expectation {
        println!("- Expected success: {rate}");
    }
    for warning in &implications.proximity_warnings {
        println!("- Nearby: {warning}");
    }
    for consideration in &implications.procedural_considerations {
        println!("- Consider: {consideration}");
    }
}

pub fn print_batch_summary(result: &BatchResult) {
    println!("Batch: {}", result.source.display());
    println!(
        "Catalog: {} ({})",
        result.catalog.manifest_pins.catalog, result.catalog.source
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Line"),
        header_cell("Case"),
        header_cell("Outcome"),
        header_cell("Quadrant"),
        header_cell("Primary site"),
        header_cell("Score"),
        header_cell("Confidence"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);

    for row in &result.rows {
        match &row.outcome {
            Ok(outcome) => {
                let quadrant = outcome
                    .result()
                    .map_or_else(|| dim_cell("-"), |r| Cell::new(r.quadrant.quadrant.label()));
                let (site, score) = match outcome.primary_site() {
                    Some(primary) => (
                        Cell::new(&primary.site),
                        Cell::new(primary.confidence_score),
                    ),
                    None => (dim_cell("-"), dim_cell("-")),
                };
                table.add_row(vec![
                    Cell::new(row.line),
                    Cell::new(&row.case_id),
                    Cell::new(outcome.kind().label()),
                    quadrant,
                    site,
                    score,
                    confidence_cell(outcome.overall_confidence()),
                ]);
            }
            Err(message) => {
                table.add_row(vec![
                    Cell::new(row.line),
                    Cell::new(&row.case_id),
                    Cell::new("Error").fg(Color::Red).add_attribute(Attribute::Bold),
                    dim_cell("-"),
                    Cell::new(message).fg(Color::Red),
                    dim_cell("-"),
                    dim_cell("-"),
                ]);
            }
        }
    }
    println!("{table}");
    let errors = result.error_count();
    println!(
        "{} rows analyzed, {} failed",
        result.rows.len() - errors,
        errors
    );
}

pub fn sites_table<'a>(sites: impl IntoIterator<Item = &'a SiteEntry>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Quadrant"),
        header_cell("Site"),
        header_cell("Region"),
        header_cell("Approach"),
        header_cell("Boundary"),
        header_cell("Indicators"),
        header_cell("Exclusions"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    for site in sites {
        table.add_row(vec![
            Cell::new(site.quadrant.label()),
            Cell::new(&site.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(site.region.label()),
            Cell::new(site.clinical.ablation_approach),
            if site.boundary {
                Cell::new("yes").fg(Color::Yellow)
            } else {
                dim_cell("-")
            },
            Cell::new(site.rule.indicators().count()),
            Cell::new(site.rule.exclusions.len()),
        ]);
    }
    table
}

pub fn print_doctor(report: &DoctorReport) {
    println!("Catalog: {} ({})", report.catalog_version, report.source);
    println!("sha256: {}", report.catalog_sha256);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Check"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let counts = &report.counts;
    table.add_row(vec![Cell::new("Sites"), Cell::new(counts.sites)]);
    for (quadrant, count) in &counts.sites_per_quadrant {
        table.add_row(vec![
            Cell::new(format!("  {}", quadrant.label())).fg(Color::DarkGrey),
            Cell::new(count),
        ]);
    }
    table.add_row(vec![Cell::new("Boundary sites"), Cell::new(counts.boundary_sites)]);
    table.add_row(vec![
        Cell::new("High-confidence indicators"),
        Cell::new(counts.high_confidence_indicators),
    ]);
    table.add_row(vec![
        Cell::new("Supporting indicators"),
        Cell::new(counts.supporting_indicators),
    ]);
    table.add_row(vec![Cell::new("Exclusions"), Cell::new(counts.exclusions)]);
    table.add_row(vec![
        Cell::new("Warnings"),
        if report.warnings.is_empty() {
            dim_cell(0)
        } else {
            Cell::new(report.warnings.len())
                .fg(Color::Yellow)
                .add_attribute(Attribute::Bold)
        },
    ]);
    println!("{table}");
    for warning in &report.warnings {
        println!("warning: {}: {}", warning.site, warning.message);
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn site_cell(prediction: &SitePrediction, primary: bool) -> Cell {
    let label = if prediction.from_adjacent_quadrant {
        format!("{} (adjacent)", prediction.site)
    } else {
        prediction.site.clone()
    };
    let cell = Cell::new(label).fg(Color::Blue);
    if primary {
        cell.add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

fn confidence_cell(confidence: ConfidenceLevel) -> Cell {
    match confidence {
        ConfidenceLevel::High => Cell::new("HIGH")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        ConfidenceLevel::Moderate => Cell::new("MODERATE").fg(Color::Yellow),
        ConfidenceLevel::Low => Cell::new("LOW").fg(Color::Red),
    }
}

fn features_cell(features: &[String]) -> Cell {
    if features.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(features.join("; "))
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
