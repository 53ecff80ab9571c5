//! CSV input for batch analysis.
//!
//! One row per observation. Lead columns are named after the leads
//! (`I`, `II`, ..., `aVF`, `V1`..`V6`, case-insensitive); `qrs_duration_ms`
//! and `bbb_pattern` are required; `case_id`, `patient_id`,
//! `transition_point`, `v2_transition_ratio`, `max_deflection_index` and
//! `notes` are optional. Empty cells count as not entered.

use std::io::Read;

use anyhow::{Context, Result};
use csv::StringRecord;
use tracing::warn;
use vtloc_model::{Lead, Measurements, ObservationDraft};

/// One parsed row; `draft` is `Err` when a cell could not be parsed.
#[derive(Debug)]
pub struct BatchRow {
    pub line: u64,
    pub case_id: String,
    pub draft: std::result::Result<ObservationDraft, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Lead(Lead),
    CaseId,
    PatientId,
    QrsDuration,
    BbbPattern,
    TransitionPoint,
    V2TransitionRatio,
    MaxDeflectionIndex,
    Notes,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let normalized = header.trim().to_lowercase().replace([' ', '-'], "_");
        let column = match normalized.as_str() {
            "case_id" | "id" => Column::CaseId,
            "patient_id" => Column::PatientId,
            "qrs_duration_ms" | "qrs_duration" | "qrs" => Column::QrsDuration,
            "bbb_pattern" | "bbb" => Column::BbbPattern,
            "transition_point" | "transition" => Column::TransitionPoint,
            "v2_transition_ratio" | "v2_ratio" => Column::V2TransitionRatio,
            "max_deflection_index" | "mdi" => Column::MaxDeflectionIndex,
            "notes" => Column::Notes,
            _ => return header.parse::<Lead>().ok().map(Column::Lead),
        };
        Some(column)
    }
}

/// Read every row of a batch CSV.
///
/// An unreadable header or an I/O failure fails the whole batch. A record
/// that cannot be decoded and any bad cell are reported on their row.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<BatchRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers().context("read CSV header")?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|header| {
            let column = Column::from_header(header);
            if column.is_none() {
                warn!(column = %header, "ignoring unknown batch column");
            }
            column
        })
        .collect();

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(error) if error.is_io_error() => {
                return Err(error).with_context(|| format!("read CSV row {}", index + 1));
            }
            Err(error) => {
                let line = error
                    .position()
                    .map_or(index as u64 + 2, csv::Position::line);
                warn!(line, %error, "unreadable batch row");
                rows.push(BatchRow {
                    line,
                    case_id: format!("row-{}", index + 1),
                    draft: Err(format!("Unreadable row: {error}")),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map_or(index as u64 + 2, csv::Position::line);
        let case_id = cell(&record, &columns, Column::CaseId)
            .map_or_else(|| format!("row-{}", index + 1), str::to_string);
        rows.push(BatchRow {
            line,
            case_id,
            draft: parse_draft(&record, &columns),
        });
    }
    Ok(rows)
}

fn cell<'r>(record: &'r StringRecord, columns: &[Option<Column>], wanted: Column) -> Option<&'r str> {
    columns
        .iter()
        .position(|column| *column == Some(wanted))
        .and_then(|index| record.get(index))
        .filter(|value| !value.is_empty())
}

fn parse_draft(
    record: &StringRecord,
    columns: &[Option<Column>],
) -> std::result::Result<ObservationDraft, String> {
    let mut draft = ObservationDraft::new();
    let mut measurements = Measurements::default();

    for (column, value) in columns.iter().zip(record.iter()) {
        let Some(column) = column else { continue };
        if value.is_empty() {
            continue;
        }
        match column {
            Column::Lead(lead) => draft.set_lead(*lead, value.parse()?),
            Column::QrsDuration => {
                let duration = value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid QRS duration: {value}"))?;
                draft.qrs_duration_ms = Some(duration);
            }
            Column::BbbPattern => draft.bbb_pattern = Some(value.parse()?),
            Column::TransitionPoint => draft.transition_point = Some(value.parse()?),
            Column::V2TransitionRatio => {
                measurements.v2_transition_ratio = Some(parse_ratio("v2_transition_ratio", value)?);
            }
            Column::MaxDeflectionIndex => {
                measurements.max_deflection_index =
                    Some(parse_ratio("max_deflection_index", value)?);
            }
            Column::PatientId => draft.patient_id = Some(value.to_string()),
            Column::Notes => draft.notes = Some(value.to_string()),
            Column::CaseId => {}
        }
    }

    if !measurements.is_empty() {
        draft.measurements = Some(measurements);
    }
    Ok(draft)
}

fn parse_ratio(field: &str, value: &str) -> std::result::Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("Invalid {field}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_header_aliases() {
        assert_eq!(Column::from_header("QRS"), Some(Column::QrsDuration));
        assert_eq!(Column::from_header("avf"), Some(Column::Lead(Lead::AVF)));
        assert_eq!(Column::from_header("Case ID"), Some(Column::CaseId));
        assert_eq!(Column::from_header("heart_rate"), None);
    }
}
