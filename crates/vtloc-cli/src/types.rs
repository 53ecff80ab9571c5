use std::path::PathBuf;

use vtloc_catalog::VerifySummary;
use vtloc_model::AnalysisOutcome;

#[derive(Debug)]
pub struct AnalyzeResult {
    pub source: PathBuf,
    pub outcome: AnalysisOutcome,
    pub case_file: Option<PathBuf>,
}

#[derive(Debug)]
pub struct BatchResult {
    pub source: PathBuf,
    pub catalog: VerifySummary,
    pub rows: Vec<BatchRowResult>,
}

impl BatchResult {
    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|row| row.outcome.is_err()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

#[derive(Debug)]
pub struct BatchRowResult {
    /// 1-based line in the source file, header included.
    pub line: u64,
    pub case_id: String,
    pub outcome: Result<AnalysisOutcome, String>,
}
