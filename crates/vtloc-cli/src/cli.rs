//! CLI argument definitions for the origin localizer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use vtloc_model::Quadrant;

#[derive(Parser)]
#[command(
    name = "vt-localizer",
    version,
    about = "Ventricular arrhythmia origin localizer",
    long_about = "Rank candidate origin sites of a wide-complex ventricular arrhythmia\n\
                  from 12-lead polarity observations.\n\n\
                  Sites and rules come from a versioned, checksummed catalog."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow observation values and patient ids in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze one observation stored as JSON.
    Analyze(AnalyzeArgs),

    /// Analyze every row of a CSV file.
    Batch(BatchArgs),

    /// List catalog sites.
    Sites(SitesArgs),

    /// Verify the catalog and report rule counts and warnings.
    Doctor(DoctorArgs),
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Catalog directory containing manifest.toml (default: $VTLOC_CATALOG_DIR,
    /// then the built-in catalog).
    #[arg(long = "catalog", value_name = "DIR")]
    pub catalog: Option<PathBuf>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Observation JSON file.
    #[arg(value_name = "OBSERVATION")]
    pub observation: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Print the outcome as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,

    /// Identifier for the case record (default: generated from the time).
    #[arg(long = "case-id", value_name = "ID")]
    pub case_id: Option<String>,

    /// Write a case record embedding the observation and outcome.
    #[arg(long = "case-out", value_name = "FILE")]
    pub case_out: Option<PathBuf>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// CSV file with one observation per row.
    #[arg(value_name = "OBSERVATIONS")]
    pub input: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Args)]
pub struct SitesArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Only list sites homed in this quadrant.
    #[arg(long = "quadrant", value_enum)]
    pub quadrant: Option<QuadrantArg>,
}

#[derive(Args)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Print the report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum QuadrantArg {
    RightUpper,
    LeftUpper,
    RightLower,
    LeftLower,
}

impl From<QuadrantArg> for Quadrant {
    fn from(arg: QuadrantArg) -> Self {
        match arg {
            QuadrantArg::RightUpper => Quadrant::RightUpper,
            QuadrantArg::LeftUpper => Quadrant::LeftUpper,
            QuadrantArg::RightLower => Quadrant::RightLower,
            QuadrantArg::LeftLower => Quadrant::LeftLower,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
