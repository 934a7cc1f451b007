//! Command-line parsing for the ex-ante real rate dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline and presentation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::DateRange;
use crate::error::AppError;
use crate::io::DEFAULT_EXPORT_FILE;

/// First day of the default fetch window.
pub const DEFAULT_START: &str = "2020-01-01";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "exante",
    version,
    about = "Short-term ex-ante real rate and expected policy-rate cuts (Banxico SIE)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, compute and print the summary, a terminal chart and the reduction estimate.
    Report(ReportArgs),
    /// Write only the ex-ante rate frame as CSV (useful for scripting).
    Export(ExportArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same pipeline as `exante report`, but renders results in a
    /// terminal UI using Ratatui. Errors are shown in the status line.
    Tui(TuiArgs),
}

/// Date range and data source options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// First date to fetch (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date, default_value = DEFAULT_START)]
    pub start: NaiveDate,

    /// Last date to fetch (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Read recorded SIE responses from `DIR/<series_id>.json` instead of the API.
    #[arg(long, value_name = "DIR")]
    pub fixtures: Option<PathBuf>,

    /// Verbose logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RangeArgs {
    /// Resolve the requested range, defaulting the end to `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange, AppError> {
        DateRange::new(self.start, self.end.unwrap_or(today))
    }
}

/// Options for the batch report.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Also export the ex-ante rate frame to this CSV file.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the CSV-only export.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Output CSV path. Writes to stdout when omitted.
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

/// Options for the dashboard.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// File written by the export key (`e`).
    #[arg(long, value_name = "CSV", default_value = DEFAULT_EXPORT_FILE)]
    pub export: PathBuf,
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_defaults() {
        let cli = Cli::try_parse_from(["exante", "report"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.range.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(args.range.end.is_none());
        assert!(!args.no_plot);
        assert_eq!(args.width, 100);
    }

    #[test]
    fn end_defaults_to_today() {
        let cli = Cli::try_parse_from(["exante", "export", "--start", "2024-01-01"]).unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        let today = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();
        let range = args.range.date_range(today).unwrap();
        assert_eq!(range.end, today);
    }

    #[test]
    fn inverted_range_is_config_error() {
        let cli = Cli::try_parse_from(["exante", "tui", "--start", "2024-06-01", "--end", "2024-01-01"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        let err = args.range.date_range(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
        assert_eq!(args.export, PathBuf::from(DEFAULT_EXPORT_FILE));
    }

    #[test]
    fn rejects_non_iso_dates() {
        assert!(Cli::try_parse_from(["exante", "report", "--start", "01/01/2020"]).is_err());
    }
}
