//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the series source (live API or fixtures)
//! - runs the shared pipeline
//! - prints reports/plots or hands off to the TUI
//! - writes optional exports

use std::io::Write;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Command, ExportArgs, RangeArgs, ReportArgs, TuiArgs};
use crate::data::{BanxicoClient, BanxicoConfig, FixtureSource, SeriesSource};
use crate::domain::DateRange;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `exante` binary.
pub fn run() -> Result<(), AppError> {
    // We want `exante` and `exante --start 2023-01-01` to behave like `exante tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    init_logging(args.range.verbose);
    let source = build_source(&args.range)?;
    let range = resolve_range(&args.range)?;
    let run = pipeline::run(source.as_ref(), range)?;

    println!("{}", crate::report::format_run_summary(&run));

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_ascii_plot(&run.analysis.rates, args.width, args.height)
        );
    }

    println!(
        "{}",
        crate::report::format_reduction_table(run.analysis.reduction.as_ref())
    );

    if let Some(path) = &args.export {
        crate::io::write_rate_csv_file(path, &run.analysis.rates)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    init_logging(args.range.verbose);
    let source = build_source(&args.range)?;
    let range = resolve_range(&args.range)?;
    let run = pipeline::run(source.as_ref(), range)?;

    match &args.output {
        Some(path) => crate::io::write_rate_csv_file(path, &run.analysis.rates),
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::write_rate_csv(&mut lock, &run.analysis.rates)?;
            lock.flush()
                .map_err(|e| AppError::config(format!("Failed to write CSV to stdout: {e}")))
        }
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    // No subscriber here: stderr output would corrupt the alternate screen.
    let source = build_source(&args.range)?;
    crate::tui::run(source, &args)
}

/// Pick the series source: recorded fixtures when requested, else the live API.
pub fn build_source(args: &RangeArgs) -> Result<Box<dyn SeriesSource>, AppError> {
    if let Some(dir) = &args.fixtures {
        return Ok(Box::new(FixtureSource::from_dir(dir.clone())));
    }
    let config = BanxicoConfig::from_env()?;
    Ok(Box::new(BanxicoClient::new(config)))
}

fn resolve_range(args: &RangeArgs) -> Result<DateRange, AppError> {
    args.date_range(chrono::Local::now().date_naive())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    // A subscriber may already be installed (e.g. in tests); keep that one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Rewrite argv so `exante` defaults to `exante tui`.
///
/// Rules:
/// - `exante`                          -> `exante tui`
/// - `exante --start 2023-01-01 ...`   -> `exante tui --start 2023-01-01 ...`
/// - `exante --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["exante"])), argv(&["exante", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["exante", "--start", "2023-01-01"])),
            argv(&["exante", "tui", "--start", "2023-01-01"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["exante", "report"])), argv(&["exante", "report"]));
        assert_eq!(rewrite_args(argv(&["exante", "--help"])), argv(&["exante", "--help"]));
    }

    #[test]
    fn fixtures_flag_selects_fixture_source() {
        let cli = crate::cli::Cli::try_parse_from(["exante", "report", "--fixtures", "/tmp/none"]).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert!(build_source(&args.range).is_ok());
    }
}
