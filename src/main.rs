//! Failed Match Analyzer - reports which filenames failed regex matching
//!
//! The main entry point for the analyzer. It parses command-line arguments,
//! runs a single reporting pass over the classification log, and maps the
//! outcome to a process exit status.

use anyhow::Result;
use clap::{ArgAction, Parser};
use colored::Colorize;
use log::{info, LevelFilter};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use failed_match_analyzer::app::{self, AnalysisOutcome};
use failed_match_analyzer::config::{self, ReportConfig};
use failed_match_analyzer::utils::output_formatter::{self, ReportSummary};

/// Exit status when writing an export file fails
const EXIT_OUTPUT_FAILURE: i32 = 4;

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "failed_match_analyzer",
    version,
    about = "Summarizes regex-match failures in a filename classification log",
    long_about = "Reads the CSV log written by the filename classifier and reports, for rows whose
status contains the failure marker:
- failure totals and rate
- failures by file extension
- the most common failed names and words
- which known naming pattern, if any, sample video files match"
)]
struct Args {
    /// CSV log to analyze (default: analog/result.csv)
    #[arg(name = "input", env = "FAILED_MATCH_CSV")]
    input: Option<String>,

    /// Path to JSON configuration file
    #[arg(long = "config")]
    config: Option<String>,

    /// Status substring marking a failed row (case-insensitive)
    #[arg(long = "marker")]
    marker: Option<String>,

    /// Number of failed names to list (default: 10)
    #[arg(long = "top-stems")]
    top_stems: Option<usize>,

    /// Number of words to list (default: 20)
    #[arg(long = "top-tokens")]
    top_tokens: Option<usize>,

    /// Failed files shown per sampled extension (default: 10)
    #[arg(long = "sample-limit")]
    sample_limit: Option<usize>,

    /// Extension to sample against the pattern catalog (can be used multiple times)
    #[arg(long = "sample-ext", action = ArgAction::Append)]
    sample_ext: Option<Vec<String>>,

    /// Output in markdown format (wrapped in triple backticks)
    #[arg(long = "md", action = ArgAction::SetTrue)]
    md: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    no_color: bool,

    /// Do not print failed files while scanning
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Export the report to a JSON file
    #[arg(long = "json")]
    json: Option<String>,

    /// Export the report to a CSV file
    #[arg(long = "csv")]
    csv: Option<String>,

    /// Export the report to an HTML file
    #[arg(long = "html")]
    html: Option<String>,

    /// Set logging level (default: WARN)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Write log output to this file instead of stderr
    #[arg(long = "log-file")]
    log_file: Option<String>,
}

/// Main entry point function
fn main() {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        colored::control::set_override(false);
    }

    let config = build_config(&args);

    println!("{} {}", "Analyzing file:".bold(), config.input);

    let quiet = args.quiet;
    let outcome = app::run_report(&config, |failed| {
        if !quiet {
            println!("{}", output_formatter::format_failed_file(failed));
        }
    });

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(e.exit_code());
        }
    };

    let summary = ReportSummary::new(&outcome.report, &outcome.samples, &config);
    println!("{}", output_formatter::format_report(&summary, args.md));

    if let Err(e) = export_all_results(&summary, &args) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(EXIT_OUTPUT_FAILURE);
    }

    log_outcome(&outcome);
}

/// Set up logging to stderr, or to a file when one is given
fn setup_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(log_file) = &args.log_file {
        match File::create(log_file) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("{} cannot open log file {}: {}", "Warning:".yellow(), log_file, e),
        }
    }

    builder.init();
}

/// Merge the configuration file, environment and command line
///
/// Command-line values win over the configuration file.
fn build_config(args: &Args) -> ReportConfig {
    let mut config = config::load_config(args.config.as_deref().map(Path::new));

    if let Some(input) = &args.input {
        config.input = input.clone();
    }
    if let Some(marker) = &args.marker {
        config.marker = marker.clone();
    }
    if let Some(top_stems) = args.top_stems {
        config.top_stems = top_stems;
    }
    if let Some(top_tokens) = args.top_tokens {
        config.top_tokens = top_tokens;
    }
    if let Some(sample_limit) = args.sample_limit {
        config.sample_limit = sample_limit;
    }
    if let Some(sample_ext) = &args.sample_ext {
        config.sample_extensions = sample_ext.clone();
    }

    config.normalized()
}

/// Write every export requested on the command line
fn export_all_results(summary: &ReportSummary<'_>, args: &Args) -> Result<()> {
    if let Some(json_path) = &args.json {
        let json_path = PathBuf::from(json_path);
        output_formatter::export_results_json(summary, &json_path)?;
        info!("Wrote JSON report to {}", json_path.display());
    }

    if let Some(csv_path) = &args.csv {
        let csv_path = PathBuf::from(csv_path);
        output_formatter::create_csv_report(summary, &csv_path)?;
        info!("Wrote CSV report to {}", csv_path.display());
    }

    if let Some(html_path) = &args.html {
        let html_path = PathBuf::from(html_path);
        output_formatter::create_html_report(summary, &html_path)?;
        info!("Wrote HTML report to {}", html_path.display());
    }

    Ok(())
}

fn log_outcome(outcome: &AnalysisOutcome) {
    info!(
        "Report complete: {} records, {} failed, {} extensions, {} sampled",
        outcome.report.total_records,
        outcome.report.failed_records,
        outcome.report.extensions.len(),
        outcome.samples.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let args = Args::parse_from([
            "failed_match_analyzer",
            "logs/run.csv",
            "--marker",
            "NO_MATCH",
            "--top-tokens",
            "5",
            "--sample-ext",
            "MKV",
            "--sample-ext",
            "ts",
        ]);
        let config = build_config(&args);

        assert_eq!(config.input, "logs/run.csv");
        assert_eq!(config.marker, "NO_MATCH");
        assert_eq!(config.top_tokens, 5);
        assert_eq!(config.top_stems, 10);
        assert_eq!(config.sample_extensions, vec![".mkv", ".ts"]);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
