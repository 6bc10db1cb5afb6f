//! Integration tests for the failure analyzer
//!
//! These tests drive the public API against CSV logs on disk and check the
//! tallies, the progressive failure callback and the error kinds.

use std::path::Path;

use failed_match_analyzer::app::run_report;
use failed_match_analyzer::config::default_config;
use failed_match_analyzer::utils::output_formatter::{format_report, ReportSummary};
use failed_match_analyzer::{analyze_file, ReportConfig, ReportError};

fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write CSV file");
    path.to_string_lossy().to_string()
}

#[test]
fn test_analyze_test_file() {
    let report = analyze_file(Path::new("tests/test_data.csv")).expect("Failed to analyze test file");

    assert_eq!(report.total_records, 10);
    assert_eq!(report.failed_records, 7);
    assert_eq!(format!("{:.2}", report.failure_rate().unwrap()), "70.00");

    // The row without a filename counts as failed but is not tallied
    assert_eq!(report.extensions.total(), 6);
    assert_eq!(report.stems.total(), 6);

    let extensions: Vec<_> = report
        .extensions
        .most_common(None)
        .into_iter()
        .map(|entry| (entry.key, entry.count))
        .collect();
    assert_eq!(
        extensions,
        vec![
            (".mp4".to_string(), 3),
            (".mkv".to_string(), 1),
            (".avi".to_string(), 1),
            ("".to_string(), 1),
        ]
    );

    for (ext, files) in report.failures_by_extension() {
        assert_eq!(files.len(), report.extensions.get(ext));
    }

    assert_eq!(report.tokens.get("第二季"), 1);
    assert_eq!(report.tokens.get("part"), 1);
    assert_eq!(report.tokens.get("2"), 0);
}

#[test]
fn test_end_to_end_scenario() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = write_csv(
        &dir,
        "result.csv",
        "status,filename\n\
         ok,a.mp4\n\
         REG_MATCH_FAIL,Show.S01E02.mkv\n\
         reg_match_fail: x,随便.mp4\n",
    );

    let config = ReportConfig { input, ..default_config() };
    let mut progress = Vec::new();
    let outcome = run_report(&config, |failed| progress.push((failed.row, failed.filename.to_string())))
        .expect("Failed to run report");

    assert_eq!(outcome.report.total_records, 3);
    assert_eq!(outcome.report.failed_records, 2);
    assert_eq!(outcome.report.extensions.get(".mkv"), 1);
    assert_eq!(outcome.report.extensions.get(".mp4"), 1);
    assert_eq!(
        progress,
        vec![(2, "Show.S01E02.mkv".to_string()), (3, "随便.mp4".to_string())]
    );

    // .mp4 comes first in the sample list, .mkv second
    assert_eq!(outcome.samples.len(), 2);
    let mkv = &outcome.samples[1];
    assert_eq!(mkv.extension, ".mkv");
    let matched = mkv.files[0].matched.as_ref().expect("Show.S01E02 should match");
    assert_eq!(matched.label, "season_episode");
    assert_eq!(matched.pattern, r"S\d{1,2}E\d{1,2}");
    assert_eq!(matched.ordinal(), 2);
    assert!(outcome.samples[0].files[0].matched.is_none());

    colored::control::set_override(false);
    let summary = ReportSummary::new(&outcome.report, &outcome.samples, &config);
    let output = format_report(&summary, false);
    assert!(output.contains("Failure rate: 66.67%"));
}

#[test]
fn test_no_failures() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = write_csv(&dir, "ok.csv", "status,filename\nok,a.mp4\nmatched,b.mkv\n");

    let report = analyze_file(&input).expect("Failed to analyze file");
    assert_eq!(report.failed_records, 0);
    assert_eq!(report.failure_rate(), Some(0.0));
    assert!(report.extensions.is_empty());
    assert!(report.stems.is_empty());
    assert!(report.tokens.is_empty());
}

#[test]
fn test_custom_marker() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = write_csv(
        &dir,
        "custom.csv",
        "status,filename\nNO_MATCH,Film.mkv\nreg_match_fail,Other.mkv\n",
    );

    let config = ReportConfig {
        input,
        marker: "no_match".to_string(),
        ..default_config()
    };
    let outcome = run_report(&config, |_| {}).expect("Failed to run report");
    assert_eq!(outcome.report.failed_records, 1);
    assert_eq!(outcome.report.stems.get("Film"), 1);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("absent.csv");

    let mut progress_calls = 0;
    let config = ReportConfig {
        input: missing.to_string_lossy().to_string(),
        ..default_config()
    };
    let err = run_report(&config, |_| progress_calls += 1).unwrap_err();

    assert!(matches!(err, ReportError::MissingInput { .. }));
    assert_eq!(progress_calls, 0);
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn test_empty_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let header_only = write_csv(&dir, "header.csv", "status,filename\n");
    let err = analyze_file(&header_only).unwrap_err();
    assert!(matches!(err, ReportError::EmptyInput { .. }));

    // No header at all means the required columns are missing
    let blank = write_csv(&dir, "blank.csv", "");
    let err = analyze_file(&blank).unwrap_err();
    assert!(matches!(err, ReportError::MissingColumn { .. }));
}

#[test]
fn test_malformed_input_discards_partial_tallies() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("bad.csv");
    let mut bytes = b"status,filename\nreg_match_fail,Good.mkv\n".to_vec();
    bytes.extend_from_slice(b"reg_match_fail,\xc3\x28.mkv\n");
    std::fs::write(&path, bytes).expect("Failed to write CSV file");

    let err = analyze_file(&path).unwrap_err();
    assert!(matches!(err, ReportError::ReadOrParse { .. }));
    assert_eq!(err.exit_code(), 1);
}
