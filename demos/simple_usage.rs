//! Simple example demonstrating how to use the Failed Match Analyzer library

use anyhow::Result;
use failed_match_analyzer::{analyze_file, PATTERN_CATALOG};

fn main() -> Result<()> {
    // Path to the log for analysis
    let file_path = std::env::temp_dir().join("failed_match_sample.csv");

    // Create sample log
    std::fs::write(
        &file_path,
        "status,filename\n\
         ok,Movie.2019.mkv\n\
         reg_match_fail,Show.S01E02.mkv\n\
         reg_match_fail,家庭录像.mp4\n\
         REG_MATCH_FAIL: no title,Concert Part 2.avi\n",
    )?;

    println!("Analyzing file: {}", file_path.display());

    let report = analyze_file(&file_path)?;

    println!(
        "{} of {} records failed ({:.2}%)",
        report.failed_records,
        report.total_records,
        report.failure_rate().unwrap_or_default()
    );

    // Display failures per extension and the first matching naming pattern
    for (ext, files) in report.failures_by_extension() {
        println!("\n{} ({} failed):", ext, files.len());
        for file in files {
            let stem = failed_match_analyzer::utils::file_utils::stem(file);
            match PATTERN_CATALOG.first_match(stem) {
                Some(found) => println!("  - {} -> {}", file, found.label),
                None => println!("  - {} -> no known pattern", file),
            }
        }
    }

    Ok(())
}
