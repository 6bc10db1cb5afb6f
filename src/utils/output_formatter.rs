//! Output formatter for failure reports
//!
//! This module renders a `FailureReport` for the console and exports it as JSON,
//! CSV or an HTML page.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use handlebars::Handlebars;
use serde::Serialize;

use crate::config::ReportConfig;
use crate::core::analyzer::{ExtensionSample, FailedFile, FailureReport};
use crate::core::tally::TallyEntry;

/// Label used for files without an extension
const NO_EXTENSION: &str = "(no extension)";

/// Serializable view of a report, shared by every output format
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub source: &'a str,
    pub generated_at: String,
    pub total_records: usize,
    pub failed_records: usize,
    pub failure_rate: Option<f64>,
    pub extensions: Vec<TallyEntry>,
    pub top_stems: Vec<TallyEntry>,
    pub top_tokens: Vec<TallyEntry>,
    pub samples: &'a [ExtensionSample],
}

impl<'a> ReportSummary<'a> {
    /// Rank the report's tallies using the configured limits
    pub fn new(report: &'a FailureReport, samples: &'a [ExtensionSample], config: &ReportConfig) -> Self {
        Self {
            source: &report.source,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total_records: report.total_records,
            failed_records: report.failed_records,
            failure_rate: report.failure_rate(),
            extensions: report.extensions.most_common(None),
            top_stems: report.stems.most_common(Some(config.top_stems)),
            top_tokens: report.tokens.most_common(Some(config.top_tokens)),
            samples,
        }
    }

    /// Failure rate with two decimals, e.g. `66.67%`
    pub fn failure_rate_display(&self) -> String {
        match self.failure_rate {
            Some(rate) => format!("{:.2}%", rate),
            None => "n/a".to_string(),
        }
    }
}

fn extension_label(ext: &str) -> &str {
    if ext.is_empty() {
        NO_EXTENSION
    } else {
        ext
    }
}

/// Line printed for each failed filename while the log is being scanned
pub fn format_failed_file(failed: &FailedFile<'_>) -> String {
    format!("{} {}", "Failed file:".red(), failed.filename)
}

/// Format a report for console output
///
/// Sections follow scan order: totals, extensions, stems, tokens, then the
/// sampled extensions with their first matching catalog pattern.
pub fn format_report(summary: &ReportSummary<'_>, use_markdown: bool) -> String {
    let mut output = String::new();

    if use_markdown {
        output.push_str("```\n");
    }

    output.push_str(&format!("\n{}\n", "=== Analysis Results ===".yellow().bold()));
    output.push_str(&format!("{} {}\n", "Total records:".green(), summary.total_records));
    output.push_str(&format!("{} {}\n", "Regex match failures:".green(), summary.failed_records));
    output.push_str(&format!("{} {}\n", "Failure rate:".green(), summary.failure_rate_display()));

    output.push_str(&format!("\n{}\n", "=== Failures by Extension ===".yellow().bold()));
    for entry in &summary.extensions {
        output.push_str(&format!("{}: {} files\n", extension_label(&entry.key).cyan(), entry.count));
    }

    output.push_str(&format!("\n{}\n", "=== Most Common Failed Names ===".yellow().bold()));
    for entry in &summary.top_stems {
        output.push_str(&format!("{}: {} times\n", entry.key, entry.count));
    }

    output.push_str(&format!("\n{}\n", "=== Most Common Words ===".yellow().bold()));
    for entry in &summary.top_tokens {
        output.push_str(&format!("{}: {} times\n", entry.key, entry.count));
    }

    output.push_str(&format!("\n{}\n", "=== Failure Patterns by Extension ===".yellow().bold()));
    for sample in summary.samples {
        output.push_str(&format!("\n{}\n", format!("{} failures:", sample.extension).cyan().bold()));

        for file in &sample.files {
            output.push_str(&format!("  - {}\n", file.filename));
            match &file.matched {
                Some(found) => output.push_str(&format!(
                    "    {} {} ({}): {}\n",
                    "Matched pattern".green(),
                    found.ordinal(),
                    found.label,
                    found.pattern
                )),
                None => output.push_str(&format!("    {}\n", "No known pattern matched".red())),
            }
        }
    }

    if use_markdown {
        output.push_str("```\n");
    }

    output
}

/// Export a report to a JSON file
pub fn export_results_json(summary: &ReportSummary<'_>, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    serde_json::to_writer_pretty(file, summary).context("Failed to write JSON data")?;

    Ok(())
}

/// Create a CSV report with one `Section,Key,Value` row per figure
pub fn create_csv_report(summary: &ReportSummary<'_>, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["Section", "Key", "Value"])
        .context("Failed to write CSV header")?;

    let totals = [
        ("total_records", summary.total_records.to_string()),
        ("failed_records", summary.failed_records.to_string()),
        ("failure_rate", summary.failure_rate_display()),
    ];
    for (key, value) in totals {
        writer
            .write_record(["summary", key, value.as_str()])
            .context("Failed to write CSV record")?;
    }

    let ranked = [
        ("extension", &summary.extensions),
        ("stem", &summary.top_stems),
        ("token", &summary.top_tokens),
    ];
    for (section, entries) in ranked {
        for entry in entries {
            writer
                .write_record([section, entry.key.as_str(), entry.count.to_string().as_str()])
                .context("Failed to write CSV record")?;
        }
    }

    for sample in summary.samples {
        let section = format!("sample{}", sample.extension);
        for file in &sample.files {
            let matched = file.matched.as_ref().map(|m| m.label).unwrap_or("");
            writer
                .write_record([section.as_str(), file.filename.as_str(), matched])
                .context("Failed to write CSV record")?;
        }
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Create an HTML report
pub fn create_html_report(summary: &ReportSummary<'_>, output_path: &Path) -> Result<()> {
    let mut handlebars = Handlebars::new();

    const HTML_TEMPLATE: &str = r#"
    <!DOCTYPE html>
    <html lang="en">
    <head>
        <meta charset="UTF-8">
        <title>Regex Match Failure Report</title>
        <style>
            body { font-family: Arial, sans-serif; color: #333; max-width: 1000px; margin: 0 auto; padding: 20px; }
            h1 { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
            h2 { color: #2980b9; margin-top: 30px; }
            table { border-collapse: collapse; }
            td, th { border: 1px solid #ddd; padding: 4px 12px; text-align: left; }
            .miss { color: #c0392b; }
        </style>
    </head>
    <body>
        <h1>Regex Match Failure Report</h1>
        <p>Source: {{source}}<br>Generated: {{generated_at}}</p>
        <p>Total records: {{total_records}}<br>
           Regex match failures: {{failed_records}}<br>
           Failure rate: {{failure_rate_display}}</p>

        <h2>Failures by Extension</h2>
        <table>
            {{#each extensions}}
            <tr><td>{{#if key}}{{key}}{{else}}(no extension){{/if}}</td><td>{{count}}</td></tr>
            {{/each}}
        </table>

        <h2>Most Common Failed Names</h2>
        <table>
            {{#each top_stems}}
            <tr><td>{{key}}</td><td>{{count}}</td></tr>
            {{/each}}
        </table>

        <h2>Most Common Words</h2>
        <table>
            {{#each top_tokens}}
            <tr><td>{{key}}</td><td>{{count}}</td></tr>
            {{/each}}
        </table>

        <h2>Failure Patterns by Extension</h2>
        {{#each samples}}
        <h3>{{extension}}</h3>
        <ul>
            {{#each files}}
            <li>{{filename}}
                {{#if matched}}
                (pattern {{matched.label}}: <code>{{matched.pattern}}</code>)
                {{else}}
                <span class="miss">(no known pattern)</span>
                {{/if}}
            </li>
            {{/each}}
        </ul>
        {{/each}}
    </body>
    </html>
    "#;

    handlebars
        .register_template_string("report", HTML_TEMPLATE)
        .context("Failed to register HTML template")?;

    let mut template_data = serde_json::to_value(summary).context("Failed to serialize report")?;
    if let Some(map) = template_data.as_object_mut() {
        map.insert(
            "failure_rate_display".to_string(),
            serde_json::Value::String(summary.failure_rate_display()),
        );
    }

    let html = handlebars
        .render("report", &template_data)
        .context("Failed to render HTML template")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create HTML output file: {}", output_path.display()))?;

    file.write_all(html.as_bytes())
        .context("Failed to write HTML data")?;

    Ok(())
}
