//! Core failure analyzer implementation
//!
//! `FailureAnalyzer` streams a classification log row by row, picks out the rows
//! whose status carries the failure marker, and accumulates them into a
//! `FailureReport`. Nothing is kept between runs.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};

use crate::config::ReportConfig;
use crate::core::patterns::{CatalogMatch, PatternCatalog};
use crate::core::tally::Tally;
use crate::utils::file_utils;

/// Errors that end a reporting run
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The input path does not exist
    #[error("Input file not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    /// Opening, decoding or iterating the table failed
    #[error("Error reading {}: {source}", .path.display())]
    ReadOrParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row
    #[error("Column '{column}' not found in the header of {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// The table parsed but holds no data rows
    #[error("No records found in {}", .path.display())]
    EmptyInput { path: PathBuf },
}

impl ReportError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::ReadOrParse { .. } | ReportError::MissingColumn { .. } => 1,
            ReportError::MissingInput { .. } => 2,
            ReportError::EmptyInput { .. } => 3,
        }
    }
}

/// A failed filename, handed to the progress callback as soon as it is seen
#[derive(Debug, Clone, Copy)]
pub struct FailedFile<'a> {
    /// One-based data row number (the header row is not counted)
    pub row: usize,
    pub filename: &'a str,
    pub extension: &'a str,
}

/// Up to N failed filenames of one extension, with their catalog matches
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExtensionSample {
    pub extension: String,
    pub files: Vec<SampleFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SampleFile {
    pub filename: String,
    pub matched: Option<CatalogMatch>,
}

/// Everything accumulated by one scan
#[derive(Debug, Clone, Default)]
pub struct FailureReport {
    /// Where the rows came from
    pub source: String,

    pub total_records: usize,
    pub failed_records: usize,

    /// Failures per lowercase extension
    pub extensions: Tally,

    /// Failures per filename stem
    pub stems: Tally,

    /// Occurrences of lowercase tokens taken from failed stems
    pub tokens: Tally,

    /// Failed filenames per extension, in encounter order
    failures_by_extension: HashMap<String, Vec<String>>,
}

impl FailureReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Self::default()
        }
    }

    /// Failure rate as a percentage, `None` when there are no records
    pub fn failure_rate(&self) -> Option<f64> {
        if self.total_records == 0 {
            None
        } else {
            Some(self.failed_records as f64 / self.total_records as f64 * 100.0)
        }
    }

    /// Failed filenames recorded for `extension`, in encounter order
    pub fn failures_for(&self, extension: &str) -> &[String] {
        self.failures_by_extension
            .get(extension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Extensions and their failed filenames, in first-appearance order
    pub fn failures_by_extension(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.extensions
            .iter()
            .map(move |(ext, _)| (ext, self.failures_for(ext)))
    }

    /// Sample the first `limit` failures of each listed extension and match
    /// their stems against `catalog`
    ///
    /// Extensions without failures are left out.
    pub fn samples(
        &self,
        extensions: &[String],
        limit: usize,
        catalog: &PatternCatalog,
    ) -> Vec<ExtensionSample> {
        extensions
            .iter()
            .filter(|ext| self.failures_by_extension.contains_key(ext.as_str()))
            .map(|ext| ExtensionSample {
                extension: ext.clone(),
                files: self
                    .failures_for(ext)
                    .iter()
                    .take(limit)
                    .map(|filename| SampleFile {
                        filename: filename.clone(),
                        matched: catalog.first_match(file_utils::stem(filename)),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Account for one failed record
    fn record_failure(&mut self, filename: &str) {
        self.failed_records += 1;

        if filename.is_empty() {
            return;
        }

        let ext = file_utils::extension(filename);
        let stem = file_utils::stem(filename);

        self.extensions.add(&ext);
        self.failures_by_extension
            .entry(ext)
            .or_default()
            .push(filename.to_string());
        self.stems.add(stem);

        for token in file_utils::tokens(stem) {
            self.tokens.add(&token);
        }
    }
}

/// Scans classification logs for regex-match failures
pub struct FailureAnalyzer {
    /// Lowercased failure marker
    marker: String,

    status_column: String,
    filename_column: String,
}

impl FailureAnalyzer {
    /// Create an analyzer from the report configuration
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            marker: config.marker.to_lowercase(),
            status_column: config.status_column.clone(),
            filename_column: config.filename_column.clone(),
        }
    }

    /// Whether a status value marks a regex-match failure
    pub fn is_failure(&self, status: &str) -> bool {
        status.to_lowercase().contains(&self.marker)
    }

    /// Analyze a CSV file on disk
    ///
    /// `on_failure` is called once per failed filename while scanning. The file
    /// is closed when the scan returns, on success or error.
    pub fn analyze_file<F>(&self, path: &Path, on_failure: F) -> Result<FailureReport, ReportError>
    where
        F: FnMut(&FailedFile<'_>),
    {
        info!("Analyzing file: {}", path.display());

        if !path.exists() {
            return Err(ReportError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|e| ReportError::ReadOrParse {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;

        self.analyze_reader(file, path, on_failure)
    }

    /// Analyze CSV data from any reader; `source` names it in errors
    pub fn analyze_reader<R, F>(
        &self,
        reader: R,
        source: &Path,
        mut on_failure: F,
    ) -> Result<FailureReport, ReportError>
    where
        R: Read,
        F: FnMut(&FailedFile<'_>),
    {
        let read_error = |e: csv::Error| ReportError::ReadOrParse {
            path: source.to_path_buf(),
            source: e,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().map_err(read_error)?.clone();
        let status_idx = self.column_index(&headers, &self.status_column, source)?;
        let filename_idx = self.column_index(&headers, &self.filename_column, source)?;

        let mut report = FailureReport::new(&source.to_string_lossy());
        let mut record = StringRecord::new();

        while reader.read_record(&mut record).map_err(read_error)? {
            report.total_records += 1;

            let status = record.get(status_idx).unwrap_or("");
            if !self.is_failure(status) {
                continue;
            }

            let filename = record.get(filename_idx).unwrap_or("");
            report.record_failure(filename);

            if filename.is_empty() {
                debug!("Row {} failed without a filename", report.total_records);
                continue;
            }

            let extension = file_utils::extension(filename);
            on_failure(&FailedFile {
                row: report.total_records,
                filename,
                extension: &extension,
            });
        }

        if report.total_records == 0 {
            warn!("No records found in {}", source.display());
            return Err(ReportError::EmptyInput {
                path: source.to_path_buf(),
            });
        }

        info!(
            "Scanned {} records, {} failed",
            report.total_records, report.failed_records
        );

        Ok(report)
    }

    /// Locate a header column by name
    fn column_index(
        &self,
        headers: &StringRecord,
        column: &str,
        source: &Path,
    ) -> Result<usize, ReportError> {
        headers
            .iter()
            .position(|name| name.trim_start_matches('\u{feff}') == column)
            .ok_or_else(|| {
                warn!("Column '{}' missing from {}", column, source.display());
                ReportError::MissingColumn {
                    path: source.to_path_buf(),
                    column: column.to_string(),
                }
            })
    }
}
