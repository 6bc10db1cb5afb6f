/// Failed Match Analyzer - summarizes regex-match failures in a classification log
///
/// This library reads the CSV log written by a filename classifier, keeps the rows
/// whose status marks a regex-match failure, and tallies them by extension, stem
/// and token. Sample failures of common video extensions are checked against a
/// catalog of known naming conventions.

// Re-export core modules
pub mod core;
pub mod utils;

// Re-export main analyzer types for convenience
pub use crate::core::analyzer::{FailureAnalyzer, FailureReport, ReportError};
pub use crate::core::patterns::{PatternCatalog, PATTERN_CATALOG};
pub use crate::config::ReportConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyze a single log file with the default configuration
///
/// This is a convenience function for simple use cases; failed filenames are
/// not reported while scanning.
pub fn analyze_file<P: AsRef<std::path::Path>>(file_path: P) -> Result<FailureReport, ReportError> {
    let config = config::default_config();
    FailureAnalyzer::new(&config).analyze_file(file_path.as_ref(), |_| {})
}

/// Library configuration and utilities
pub mod config {
    use std::path::Path;

    use log::{error, info};
    use serde::{Deserialize, Serialize};

    /// Input used when neither the command line nor the environment names one
    pub const DEFAULT_INPUT: &str = "analog/result.csv";

    /// Status substring that marks a regex-match failure
    pub const DEFAULT_MARKER: &str = "reg_match_fail";

    /// Video extensions sampled in the detailed section
    pub const DEFAULT_SAMPLE_EXTENSIONS: [&str; 5] = [".mp4", ".mkv", ".avi", ".mov", ".wmv"];

    /// Settings for one reporting run
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ReportConfig {
        /// CSV log to analyze
        pub input: String,

        /// Case-insensitive failure marker looked for in the status column
        pub marker: String,

        pub status_column: String,
        pub filename_column: String,

        /// How many stems to list
        pub top_stems: usize,

        /// How many tokens to list
        pub top_tokens: usize,

        /// Failed filenames shown per sampled extension
        pub sample_limit: usize,

        /// Extensions whose failures are matched against the pattern catalog
        pub sample_extensions: Vec<String>,
    }

    impl Default for ReportConfig {
        fn default() -> Self {
            Self {
                input: DEFAULT_INPUT.to_string(),
                marker: DEFAULT_MARKER.to_string(),
                status_column: "status".to_string(),
                filename_column: "filename".to_string(),
                top_stems: 10,
                top_tokens: 20,
                sample_limit: 10,
                sample_extensions: DEFAULT_SAMPLE_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            }
        }
    }

    impl ReportConfig {
        /// Lowercase sample extensions and make sure each carries a leading dot
        pub fn normalized(mut self) -> Self {
            self.sample_extensions = self
                .sample_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .filter(|ext| !ext.is_empty())
                .collect();
            self
        }
    }

    /// Create default configuration
    pub fn default_config() -> ReportConfig {
        ReportConfig::default()
    }

    /// `"MKV"` and `".mkv"` both become `".mkv"`
    pub fn normalize_extension(ext: &str) -> String {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            ext
        } else {
            format!(".{}", ext)
        }
    }

    /// Load configuration from a JSON file
    ///
    /// A missing or malformed file is logged and the defaults are used instead.
    pub fn load_config(config_path: Option<&Path>) -> ReportConfig {
        let path = match config_path {
            Some(path) => path,
            None => return default_config(),
        };

        if !path.exists() {
            error!("Configuration file not found: {}", path.display());
            return default_config();
        }

        let config_str = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Could not read configuration file {}: {}", path.display(), e);
                return default_config();
            }
        };

        match serde_json::from_str::<ReportConfig>(&config_str) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config.normalized()
            }
            Err(e) => {
                error!("Invalid JSON in configuration file: {}", e);
                default_config()
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = default_config();
            assert_eq!(config.input, "analog/result.csv");
            assert_eq!(config.marker, "reg_match_fail");
            assert_eq!(config.top_stems, 10);
            assert_eq!(config.top_tokens, 20);
            assert_eq!(config.sample_limit, 10);
            assert_eq!(config.sample_extensions, vec![".mp4", ".mkv", ".avi", ".mov", ".wmv"]);
        }

        #[test]
        fn test_normalize_extension() {
            assert_eq!(normalize_extension("MKV"), ".mkv");
            assert_eq!(normalize_extension(".Mp4"), ".mp4");
            assert_eq!(normalize_extension(" . "), "");
        }

        #[test]
        fn test_partial_config_file() {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("config.json");
            std::fs::write(&path, r#"{"top_tokens": 5, "sample_extensions": ["TS", ".m2ts"]}"#)
                .expect("Failed to write config");

            let config = load_config(Some(&path));
            assert_eq!(config.top_tokens, 5);
            assert_eq!(config.top_stems, 10);
            assert_eq!(config.sample_extensions, vec![".ts", ".m2ts"]);
        }

        #[test]
        fn test_bad_config_falls_back_to_defaults() {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("config.json");
            std::fs::write(&path, "{ not json").expect("Failed to write config");

            assert_eq!(load_config(Some(&path)), default_config());
            assert_eq!(load_config(Some(&dir.path().join("missing.json"))), default_config());
        }
    }
}

/// Command-line application functionality
pub mod app {
    use std::path::Path;

    use crate::config::ReportConfig;
    use crate::core::analyzer::{ExtensionSample, FailedFile, FailureAnalyzer, FailureReport, ReportError};
    use crate::core::patterns::PATTERN_CATALOG;

    /// A finished scan together with its sampled extensions
    #[derive(Debug, Clone)]
    pub struct AnalysisOutcome {
        pub report: FailureReport,
        pub samples: Vec<ExtensionSample>,
    }

    /// Run one reporting pass over `config.input`
    ///
    /// `on_failure` receives every failed filename as it is encountered.
    pub fn run_report<F>(config: &ReportConfig, on_failure: F) -> Result<AnalysisOutcome, ReportError>
    where
        F: FnMut(&FailedFile<'_>),
    {
        let analyzer = FailureAnalyzer::new(config);
        let report = analyzer.analyze_file(Path::new(&config.input), on_failure)?;
        let samples = report.samples(&config.sample_extensions, config.sample_limit, &PATTERN_CATALOG);

        Ok(AnalysisOutcome { report, samples })
    }
}
