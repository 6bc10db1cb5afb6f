/// Utility modules for the failure analyzer
///
/// This module contains filename helpers and report formatting and export.

pub mod file_utils;
pub mod output_formatter;
