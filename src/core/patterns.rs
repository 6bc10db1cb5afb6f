//! Known filename conventions for media files
//!
//! The catalog is an ordered list of `(label, pattern)` pairs. Order matters:
//! lookups report the first pattern that matches, so indices must stay stable.

use lazy_static::lazy_static;
use log::error;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

/// Pattern definitions in catalog order
pub const PATTERN_DEFINITIONS: &[(&str, &str)] = &[
    ("year", r"\d{4}"),
    ("season_episode", r"S\d{1,2}E\d{1,2}"),
    ("cross_episode", r"\d{1,2}x\d{1,2}"),
    ("cn_season", r"第[一二三四五六七八九十\d]+季"),
    ("cn_episode", r"第[一二三四五六七八九十\d]+集"),
    ("ep_number", r"EP\d{1,3}"),
    ("episode_word", r"Episode\s*\d{1,3}"),
    ("part", r"Part\s*\d+"),
    ("disc", r"CD\d+"),
];

/// A compiled catalog entry
#[derive(Debug, Clone)]
pub struct CatalogPattern {
    /// Zero-based position in the definition list
    pub index: usize,
    pub label: &'static str,
    pub pattern: &'static str,
    pub regex: Regex,
}

/// The first catalog entry that matched a stem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogMatch {
    /// Zero-based position in the catalog
    pub index: usize,
    pub label: &'static str,
    pub pattern: &'static str,
}

impl CatalogMatch {
    /// One-based position, as shown to users
    pub fn ordinal(&self) -> usize {
        self.index + 1
    }
}

/// Ordered, immutable list of filename patterns
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<CatalogPattern>,
}

impl PatternCatalog {
    /// Compile the built-in definitions
    pub fn new() -> Self {
        Self::from_definitions(PATTERN_DEFINITIONS)
    }

    /// Compile a catalog from `(label, pattern)` pairs, case-insensitively
    ///
    /// Patterns that fail to compile are logged and skipped; the others keep
    /// their position in `definitions`.
    pub fn from_definitions(definitions: &[(&'static str, &'static str)]) -> Self {
        let mut patterns = Vec::with_capacity(definitions.len());

        for (index, &(label, pattern)) in definitions.iter().enumerate() {
            match compile_pattern(pattern) {
                Some(regex) => patterns.push(CatalogPattern { index, label, pattern, regex }),
                None => error!("Error compiling pattern for {}: {}", label, pattern),
            }
        }

        Self { patterns }
    }

    /// Find the first pattern that matches anywhere inside `stem`
    pub fn first_match(&self, stem: &str) -> Option<CatalogMatch> {
        self.patterns
            .iter()
            .find(|entry| entry.regex.is_match(stem))
            .map(|entry| CatalogMatch {
                index: entry.index,
                label: entry.label,
                pattern: entry.pattern,
            })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogPattern> {
        self.patterns.iter()
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a single case-insensitive pattern
pub fn compile_pattern(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

lazy_static! {
    /// Built-in catalog, compiled once
    pub static ref PATTERN_CATALOG: PatternCatalog = PatternCatalog::new();
}
