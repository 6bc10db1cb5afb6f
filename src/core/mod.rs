/// Core module for failure analysis
///
/// This module contains the streaming log scanner, the frequency tallies it
/// fills, and the catalog of known filename conventions.

pub mod analyzer;
pub mod patterns;
pub mod tally;
