//! Filename helpers
//!
//! Splits logged filenames into extension, stem and word tokens. Filenames come
//! from a log rather than the local filesystem, so both `/` and `\` are treated
//! as path separators regardless of platform.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Runs of letters, numbers, underscores or CJK unified ideographs
    ///
    /// Combining marks end a token; numbers include `①` and `²`.
    static ref TOKEN_PATTERN: Regex =
        Regex::new(r"[\p{L}\p{N}_\x{4e00}-\x{9fff}]+").expect("token pattern is valid");
}

/// Final path component of a logged filename, ignoring trailing separators
pub fn file_name(path: &str) -> &str {
    let path = path.trim_end_matches(['/', '\\']);
    match path.rfind(['/', '\\']) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Byte offset of the extension dot inside a file name, if it has one
///
/// A leading dot (`.hidden`) or a trailing dot (`name.`) does not start an
/// extension.
fn extension_dot(name: &str) -> Option<usize> {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos < name.len() - 1 => Some(pos),
        _ => None,
    }
}

/// Lowercased extension including the leading dot, or an empty string
pub fn extension(path: &str) -> String {
    let name = file_name(path);
    extension_dot(name)
        .map(|pos| name[pos..].to_lowercase())
        .unwrap_or_default()
}

/// File name with its extension removed
pub fn stem(path: &str) -> &str {
    let name = file_name(path);
    match extension_dot(name) {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Lowercased tokens of a stem, skipping single-character tokens
pub fn tokens(stem: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(stem)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() > 1)
        .map(|word| word.to_lowercase())
        .collect()
}
