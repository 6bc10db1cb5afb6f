//! Frequency counters used by the failure report
//!
//! A `Tally` remembers the order in which keys were first seen so that ranking
//! by count can break ties by first appearance.

use std::collections::HashMap;

use serde::Serialize;

/// Insertion-ordered frequency counter
#[derive(Debug, Clone, Default)]
pub struct Tally {
    /// Keys and counts in first-appearance order
    entries: Vec<(String, usize)>,

    /// Position of each key inside `entries`
    index: HashMap<String, usize>,
}

/// A single ranked entry of a tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub key: String,
    pub count: usize,
}

impl Tally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for `key` by one
    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// Current count for `key` (zero when never seen)
    pub fn get(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1)
            .unwrap_or(0)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Iterate keys and counts in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// Entries ranked by descending count, limited to `limit` when given
    ///
    /// The sort is stable, so equal counts keep first-appearance order.
    pub fn most_common(&self, limit: Option<usize>) -> Vec<TallyEntry> {
        let mut ranked: Vec<&(String, usize)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(key, count)| TallyEntry {
                key: key.clone(),
                count: *count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut tally = Tally::new();
        tally.add(".mkv");
        tally.add(".mp4");
        tally.add(".mkv");

        assert_eq!(tally.get(".mkv"), 2);
        assert_eq!(tally.get(".mp4"), 1);
        assert_eq!(tally.get(".avi"), 0);
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn test_most_common_breaks_ties_by_first_appearance() {
        let mut tally = Tally::new();
        for key in ["b", "a", "c", "a", "c", "d"] {
            tally.add(key);
        }

        let keys: Vec<_> = tally
            .most_common(None)
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(keys, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_most_common_limit() {
        let mut tally = Tally::new();
        for key in ["x", "y", "z", "z"] {
            tally.add(key);
        }

        let top = tally.most_common(Some(2));
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], TallyEntry { key: "z".to_string(), count: 2 });
        assert_eq!(top[1].key, "x");
    }

    #[test]
    fn test_empty_tally() {
        let tally = Tally::new();
        assert!(tally.is_empty());
        assert!(tally.most_common(Some(10)).is_empty());
        assert_eq!(tally.total(), 0);
    }
}
