//! Matcher
//!
//! Resolves an artifact key against a [`MappingTable`] by exact equality of
//! normalized keys. No partial or fuzzy matching.
//!
//! Duplicate keys resolve to the first-loaded entry.

use crate::mapping::{normalize_key, MappingEntry, MappingTable};

/// Matching result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<'a> {
    /// No entry with that normalized key
    NoMatch,
    /// Exactly one entry
    Unique(&'a MappingEntry),
    /// Several entries; `chosen` is the first in load order
    Ambiguous {
        chosen: &'a MappingEntry,
        candidates: usize,
    },
}

impl<'a> MatchResult<'a> {
    /// Entry to act on, if any
    pub fn resolved(&self) -> Option<&'a MappingEntry> {
        match self {
            MatchResult::NoMatch => None,
            MatchResult::Unique(entry) => Some(entry),
            MatchResult::Ambiguous { chosen, .. } => Some(chosen),
        }
    }
}

/// Look up `artifact_key` in `table`
pub fn match_key<'a>(artifact_key: &str, table: &'a MappingTable) -> MatchResult<'a> {
    let key = normalize_key(artifact_key);
    let candidates = table.candidates(&key);

    match candidates.as_slice() {
        [] => MatchResult::NoMatch,
        [only] => MatchResult::Unique(only),
        [first, ..] => MatchResult::Ambiguous {
            chosen: first,
            candidates: candidates.len(),
        },
    }
}
