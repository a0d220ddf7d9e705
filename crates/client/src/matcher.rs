//! Batch code matching against registry records.
//!
//! A record's `batch_codes` field holds one or more codes separated by
//! commas (ASCII or full-width) or whitespace. A record matches a query when
//! one of its codes equals the canonical query, or, with fuzzy matching on
//! and a long enough query, when either code contains the other.

use serde::{Deserialize, Serialize};

use crate::models::RecallRecord;

/// Default minimum query length for fuzzy matching.
pub const DEFAULT_FUZZY_MIN_LENGTH: usize = 4;

/// Fuzzy matching configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Whether substring matching is attempted after exact matching fails.
    pub fuzzy_enabled: bool,

    /// Minimum query length (in characters) for substring matching.
    pub fuzzy_min_length: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fuzzy_enabled: true,
            fuzzy_min_length: DEFAULT_FUZZY_MIN_LENGTH,
        }
    }
}

impl MatchConfig {
    /// Exact matching only.
    pub fn exact_only() -> Self {
        Self {
            fuzzy_enabled: false,
            ..Self::default()
        }
    }

    fn allows_fuzzy(&self, code: &str) -> bool {
        self.fuzzy_enabled && code.chars().count() >= self.fuzzy_min_length
    }
}

/// How a record matched a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

fn is_delimiter(c: char) -> bool {
    c == ',' || c == '，' || c.is_whitespace()
}

/// Split a raw `batch_codes` field into canonical candidate codes.
pub fn split_batch_codes(field: &str) -> impl Iterator<Item = String> + '_ {
    field
        .split(is_delimiter)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase)
}

/// Decide whether `record` matches the canonical `code`.
///
/// Exact matches take precedence over fuzzy ones: every candidate is checked
/// for equality before any substring test runs.
pub fn match_kind(code: &str, record: &RecallRecord, config: &MatchConfig) -> Option<MatchKind> {
    let candidates: Vec<String> = split_batch_codes(&record.batch_codes).collect();

    if candidates.iter().any(|candidate| candidate == code) {
        return Some(MatchKind::Exact);
    }

    if config.allows_fuzzy(code)
        && candidates
            .iter()
            .any(|candidate| candidate.contains(code) || code.contains(candidate.as_str()))
    {
        return Some(MatchKind::Fuzzy);
    }

    None
}

/// Keep the records matching `code`, preserving their order.
///
/// Each record appears at most once regardless of how many of its codes
/// matched. An empty input yields an empty output.
pub fn match_records(
    code: &str,
    records: Vec<RecallRecord>,
    config: &MatchConfig,
) -> Vec<RecallRecord> {
    records
        .into_iter()
        .filter(|record| match match_kind(code, record, config) {
            Some(kind) => {
                log::debug!(
                    "Batch code '{}' matched '{}' ({:?})",
                    code,
                    record.batch_codes,
                    kind
                );
                true
            }
            None => false,
        })
        .collect()
}
