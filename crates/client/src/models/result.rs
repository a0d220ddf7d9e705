use serde::{Deserialize, Serialize};

use super::record::RecallRecord;

/// Which registry produced a result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Primary,
    Secondary,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified lookup result returned by both backends.
///
/// `matched` is always `!records.is_empty()` and `total` is never below
/// `records.len()`; the constructor enforces both.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolutionResult {
    success: bool,
    matched: bool,
    records: Vec<RecallRecord>,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    backend: BackendKind,
}

impl ResolutionResult {
    /// Build a successful result from already-filtered matches.
    ///
    /// `total` is the respondent's candidate count before filtering.
    pub fn new(
        backend: BackendKind,
        records: Vec<RecallRecord>,
        total: usize,
        message: Option<String>,
    ) -> Self {
        Self {
            success: true,
            matched: !records.is_empty(),
            total: total.max(records.len()),
            records,
            message,
            backend,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    pub fn records(&self) -> &[RecallRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RecallRecord> {
        self.records
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }
}
