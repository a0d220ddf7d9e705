//! Batch code normalization.

use crate::errors::{RecallError, Result};

/// Canonicalize a raw batch code: trimmed and upper-cased.
///
/// Fails with [`RecallError::EmptyInput`] when the input is absent or empty.
/// The emptiness check happens before trimming. Normalizing an already
/// canonical code returns it unchanged.
///
/// ```
/// use recallcheck_client::normalize;
///
/// assert_eq!(normalize(Some("  ab123f1 ")).unwrap(), "AB123F1");
/// assert!(normalize(None).is_err());
/// ```
pub fn normalize(raw: Option<&str>) -> Result<String> {
    match raw {
        None | Some("") => Err(RecallError::EmptyInput),
        Some(code) => Ok(code.trim().to_uppercase()),
    }
}
