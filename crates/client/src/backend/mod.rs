//! Recall registry backends.
//!
//! This module contains:
//! - The `RecallBackend` trait both registries implement
//! - `PrimaryBackend`: the recall API, which matches server-side
//! - `SecondaryBackend`: the table registry, which needs a tenant token and
//!   whose records are re-filtered locally with the matcher
//!
//! Both adapters translate their wire format into [`ResolutionResult`]
//! before returning, so the resolution client never sees either schema.

mod http;
mod primary;
mod secondary;
mod token;

use async_trait::async_trait;

use crate::errors::{RecallError, Result};
use crate::models::{BackendKind, OcrImage, OcrResult, ResolutionResult};

pub use primary::PrimaryBackend;
pub use secondary::SecondaryBackend;
pub use token::{TenantToken, TokenCache};

/// Trait for recall registry backends.
///
/// `query` receives an already-normalized batch code. The remaining
/// operations are pass-throughs that only some registries offer; the
/// defaults report [`RecallError::Unsupported`].
#[async_trait]
pub trait RecallBackend: Send + Sync {
    /// Which registry this is. Used for logging and result tagging.
    fn kind(&self) -> BackendKind;

    /// Look up a canonical batch code.
    async fn query(&self, code: &str) -> Result<ResolutionResult>;

    /// Registry statistics, returned untransformed.
    async fn stats(&self) -> Result<serde_json::Value> {
        Err(self.unsupported("stats"))
    }

    /// Service health, returned untransformed.
    async fn health(&self) -> Result<serde_json::Value> {
        Err(self.unsupported("health"))
    }

    /// Extract a batch code from an image.
    async fn ocr(&self, _image: &OcrImage) -> Result<OcrResult> {
        Err(self.unsupported("ocr"))
    }

    #[doc(hidden)]
    fn unsupported(&self, operation: &str) -> RecallError {
        RecallError::Unsupported {
            operation: operation.to_string(),
            backend: self.kind(),
        }
    }
}
