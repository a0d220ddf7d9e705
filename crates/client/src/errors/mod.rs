//! Error types and failover classification for the recall client.
//!
//! This module provides:
//! - [`RecallError`]: The main error enum for all resolution operations
//! - [`FailoverClass`]: Classification for determining failover behavior

mod failover;

pub use failover::FailoverClass;

use thiserror::Error;

use crate::models::BackendKind;

/// Result alias used throughout the client crate.
pub type Result<T> = std::result::Result<T, RecallError>;

/// Errors that can occur while resolving a batch code.
///
/// Each variant is classified into a [`FailoverClass`] via
/// [`failover_class`](Self::failover_class), which the resolution client
/// consults when the primary backend fails.
#[derive(Error, Debug)]
pub enum RecallError {
    /// The batch code was missing or empty.
    /// Surfaced immediately, no backend is contacted.
    #[error("Batch code must not be empty")]
    EmptyInput,

    /// Transport-level failure talking to a backend.
    #[error("Network error: {backend} - {message}")]
    Network {
        /// The backend that could not be reached
        backend: BackendKind,
        /// The underlying transport error
        message: String,
    },

    /// The request exceeded the configured timeout.
    /// Treated like a network failure for failover purposes.
    #[error("Timeout: {backend}")]
    Timeout {
        /// The backend that timed out
        backend: BackendKind,
    },

    /// The backend answered but reported a logical failure in its payload.
    #[error("Backend error: {backend} - {message}")]
    Backend {
        /// The backend that reported the failure
        backend: BackendKind,
        /// The message from the payload
        message: String,
    },

    /// Token acquisition for the secondary registry failed.
    #[error("Auth error: {message}")]
    Auth {
        /// The registry message
        message: String,
    },

    /// The operation is not offered by this backend.
    #[error("Unsupported: {operation} on {backend}")]
    Unsupported {
        /// The requested operation
        operation: String,
        /// The backend that cannot serve it
        backend: BackendKind,
    },

    /// The client was configured with invalid settings.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RecallError {
    /// Returns the failover classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use recallcheck_client::errors::{FailoverClass, RecallError};
    /// use recallcheck_client::BackendKind;
    ///
    /// let error = RecallError::Timeout { backend: BackendKind::Primary };
    /// assert_eq!(error.failover_class(), FailoverClass::Failover);
    ///
    /// assert_eq!(RecallError::EmptyInput.failover_class(), FailoverClass::Never);
    /// ```
    pub fn failover_class(&self) -> FailoverClass {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Backend { .. } => {
                FailoverClass::Failover
            }

            Self::EmptyInput
            | Self::Auth { .. }
            | Self::Unsupported { .. }
            | Self::Config(_) => FailoverClass::Never,
        }
    }

    /// Map a `reqwest` transport error into a backend-tagged error.
    pub(crate) fn from_transport(backend: BackendKind, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { backend }
        } else {
            Self::Network {
                backend,
                message: err.to_string(),
            }
        }
    }
}
