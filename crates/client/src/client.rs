//! Resolution client orchestrating the two registries.
//!
//! The client starts on the primary registry. The first primary failure that
//! classifies as [`FailoverClass::Failover`] moves it to the secondary, and
//! it stays there: later calls go straight to the secondary instead of
//! waiting on a registry known to be down. With `primary_retry_after` set,
//! the primary is probed again once that long has passed since failover,
//! much like a circuit breaker moving from open to half-open.
//!
//! The state belongs to one client instance, not to the process.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::backend::{PrimaryBackend, RecallBackend, SecondaryBackend};
use crate::config::ClientConfig;
use crate::errors::{FailoverClass, RecallError, Result};
use crate::models::{OcrImage, OcrResult, ResolutionResult};
use crate::normalize::normalize;

/// Which registry the client currently starts with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackendState {
    UsingPrimary,
    UsingSecondary,
}

impl std::fmt::Display for BackendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsingPrimary => write!(f, "UsingPrimary"),
            Self::UsingSecondary => write!(f, "UsingSecondary"),
        }
    }
}

#[derive(Debug)]
struct StateCell {
    state: BackendState,
    failed_over_at: Option<Instant>,
}

impl StateCell {
    fn new() -> Self {
        Self {
            state: BackendState::UsingPrimary,
            failed_over_at: None,
        }
    }
}

/// Batch code resolution client.
pub struct ResolutionClient {
    primary: Arc<dyn RecallBackend>,
    secondary: Arc<dyn RecallBackend>,
    state: Mutex<StateCell>,
    primary_retry_after: Option<Duration>,
}

impl ResolutionClient {
    /// Create a client over two backends, sticky failover only.
    pub fn new(primary: Arc<dyn RecallBackend>, secondary: Arc<dyn RecallBackend>) -> Self {
        Self {
            primary,
            secondary,
            state: Mutex::new(StateCell::new()),
            primary_retry_after: None,
        }
    }

    /// Build the HTTP backends described by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        if !config.secondary_configured() {
            warn!("Secondary registry credentials are incomplete; failover lookups will fail");
        }

        let primary = Arc::new(PrimaryBackend::new(config)?);
        let secondary = Arc::new(SecondaryBackend::new(config)?);
        Ok(Self::new(primary, secondary).with_primary_retry_after(config.primary_retry_after))
    }

    /// Probe the primary again this long after failing over.
    pub fn with_primary_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.primary_retry_after = retry_after;
        self
    }

    /// Lock the state mutex, recovering from poison if necessary.
    ///
    /// The worst case after a poisoned lock is starting on the wrong
    /// backend, which failover corrects on the next call.
    fn lock_state(&self) -> MutexGuard<'_, StateCell> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Resolution client state mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Current backend state.
    pub fn state(&self) -> BackendState {
        self.lock_state().state
    }

    /// Return to the primary registry.
    pub fn reset(&self) {
        let mut cell = self.lock_state();
        if cell.state != BackendState::UsingPrimary {
            info!("Resolution client reset to primary registry");
        }
        *cell = StateCell::new();
    }

    /// Whether the next query should go to the primary.
    fn should_try_primary(&self) -> bool {
        let cell = self.lock_state();
        match (cell.state, self.primary_retry_after, cell.failed_over_at) {
            (BackendState::UsingPrimary, _, _) => true,
            (BackendState::UsingSecondary, Some(retry_after), Some(at)) => {
                let due = at.elapsed() >= retry_after;
                if due {
                    debug!("Primary retry window elapsed, probing primary registry");
                }
                due
            }
            (BackendState::UsingSecondary, _, _) => false,
        }
    }

    fn fail_over(&self) {
        let mut cell = self.lock_state();
        if cell.state == BackendState::UsingPrimary {
            info!("Resolution client: switching from primary to secondary registry");
        }
        cell.state = BackendState::UsingSecondary;
        cell.failed_over_at = Some(Instant::now());
    }

    fn primary_recovered(&self) {
        let mut cell = self.lock_state();
        if cell.state == BackendState::UsingSecondary {
            info!("Resolution client: primary registry recovered");
            *cell = StateCell::new();
        }
    }

    /// Resolve a raw batch code.
    ///
    /// 1. Normalize; empty input fails before any backend is contacted
    /// 2. Query the primary while in `UsingPrimary`
    /// 3. On a failover-class error, switch to the secondary (sticky)
    /// 4. Return the secondary's result or error as-is
    ///
    /// The client does not record history; that is left to the caller.
    pub async fn resolve(&self, raw: &str) -> Result<ResolutionResult> {
        let code = normalize(Some(raw))?;
        if code.is_empty() {
            return Err(RecallError::EmptyInput);
        }

        if self.should_try_primary() {
            match self.primary.query(&code).await {
                Ok(result) => {
                    self.primary_recovered();
                    info!(
                        "Resolved '{}' via primary: matched={} total={}",
                        code,
                        result.matched(),
                        result.total()
                    );
                    return Ok(result);
                }
                Err(e) => match e.failover_class() {
                    FailoverClass::Never => return Err(e),
                    FailoverClass::Failover => {
                        warn!("Primary registry failed for '{}': {}, failing over", code, e);
                        self.fail_over();
                    }
                },
            }
        }

        let result = self.secondary.query(&code).await?;
        info!(
            "Resolved '{}' via secondary: matched={} total={}",
            code,
            result.matched(),
            result.total()
        );
        Ok(result)
    }

    /// Registry statistics from whichever backend is active.
    pub async fn stats(&self) -> Result<serde_json::Value> {
        match self.state() {
            BackendState::UsingPrimary => self.primary.stats().await,
            BackendState::UsingSecondary => self.secondary.stats().await,
        }
    }

    /// Primary service health. Never fails on transport errors.
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.primary.health().await
    }

    /// Recognize a batch code in an image via the primary OCR endpoint.
    pub async fn ocr(&self, image: &OcrImage) -> Result<OcrResult> {
        self.primary.ocr(image).await
    }
}
