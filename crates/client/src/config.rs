//! Client configuration.

use std::time::Duration;

use crate::errors::{RecallError, Result};
use crate::matcher::MatchConfig;

/// Default primary API base.
pub const DEFAULT_PRIMARY_BASE_URL: &str = "http://127.0.0.1:5001/api";

/// Default secondary (table registry) API base.
pub const DEFAULT_SECONDARY_BASE_URL: &str = "https://open.feishu.cn/open-apis";

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default page size for secondary record searches.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for the table-backed secondary registry.
#[derive(Clone, Debug)]
pub struct SecondaryConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_secret: String,
    /// Table app the records live in
    pub app_token: String,
    pub table_id: String,
    /// Maximum records returned per search
    pub page_size: u32,
    /// Reuse tenant tokens until shortly before they expire
    pub token_cache: bool,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SECONDARY_BASE_URL.to_string(),
            app_id: String::new(),
            app_secret: String::new(),
            app_token: String::new(),
            table_id: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            token_cache: false,
        }
    }
}

/// Configuration for [`crate::ResolutionClient`] and its backends.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub primary_base_url: String,
    pub secondary: SecondaryConfig,
    pub matching: MatchConfig,
    /// Per-request timeout; an expired request counts as a network failure
    pub request_timeout: Duration,
    /// Probe the primary again this long after failing over.
    /// `None` keeps the client on the secondary for its whole lifetime.
    pub primary_retry_after: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_base_url: DEFAULT_PRIMARY_BASE_URL.to_string(),
            secondary: SecondaryConfig::default(),
            matching: MatchConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            primary_retry_after: None,
        }
    }
}

impl ClientConfig {
    /// Check the configuration for values the backends cannot work with.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("primary base URL", &self.primary_base_url),
            ("secondary base URL", &self.secondary.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RecallError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.request_timeout < MIN_REQUEST_TIMEOUT || self.request_timeout > MAX_REQUEST_TIMEOUT
        {
            return Err(RecallError::Config(format!(
                "request timeout must be between {}s and {}s",
                MIN_REQUEST_TIMEOUT.as_secs(),
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        if self.secondary.page_size == 0 || self.secondary.page_size > 500 {
            return Err(RecallError::Config(
                "secondary page size must be between 1 and 500".to_string(),
            ));
        }

        if self.matching.fuzzy_min_length == 0 {
            return Err(RecallError::Config(
                "fuzzy minimum length must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the secondary registry has credentials to work with.
    pub fn secondary_configured(&self) -> bool {
        let s = &self.secondary;
        !(s.app_id.is_empty() || s.app_secret.is_empty() || s.app_token.is_empty() || s.table_id.is_empty())
    }
}
