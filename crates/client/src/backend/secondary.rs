//! Secondary (table-backed) recall registry.
//!
//! # API Endpoints
//!
//! - Token: `POST {base}/auth/v3/tenant_access_token/internal`
//! - Search: `POST {base}/bitable/v1/apps/{app_token}/tables/{table_id}/records/search`
//!
//! # Response Format
//!
//! Both endpoints answer with a numeric `code` (0 on success) and a `msg`.
//! The search filter is only a hint: the registry's "contains" semantics
//! differ from ours, so every returned record is re-checked with the matcher.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::http::{build_client, decode_body, join_url};
use super::token::{TenantToken, TokenCache};
use super::RecallBackend;
use crate::config::{ClientConfig, SecondaryConfig};
use crate::errors::{RecallError, Result};
use crate::matcher::{match_records, MatchConfig};
use crate::models::{BackendKind, RecallRecord, ResolutionResult};

const BACKEND: BackendKind = BackendKind::Secondary;

/// Field holding the delimiter-separated batch codes.
const BATCH_CODES_FIELD: &str = "batch_codes";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default = "unknown_code")]
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    expire: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default = "unknown_code")]
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchData {
    #[serde(default)]
    items: Option<Vec<SearchItem>>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    record_id: Option<String>,
    #[serde(default)]
    fields: RecallRecord,
}

fn unknown_code() -> i64 {
    -1
}

/// Secondary registry client.
pub struct SecondaryBackend {
    client: Client,
    config: SecondaryConfig,
    matching: MatchConfig,
    tokens: Option<TokenCache>,
}

impl SecondaryBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let tokens = config.secondary.token_cache.then(TokenCache::new);
        if tokens.is_some() {
            info!("[secondary] tenant token caching enabled");
        }

        Ok(Self {
            client: build_client(config.request_timeout)?,
            config: config.secondary.clone(),
            matching: config.matching.clone(),
            tokens,
        })
    }

    /// Exchange app credentials for a tenant access token.
    ///
    /// Fails with [`RecallError::Auth`] when the registry answers with a
    /// nonzero code. Transport failures surface as network errors.
    pub async fn acquire_token(&self, app_id: &str, app_secret: &str) -> Result<TenantToken> {
        let url = join_url(&self.config.base_url, "/auth/v3/tenant_access_token/internal");
        debug!("[secondary] POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "app_id": app_id, "app_secret": app_secret }))
            .send()
            .await
            .map_err(|e| RecallError::from_transport(BACKEND, e))?;

        let payload: TokenResponse =
            decode_body(BACKEND, response)
                .await
                .map_err(|e| match e {
                    RecallError::Backend { message, .. } => RecallError::Auth { message },
                    other => other,
                })?;

        if payload.code != 0 {
            return Err(RecallError::Auth {
                message: format!("code {}: {}", payload.code, payload.msg),
            });
        }

        let value = payload
            .tenant_access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RecallError::Auth {
                message: "response carried no tenant_access_token".to_string(),
            })?;

        Ok(TenantToken::from_expire(value, payload.expire, Utc::now()))
    }

    /// Token for the next request, served from the cache when allowed.
    async fn token(&self) -> Result<TenantToken> {
        if let Some(cache) = &self.tokens {
            if let Some(token) = cache.get(Utc::now()).await {
                debug!("[secondary] using cached tenant token");
                return Ok(token);
            }
        }

        let token = self
            .acquire_token(&self.config.app_id, &self.config.app_secret)
            .await?;

        if let Some(cache) = &self.tokens {
            cache.store(token.clone()).await;
        }
        Ok(token)
    }

    fn search_url(&self) -> String {
        let path = format!(
            "/bitable/v1/apps/{}/tables/{}/records/search?page_size={}",
            urlencoding::encode(&self.config.app_token),
            urlencoding::encode(&self.config.table_id),
            self.config.page_size
        );
        join_url(&self.config.base_url, &path)
    }
}

#[async_trait]
impl RecallBackend for SecondaryBackend {
    fn kind(&self) -> BackendKind {
        BACKEND
    }

    async fn query(&self, code: &str) -> Result<ResolutionResult> {
        let token = self.token().await?;
        let url = self.search_url();
        debug!("[secondary] POST {} contains={}", url, code);

        let body = json!({
            "filter": {
                "conjunction": "and",
                "conditions": [{
                    "field_name": BATCH_CODES_FIELD,
                    "operator": "contains",
                    "value": [code],
                }]
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token.value)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecallError::from_transport(BACKEND, e))?;

        let payload: SearchResponse = decode_body(BACKEND, response).await?;
        if payload.code != 0 {
            if let Some(cache) = &self.tokens {
                // The token may have been revoked early; don't reuse it.
                cache.clear().await;
            }
            return Err(RecallError::Backend {
                backend: BACKEND,
                message: format!("code {}: {}", payload.code, payload.msg),
            });
        }

        let data = payload.data.unwrap_or_default();
        let candidates: Vec<RecallRecord> = data
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| RecallRecord {
                record_id: item.record_id,
                ..item.fields
            })
            .collect();
        let total = data.total.unwrap_or(candidates.len());
        let returned = candidates.len();

        let records = match_records(code, candidates, &self.matching);
        if records.len() < returned {
            debug!(
                "[secondary] {} of {} returned records did not match '{}' locally",
                returned - records.len(),
                returned,
                code
            );
        }

        Ok(ResolutionResult::new(BACKEND, records, total, None))
    }

    /// The table registry keeps no statistics. Answers with an unsuccessful
    /// body in the primary's envelope rather than an error.
    async fn stats(&self) -> Result<serde_json::Value> {
        Ok(json!({
            "success": false,
            "message": "Statistics are not available from the table registry",
        }))
    }
}
