//! Primary recall API.
//!
//! # API Endpoints
//!
//! - Query: `POST {base}/query` with `{ "batch_code": ... }`
//! - OCR: `POST {base}/ocr` with `{ "image_url": ... }` or `{ "image_base64": ... }`
//! - Stats: `GET {base}/stats`
//! - Health: `GET {base}/health`
//!
//! # Response Format
//!
//! Every endpoint except health answers `{ success, data, message }`; the
//! query endpoint adds a `status` and has already matched server-side, so
//! `data` holds only the matching records.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::http::{build_client, decode_body, join_url};
use super::RecallBackend;
use crate::config::ClientConfig;
use crate::errors::{RecallError, Result};
use crate::models::{BackendKind, OcrImage, OcrResult, RecallRecord, RecordStatus, ResolutionResult};

const BACKEND: BackendKind = BackendKind::Primary;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: RecordStatus,
    #[serde(default)]
    data: Option<Vec<RecallRecord>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<OcrResult>,
    #[serde(default)]
    message: Option<String>,
}

/// Primary registry client.
pub struct PrimaryBackend {
    client: Client,
    base_url: String,
}

impl PrimaryBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout)?,
            base_url: config.primary_base_url.clone(),
        })
    }

    fn logical_failure(message: Option<String>, fallback: &str) -> RecallError {
        RecallError::Backend {
            backend: BACKEND,
            message: message.unwrap_or_else(|| fallback.to_string()),
        }
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = join_url(&self.base_url, path);
        debug!("[primary] GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RecallError::from_transport(BACKEND, e))?;

        decode_body(BACKEND, response).await
    }
}

#[async_trait]
impl RecallBackend for PrimaryBackend {
    fn kind(&self) -> BackendKind {
        BACKEND
    }

    async fn query(&self, code: &str) -> Result<ResolutionResult> {
        let url = join_url(&self.base_url, "/query");
        debug!("[primary] POST {} batch_code={}", url, code);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "batch_code": code }))
            .send()
            .await
            .map_err(|e| RecallError::from_transport(BACKEND, e))?;

        let payload: QueryResponse = decode_body(BACKEND, response).await?;
        if !payload.success {
            return Err(Self::logical_failure(payload.message, "Query failed"));
        }

        let data = payload.data.unwrap_or_default();
        let total = data.len();
        let records = if payload.status == RecordStatus::Recalled {
            if data.is_empty() {
                warn!(
                    "[primary] '{}' reported as recalled without any records, treating as unmatched",
                    code
                );
            }
            data
        } else {
            Vec::new()
        };

        Ok(ResolutionResult::new(BACKEND, records, total, payload.message))
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        self.get_json("/stats").await
    }

    async fn health(&self) -> Result<serde_json::Value> {
        match self.get_json("/health").await {
            Ok(body) => Ok(body),
            Err(e) => {
                warn!("[primary] health check failed: {}", e);
                Ok(json!({ "status": "error", "message": e.to_string() }))
            }
        }
    }

    async fn ocr(&self, image: &OcrImage) -> Result<OcrResult> {
        let url = join_url(&self.base_url, "/ocr");
        debug!("[primary] POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(image)
            .send()
            .await
            .map_err(|e| RecallError::from_transport(BACKEND, e))?;

        let payload: OcrResponse = decode_body(BACKEND, response).await?;
        match (payload.success, payload.data) {
            (true, Some(result)) => Ok(result),
            (_, _) => Err(Self::logical_failure(payload.message, "OCR recognition failed")),
        }
    }
}
