use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::errors::{RecallError, Result};
use crate::models::BackendKind;

pub(super) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RecallError::Config(format!("Failed to initialize HTTP client: {}", e)))
}

pub(super) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Read a response body and decode it.
///
/// Registries answer logical failures with a JSON payload even on 4xx/5xx,
/// so the body is decoded regardless of the HTTP status. Only when that
/// fails does the status decide the error message.
pub(super) async fn decode_body<T: DeserializeOwned>(
    backend: BackendKind,
    response: Response,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RecallError::from_transport(backend, e))?;

    serde_json::from_str(&body).map_err(|e| {
        let message = if status.is_success() {
            format!("Failed to parse response: {}", e)
        } else {
            format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )
        };
        RecallError::Backend { backend, message }
    })
}
