use serde::{Deserialize, Serialize};

/// Image handed to the remote OCR endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum OcrImage {
    /// A URL the OCR service can fetch
    #[serde(rename = "image_url")]
    Url(String),
    /// Base64-encoded image bytes
    #[serde(rename = "image_base64")]
    Base64(String),
}

/// Batch code recognized by the OCR service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub batch_code: String,
    #[serde(default)]
    pub confidence: f64,
}
