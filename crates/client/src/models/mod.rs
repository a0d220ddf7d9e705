//! Recall registry models
//!
//! This module contains the core data types for resolution:
//! - `record` - Registry entries (RecallRecord) and their enums (RecordStatus, RiskLevel)
//! - `result` - The unified lookup contract (ResolutionResult) and BackendKind
//! - `ocr` - OCR request/response types (OcrImage, OcrResult)
//! - `lenient` - Field decoders tolerant of both registry encodings

mod lenient;
mod ocr;
mod record;
mod result;

pub use ocr::{OcrImage, OcrResult};
pub use record::{RecallRecord, RecordStatus, RiskLevel};
pub use result::{BackendKind, ResolutionResult};
