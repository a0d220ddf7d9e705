//! Recall Check Client Crate
//!
//! This crate resolves product batch codes against recall registries.
//!
//! # Overview
//!
//! The client supports:
//! - Canonical batch code normalization
//! - Exact and fuzzy matching against registry records
//! - A primary registry API with server-side matching
//! - A secondary (table-backed) registry with bearer token auth
//! - Sticky failover from primary to secondary
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Caller (CLI)   | --> | ResolutionClient |  (sticky two-state failover)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Normalizer    |  (trim + upper-case)
//!                          +------------------+
//!                                  |
//!                   +--------------+--------------+
//!                   v                             v
//!          +------------------+          +------------------+
//!          |  PrimaryBackend  |          | SecondaryBackend |  (token + local Matcher)
//!          +------------------+          +------------------+
//!                   |                             |
//!                   +--------------+--------------+
//!                                  v
//!                          +------------------+
//!                          | ResolutionResult |  (one contract for both)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`ResolutionClient`] - Orchestrates normalization, backends and failover
//! - [`RecallBackend`] - Adapter trait implemented by both registries
//! - [`RecallRecord`] - One registry entry
//! - [`ResolutionResult`] - Unified lookup result
//! - [`MatchConfig`] - Fuzzy matching configuration

pub mod backend;
pub mod client;
pub mod config;
pub mod errors;
pub mod matcher;
pub mod models;
pub mod normalize;

pub use backend::{
    PrimaryBackend, RecallBackend, SecondaryBackend, TenantToken, TokenCache,
};
pub use client::{BackendState, ResolutionClient};
pub use config::{ClientConfig, SecondaryConfig};
pub use errors::{FailoverClass, RecallError, Result};
pub use matcher::{match_kind, match_records, split_batch_codes, MatchConfig, MatchKind};
pub use models::{
    BackendKind, OcrImage, OcrResult, RecallRecord, RecordStatus, ResolutionResult, RiskLevel,
};
pub use normalize::normalize;
