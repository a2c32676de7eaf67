//! Shared HTTP API functionality
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared request/response types
//!
//! The gateway wraps these with axum middleware and extractors.

pub mod auth;
pub mod types;

pub use auth::{validate_api_key, ApiAuthError, API_KEY_HEADER};
pub use types::{EmbeddingRequest, KeywordQuery, TextRequest};
