//! # llmsvc Common Library
//!
//! Shared code for the llmsvc text-inference gateway:
//! - Bootstrap configuration (TOML model + file resolution)
//! - API key authentication helpers
//! - HTTP request/response schemas and their validation
//!
//! Nothing in here depends on an HTTP framework; the gateway wraps these
//! pieces with axum extractors and middleware.

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
