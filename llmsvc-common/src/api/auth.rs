//! API key authentication
//!
//! Every task endpoint requires the configured key in the `Authorization`
//! header. An empty configured key disables checking entirely.
//!
//! Keys are compared through their SHA-256 digests so the comparison time does
//! not depend on how many leading bytes of the provided key are correct.
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. The axum middleware lives in the
//! gateway crate.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "authorization";

/// Authentication error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiAuthError {
    /// No `Authorization` header on the request
    #[error("Not authenticated")]
    MissingKey,

    /// Header present but does not match the configured key
    #[error("Unauthorized")]
    InvalidKey,
}

/// Whether authentication is enabled for the configured key
pub fn auth_enabled(configured_key: &str) -> bool {
    !configured_key.is_empty()
}

/// Validate a provided key against the configured key
///
/// # Examples
///
/// ```
/// use llmsvc_common::api::auth::{validate_api_key, ApiAuthError};
///
/// assert!(validate_api_key(Some("secret"), "secret").is_ok());
/// assert_eq!(validate_api_key(Some("guess"), "secret"), Err(ApiAuthError::InvalidKey));
/// assert_eq!(validate_api_key(None, "secret"), Err(ApiAuthError::MissingKey));
///
/// // Empty configured key disables auth
/// assert!(validate_api_key(None, "").is_ok());
/// ```
pub fn validate_api_key(provided: Option<&str>, configured_key: &str) -> Result<(), ApiAuthError> {
    if !auth_enabled(configured_key) {
        return Ok(());
    }

    let provided = provided.ok_or(ApiAuthError::MissingKey)?;

    if digest(provided) == digest(configured_key) {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidKey)
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key_accepted() {
        assert_eq!(validate_api_key(Some("your-secure-api-key"), "your-secure-api-key"), Ok(()));
    }

    #[test]
    fn test_prefix_of_key_rejected() {
        assert_eq!(
            validate_api_key(Some("your-secure"), "your-secure-api-key"),
            Err(ApiAuthError::InvalidKey)
        );
    }

    #[test]
    fn test_missing_header_rejected_when_enabled() {
        assert_eq!(validate_api_key(None, "k"), Err(ApiAuthError::MissingKey));
    }

    #[test]
    fn test_empty_configured_key_disables_auth() {
        assert!(!auth_enabled(""));
        assert_eq!(validate_api_key(Some("anything"), ""), Ok(()));
        assert_eq!(validate_api_key(None, ""), Ok(()));
    }
}
