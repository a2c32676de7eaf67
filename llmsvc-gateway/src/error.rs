//! Error types for llmsvc-gateway
//!
//! [`GatewayError`] is what the core reports; [`ApiError`] is what the HTTP
//! surface renders. Every `GatewayError` has exactly one HTTP mapping.

use crate::capabilities::{InferenceError, LoadError, Task};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use llmsvc_common::api::ApiAuthError;
use serde_json::json;
use thiserror::Error;

/// Failure kinds of the gateway core
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client is in backoff; nothing past admission ran
    #[error("Too many failed requests, retry after {retry_after_secs}s")]
    Throttled { retry_after_secs: u64 },

    #[error("Invalid {task} model '{requested}'. Valid models: {}", valid.join(", "))]
    UnknownModel {
        task: Task,
        requested: String,
        valid: Vec<String>,
    },

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Inference failed: {0}")]
    InferenceFailure(#[from] InferenceError),

    #[error("Invalid chunk parameters: overlap {overlap} must be below max span {max_span}")]
    InvalidChunkParameters { max_span: usize, overlap: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<LoadError> for GatewayError {
    fn from(err: LoadError) -> Self {
        GatewayError::CapabilityUnavailable(err.to_string())
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Unauthorized(#[from] ApiAuthError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Common error: {0}")]
    Common(llmsvc_common::Error),
}

/// Request validation failures become [`GatewayError::InvalidInput`]
impl From<llmsvc_common::Error> for ApiError {
    fn from(err: llmsvc_common::Error) -> Self {
        match err {
            llmsvc_common::Error::InvalidInput(message) => {
                ApiError::Gateway(GatewayError::InvalidInput(message))
            }
            other => ApiError::Common(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let mut retry_after = None;
        let mut valid_models = None;

        let (status, error_code) = match self {
            ApiError::Gateway(err) => match err {
                GatewayError::Throttled { retry_after_secs } => {
                    retry_after = Some(retry_after_secs);
                    (StatusCode::TOO_MANY_REQUESTS, "THROTTLED")
                }
                GatewayError::UnknownModel { valid, .. } => {
                    valid_models = Some(valid);
                    (StatusCode::BAD_REQUEST, "UNKNOWN_MODEL")
                }
                GatewayError::CapabilityUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "CAPABILITY_UNAVAILABLE")
                }
                GatewayError::InferenceFailure(_) => (StatusCode::BAD_GATEWAY, "INFERENCE_FAILURE"),
                GatewayError::InvalidChunkParameters { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_CHUNK_PARAMETERS")
                }
                GatewayError::InvalidInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT"),
            },
            ApiError::Unauthorized(_) => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(secs) = retry_after {
            error["retry_after"] = json!(secs);
        }
        if let Some(valid) = valid_models {
            error["valid_models"] = json!(valid);
        }

        let mut response = (status, Json(json!({ "error": error }))).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
