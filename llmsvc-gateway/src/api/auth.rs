//! API key middleware
//!
//! Applied to task routes only; `/health` stays public.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use llmsvc_common::api::{validate_api_key, API_KEY_HEADER};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Reject requests whose `Authorization` header does not carry the configured key
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = validate_api_key(provided, &state.settings.config.server.api_key) {
        warn!(path = %request.uri().path(), reason = %e, "Rejected unauthenticated request");
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
