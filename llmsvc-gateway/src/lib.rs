//! llmsvc-gateway library interface
//!
//! Exposes the gateway core and the HTTP router for the binary and for
//! integration tests.

pub mod api;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod services;
pub mod text;

pub use crate::error::{ApiError, ApiResult, GatewayError};

use axum::http::{header, HeaderValue};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::capabilities::CapabilityFactory;
use crate::config::GatewaySettings;
use crate::services::{AdmissionController, Gateway};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub settings: Arc<GatewaySettings>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Assemble the gateway core from validated settings
    pub fn new(settings: GatewaySettings, factory: Arc<dyn CapabilityFactory>) -> Self {
        let admission = Arc::new(AdmissionController::new(settings.admission_config()));
        let gateway = Gateway::new(
            settings.catalog.clone(),
            factory,
            admission,
            settings.config.cache.capacity,
            settings.chunker,
        );

        Self {
            gateway: Arc::new(gateway),
            settings: Arc::new(settings),
            startup_time: Utc::now(),
        }
    }

    pub fn max_text_chars(&self) -> usize {
        self.settings.config.server.max_text_chars
    }
}

/// Build application router
///
/// Task and embedding routes require the API key; `/health` is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let protected = Router::new()
        .merge(api::task_routes())
        .merge(api::embedding_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), api::auth_middleware));

    Router::new()
        .merge(protected)
        .merge(api::health_routes())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
