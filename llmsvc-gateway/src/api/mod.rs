//! HTTP API handlers for llmsvc-gateway

pub mod auth;
pub mod client;
pub mod embeddings;
pub mod health;
pub mod tasks;

pub use auth::auth_middleware;
pub use client::ClientId;
pub use embeddings::embedding_routes;
pub use health::health_routes;
pub use tasks::task_routes;
