//! Embedding endpoints
//!
//! `/embed` returns the bare vector. `/v1/embeddings` wraps it in a
//! list-shaped response with token usage, optionally base64 encoded.

use axum::{extract::State, routing::post, Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use llmsvc_common::api::types::{EmbedResponse, EmbeddingList, EmbeddingVector, EncodingFormat};
use llmsvc_common::api::{EmbeddingRequest, TextRequest};

use super::client::ClientId;
use crate::error::ApiResult;
use crate::AppState;

/// POST /embed
pub async fn embed(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<EmbedResponse>> {
    request.validate(state.max_text_chars())?;
    let output = state
        .gateway
        .embed(client.as_str(), request.model.as_deref(), &request.text)
        .await?;
    Ok(Json(EmbedResponse {
        embedding: output.vector,
    }))
}

/// POST /v1/embeddings
pub async fn create_embeddings(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<EmbeddingRequest>,
) -> ApiResult<Json<EmbeddingList>> {
    request.validate(state.max_text_chars())?;
    let output = state
        .gateway
        .embed(client.as_str(), request.model_name(), &request.input)
        .await?;

    let embedding = match request.encoding_format {
        EncodingFormat::Float => EmbeddingVector::Float(output.vector),
        EncodingFormat::Base64 => EmbeddingVector::Base64(encode_base64(&output.vector)),
    };

    Ok(Json(EmbeddingList::single(output.model, embedding, output.tokens)))
}

/// Little-endian f32 bytes, standard base64
pub fn encode_base64(vector: &[f32]) -> String {
    let bytes: Vec<u8> = vector.iter().flat_map(|v| v.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

pub fn embedding_routes() -> Router<AppState> {
    Router::new()
        .route("/embed", post(embed))
        .route("/embed/", post(embed))
        .route("/v1/embeddings", post(create_embeddings))
        .route("/v1/embeddings/", post(create_embeddings))
}
