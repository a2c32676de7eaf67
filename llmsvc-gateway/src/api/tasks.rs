//! Task endpoints
//!
//! Handlers validate the body, hand it to the gateway with the caller's
//! identity and shape the result. Validation failures are answered before
//! admission and do not count against the client.

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use llmsvc_common::api::types::{
    EntitiesResponse, EntityFrequency, KeywordsResponse, ParaphraseResponse, SentimentResponse,
    SummaryResponse,
};
use llmsvc_common::api::{KeywordQuery, TextRequest};

use super::client::ClientId;
use crate::error::ApiResult;
use crate::AppState;

/// POST /summarize
pub async fn summarize(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    request.validate(state.max_text_chars())?;
    let summary = state
        .gateway
        .summarize(client.as_str(), request.model.as_deref(), &request.text)
        .await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /sentiment
pub async fn sentiment(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<SentimentResponse>> {
    request.validate(state.max_text_chars())?;
    let sentiment = state
        .gateway
        .classify_sentiment(client.as_str(), request.model.as_deref(), &request.text)
        .await?;
    Ok(Json(SentimentResponse { sentiment }))
}

/// POST /entities
///
/// Entities sorted by how often they occur across the whole text.
pub async fn entities(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<EntitiesResponse>> {
    request.validate(state.max_text_chars())?;
    let entities = state
        .gateway
        .extract_entities(client.as_str(), request.model.as_deref(), &request.text)
        .await?
        .into_iter()
        .map(|e| EntityFrequency {
            entity: e.entity_type,
            word: e.surface_form,
            frequency: e.frequency,
        })
        .collect();
    Ok(Json(EntitiesResponse { entities }))
}

/// POST /paraphrase
pub async fn paraphrase(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<ParaphraseResponse>> {
    request.validate(state.max_text_chars())?;
    let paraphrased_text = state
        .gateway
        .paraphrase(client.as_str(), request.model.as_deref(), &request.text)
        .await?;
    Ok(Json(ParaphraseResponse { paraphrased_text }))
}

/// POST /extract_keywords?num_keywords=N
pub async fn extract_keywords(
    State(state): State<AppState>,
    client: ClientId,
    Query(query): Query<KeywordQuery>,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<KeywordsResponse>> {
    request.validate(state.max_text_chars())?;
    let top_n = query.resolve()?;
    let keywords = state
        .gateway
        .extract_keywords(client.as_str(), request.model.as_deref(), &request.text, top_n)
        .await?;
    Ok(Json(KeywordsResponse { keywords }))
}

/// Task routes, each with and without a trailing slash
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/summarize", post(summarize))
        .route("/summarize/", post(summarize))
        .route("/sentiment", post(sentiment))
        .route("/sentiment/", post(sentiment))
        .route("/entities", post(entities))
        .route("/entities/", post(entities))
        .route("/paraphrase", post(paraphrase))
        .route("/paraphrase/", post(paraphrase))
        .route("/extract_keywords", post(extract_keywords))
        .route("/extract_keywords/", post(extract_keywords))
}
