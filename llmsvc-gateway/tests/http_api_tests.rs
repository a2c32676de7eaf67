//! HTTP surface integration tests
//!
//! Drives the full router (auth, admission, registry, cache, chunking) with
//! the builtin capabilities. Client identity comes from `MockConnectInfo`.

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use llmsvc_common::config::TomlConfig;
use llmsvc_gateway::capabilities::builtin::BuiltinFactory;
use llmsvc_gateway::config::{ConfigOverrides, GatewaySettings};
use llmsvc_gateway::{build_router, AppState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

const API_KEY: &str = "test-key";

fn test_state(mutate: impl FnOnce(&mut TomlConfig)) -> AppState {
    let mut config = TomlConfig::default();
    config.server.api_key = API_KEY.to_string();
    mutate(&mut config);

    let settings = GatewaySettings::resolve(config, None, ConfigOverrides::default()).unwrap();
    AppState::new(settings, Arc::new(BuiltinFactory))
}

fn app_for(state: AppState, peer: [u8; 4]) -> Router {
    build_router(state).layer(MockConnectInfo(SocketAddr::from((peer, 40000))))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_or_wrong_key_is_forbidden() {
    let app = app_for(test_state(|_| {}), [10, 0, 0, 1]);

    let no_key = Request::builder()
        .method("POST")
        .uri("/summarize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"text": "hello"}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(no_key).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut wrong = post("/summarize", json!({"text": "hello"}));
    wrong
        .headers_mut()
        .insert(header::AUTHORIZATION, "guess".parse().unwrap());
    let response = app.oneshot(wrong).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_health_is_public_and_reports_stats() {
    let app = app_for(test_state(|_| {}), [10, 0, 0, 1]);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "llmsvc-gateway");
    assert_eq!(body["stats"]["cache"]["capacity"], 1024);
}

#[tokio::test]
async fn test_trailing_slash_routes() {
    let app = app_for(test_state(|_| {}), [10, 0, 0, 1]);

    for uri in ["/sentiment", "/sentiment/"] {
        let response = app
            .clone()
            .oneshot(post(uri, json!({"text": "What a wonderful day"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["sentiment"][0]["label"], "POSITIVE");
    }
}

#[tokio::test]
async fn test_unknown_model_lists_valid_names() {
    let app = app_for(test_state(|_| {}), [10, 0, 0, 1]);

    let response = app
        .oneshot(post("/summarize", json!({"text": "Some text.", "model": "gpt-unknown"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNKNOWN_MODEL");
    let valid = body["error"]["valid_models"].as_array().unwrap();
    assert!(valid.contains(&json!("t5-small")));
}

#[tokio::test]
async fn test_failure_throttles_client_with_retry_after() {
    let state = test_state(|_| {});
    let client_a = app_for(state.clone(), [10, 0, 0, 1]);
    let client_b = app_for(state, [10, 0, 0, 2]);

    // One failure after admission
    let response = client_a
        .clone()
        .oneshot(post("/summarize", json!({"text": "x", "model": "nope"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Immediate retry is throttled even with a valid request
    let response = client_a
        .clone()
        .oneshot(post("/summarize", json!({"text": "A sentence."})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    assert_eq!(body_json(response).await["error"]["retry_after"], 2);

    // Another client is unaffected
    let response = client_b
        .oneshot(post("/summarize", json!({"text": "A sentence."})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_validation_happens_before_admission() {
    let state = test_state(|config| config.server.max_text_chars = 10);
    let app = app_for(state.clone(), [10, 0, 0, 1]);

    for text in ["", "this text is far too long"] {
        let response = app
            .clone()
            .oneshot(post("/paraphrase", json!({ "text": text })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_INPUT");
    }

    assert_eq!(state.gateway.admission().error_count("10.0.0.1").await, 0);
    assert_eq!(state.gateway.admission().client_count().await, 0);
}

#[tokio::test]
async fn test_entities_ranked_by_frequency() {
    let app = app_for(test_state(|_| {}), [10, 0, 0, 1]);

    let response = app
        .oneshot(post(
            "/entities",
            json!({"text": "Alice met Bob in Paris. Alice called Bob. Alice left."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let entities = body["entities"].as_array().unwrap();
    assert_eq!(entities[0], json!({"entity": "PER", "word": "Alice", "frequency": 3}));
    assert_eq!(entities[1], json!({"entity": "PER", "word": "Bob", "frequency": 2}));
    assert_eq!(entities[2], json!({"entity": "LOC", "word": "Paris", "frequency": 1}));
}

#[tokio::test]
async fn test_long_entity_input_is_chunked() {
    let state = test_state(|config| {
        config.chunking.max_span = 4;
        config.chunking.overlap = 1;
    });
    let app = app_for(state, [10, 0, 0, 1]);

    // Tokens 0..4 and 3..7 share "Alice" at index 3
    let response = app
        .oneshot(post("/entities", json!({"text": "one two three Alice five six seven"})))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["entities"][0]["word"], "Alice");
    assert_eq!(body["entities"][0]["frequency"], 2);
}

#[tokio::test]
async fn test_keywords_query_bounds() {
    let app = app_for(test_state(|_| {}), [10, 0, 0, 1]);
    let text = json!({"text": "Rust ownership makes memory safety practical for systems programming teams"});

    let response = app
        .clone()
        .oneshot(post("/extract_keywords?num_keywords=3", text.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["keywords"].as_array().unwrap().len(), 3);

    let response = app
        .oneshot(post("/extract_keywords?num_keywords=21", text))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_embeddings_endpoints_share_cache() {
    let state = test_state(|_| {});
    let app = app_for(state.clone(), [10, 0, 0, 1]);

    let response = app
        .clone()
        .oneshot(post("/embed", json!({"text": "hello world"})))
        .await
        .unwrap();
    let embed = body_json(response).await;
    assert_eq!(embed["embedding"].as_array().unwrap().len(), 384);

    let response = app
        .clone()
        .oneshot(post("/v1/embeddings", json!({"input": "hello   world"})))
        .await
        .unwrap();
    let list = body_json(response).await;
    assert_eq!(list["object"], "list");
    assert_eq!(list["model"], "all-MiniLM-L6-v2");
    assert_eq!(list["usage"]["prompt_tokens"], 2);
    assert_eq!(list["data"][0]["embedding"], embed["embedding"]);

    let response = app
        .oneshot(post(
            "/v1/embeddings",
            json!({"input": "hello world", "model": "", "encoding_format": "base64"}),
        ))
        .await
        .unwrap();
    let encoded = body_json(response).await;
    assert!(encoded["data"][0]["embedding"].is_string());

    let stats = state.gateway.stats().await;
    assert_eq!((stats.cache.misses, stats.cache.hits), (1, 2));
}
