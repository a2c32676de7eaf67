//! Remote inference server adapter
//!
//! Every call is one JSON round trip:
//!
//! ```text
//! POST {endpoint}/v1/infer
//! {"task": "...", "model": "<upstream id>", "input": "...", "parameters": {...}}
//! -> 200 {"output": <task-specific JSON>}
//! ```
//!
//! Loading a capability asks the server to load the model first
//! (`POST {endpoint}/v1/load` with `{"task", "model"}`), so a missing model
//! surfaces at resolve time rather than on the first request.

use super::{
    Capability, CapabilityFactory, CapabilityHandle, EntityMention, InferenceError, KeywordParams,
    KeywordScore, LoadError, ModelSpec, ParaphraseParams, SentimentLabel, SummarizeParams, Task,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("llmsvc-gateway/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    task: Task,
    model: &'a str,
    input: &'a str,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct InferResponse {
    output: Value,
}

#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    task: Task,
    model: &'a str,
}

/// Shared HTTP client for one inference server
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    http_client: reqwest::Client,
    endpoint: String,
}

impl RemoteBackend {
    /// Build the HTTP client; fails only if the TLS backend cannot initialize
    pub fn new(endpoint: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn infer<T: DeserializeOwned>(
        &self,
        spec: &ModelSpec,
        input: &str,
        parameters: Value,
    ) -> Result<T, InferenceError> {
        let url = format!("{}/v1/infer", self.endpoint);
        tracing::debug!(task = %spec.task, model = %spec.upstream_id, url = %url, "Remote inference");

        let response = self
            .http_client
            .post(&url)
            .json(&InferRequest {
                task: spec.task,
                model: &spec.upstream_id,
                input,
                parameters,
            })
            .send()
            .await
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::Backend(format!("HTTP {}: {}", status.as_u16(), error_text)));
        }

        let body: InferResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        serde_json::from_value(body.output).map_err(|e| InferenceError::Malformed(e.to_string()))
    }

    async fn load(&self, spec: &ModelSpec) -> Result<(), String> {
        let url = format!("{}/v1/load", self.endpoint);
        let response = self
            .http_client
            .post(&url)
            .json(&LoadRequest {
                task: spec.task,
                model: &spec.upstream_id,
            })
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(format!("HTTP {}: {}", status.as_u16(), error_text))
        }
    }
}

/// One model served by the remote backend
pub struct RemoteCapability {
    backend: RemoteBackend,
    spec: ModelSpec,
}

fn params_value<P: Serialize>(params: &P) -> Result<Value, InferenceError> {
    serde_json::to_value(params).map_err(|e| InferenceError::Malformed(e.to_string()))
}

#[async_trait]
impl Capability for RemoteCapability {
    fn task(&self) -> Task {
        self.spec.task
    }

    fn model_name(&self) -> &str {
        &self.spec.alias
    }

    async fn summarize(&self, text: &str, params: &SummarizeParams) -> Result<String, InferenceError> {
        self.check(Task::Summarization, "summarize")?;
        self.backend.infer(&self.spec, text, params_value(params)?).await
    }

    async fn classify_sentiment(&self, text: &str) -> Result<Vec<SentimentLabel>, InferenceError> {
        self.check(Task::Sentiment, "classify_sentiment")?;
        self.backend.infer(&self.spec, text, Value::Null).await
    }

    async fn extract_entities(&self, text: &str) -> Result<Vec<EntityMention>, InferenceError> {
        self.check(Task::Ner, "extract_entities")?;
        let parameters = serde_json::json!({ "aggregation_strategy": "simple" });
        self.backend.infer(&self.spec, text, parameters).await
    }

    async fn paraphrase(&self, text: &str, params: &ParaphraseParams) -> Result<String, InferenceError> {
        self.check(Task::Paraphrase, "paraphrase")?;
        let input = format!("{}{}", params.prompt_prefix, text);
        self.backend.infer(&self.spec, &input, params_value(params)?).await
    }

    async fn extract_keywords(
        &self,
        text: &str,
        params: &KeywordParams,
    ) -> Result<Vec<KeywordScore>, InferenceError> {
        self.check(Task::Keyword, "extract_keywords")?;
        self.backend.infer(&self.spec, text, params_value(params)?).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        self.check(Task::Embedding, "embed")?;
        self.backend.infer(&self.spec, text, Value::Null).await
    }
}

impl RemoteCapability {
    fn check(&self, task: Task, operation: &'static str) -> Result<(), InferenceError> {
        if self.spec.task == task {
            Ok(())
        } else {
            Err(self.unsupported(operation))
        }
    }
}

/// Builds [`RemoteCapability`] handles after the server confirms the model
pub struct RemoteFactory {
    backend: RemoteBackend,
}

impl RemoteFactory {
    pub fn new(backend: RemoteBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl CapabilityFactory for RemoteFactory {
    async fn load(&self, spec: &ModelSpec) -> Result<CapabilityHandle, LoadError> {
        self.backend.load(spec).await.map_err(|reason| LoadError {
            task: spec.task,
            model: spec.alias.clone(),
            reason,
        })?;

        tracing::info!(
            task = %spec.task,
            model = %spec.upstream_id,
            endpoint = %self.backend.endpoint(),
            "Remote model loaded"
        );

        Ok(Arc::new(RemoteCapability {
            backend: self.backend.clone(),
            spec: spec.clone(),
        }))
    }
}
