//! Request orchestration
//!
//! Every task goes through the same pipeline:
//!
//! 1. admission (a rejection stops here, nothing else runs)
//! 2. capability resolution
//! 3. text normalization
//! 4. inference, through the result cache (embeddings) or the chunker and
//!    aggregator (entities)
//! 5. the outcome is fed back to admission
//!
//! Any error after admission counts as a failure for the client, whatever
//! its kind. Nothing is retried here.

use super::admission::{AdmissionController, AdmissionDecision, Outcome};
use super::aggregator::{aggregate, AggregatedEntity};
use super::chunker::{Chunker, Tokenizer, WhitespaceTokenizer};
use super::registry::ResourceRegistry;
use super::result_cache::{CacheStats, ResultCache};
use crate::capabilities::{
    CapabilityFactory, KeywordParams, KeywordScore, ModelCatalog, ParaphraseParams, SentimentLabel,
    SummarizeParams, Task,
};
use crate::error::GatewayError;
use crate::text::normalize;
use futures::future::try_join_all;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Separates the model alias from the text in embedding cache keys
const CACHE_KEY_SEPARATOR: char = '\u{1f}';

/// Embedding result plus what the list-shaped response needs
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub model: String,
    pub vector: Vec<f32>,
    pub tokens: usize,
}

/// Point-in-time counters for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStats {
    pub cache: CacheStats,
    pub capabilities_loaded: usize,
    pub tracked_clients: usize,
}

pub struct Gateway {
    admission: Arc<AdmissionController>,
    registry: ResourceRegistry,
    embeddings: ResultCache<Vec<f32>>,
    chunker: Chunker,
    tokenizer: Arc<dyn Tokenizer>,
    summarize_params: SummarizeParams,
    paraphrase_params: ParaphraseParams,
}

impl Gateway {
    pub fn new(
        catalog: ModelCatalog,
        factory: Arc<dyn CapabilityFactory>,
        admission: Arc<AdmissionController>,
        cache_capacity: usize,
        chunker: Chunker,
    ) -> Self {
        Self {
            admission,
            registry: ResourceRegistry::new(catalog, factory),
            embeddings: ResultCache::new(cache_capacity),
            chunker,
            tokenizer: Arc::new(WhitespaceTokenizer),
            summarize_params: SummarizeParams::default(),
            paraphrase_params: ParaphraseParams::default(),
        }
    }

    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Load every required default capability
    pub async fn prewarm(&self) -> Result<(), GatewayError> {
        self.registry.prewarm().await
    }

    pub async fn stats(&self) -> GatewayStats {
        GatewayStats {
            cache: self.embeddings.stats().await,
            capabilities_loaded: self.registry.constructed(),
            tracked_clients: self.admission.client_count().await,
        }
    }

    pub async fn summarize(&self, client: &str, model: Option<&str>, text: &str) -> Result<String, GatewayError> {
        self.guarded(client, Task::Summarization, async {
            let capability = self.registry.resolve(Task::Summarization, model).await?;
            let text = normalize(text);
            Ok::<_, GatewayError>(capability.summarize(&text, &self.summarize_params).await?)
        })
        .await
    }

    pub async fn classify_sentiment(
        &self,
        client: &str,
        model: Option<&str>,
        text: &str,
    ) -> Result<Vec<SentimentLabel>, GatewayError> {
        self.guarded(client, Task::Sentiment, async {
            let capability = self.registry.resolve(Task::Sentiment, model).await?;
            let text = normalize(text);
            Ok::<_, GatewayError>(capability.classify_sentiment(&text).await?)
        })
        .await
    }

    /// Entities ranked by frequency across all chunks of the input
    pub async fn extract_entities(
        &self,
        client: &str,
        model: Option<&str>,
        text: &str,
    ) -> Result<Vec<AggregatedEntity>, GatewayError> {
        self.guarded(client, Task::Ner, async {
            let capability = self.registry.resolve(Task::Ner, model).await?;
            let text = normalize(text);

            let chunks: Vec<_> = self.chunker.split(&text, self.tokenizer.as_ref()).collect();
            debug!(chunks = chunks.len(), "Running entity extraction per chunk");

            let per_chunk = try_join_all(
                chunks
                    .iter()
                    .map(|chunk| capability.extract_entities(&chunk.text)),
            )
            .await?;

            Ok::<_, GatewayError>(aggregate(per_chunk))
        })
        .await
    }

    /// Paraphrase is sampled, so it never touches the cache
    pub async fn paraphrase(&self, client: &str, model: Option<&str>, text: &str) -> Result<String, GatewayError> {
        self.guarded(client, Task::Paraphrase, async {
            let capability = self.registry.resolve(Task::Paraphrase, model).await?;
            let text = normalize(text);
            Ok::<_, GatewayError>(capability.paraphrase(&text, &self.paraphrase_params).await?)
        })
        .await
    }

    pub async fn extract_keywords(
        &self,
        client: &str,
        model: Option<&str>,
        text: &str,
        top_n: usize,
    ) -> Result<Vec<KeywordScore>, GatewayError> {
        self.guarded(client, Task::Keyword, async {
            let capability = self.registry.resolve(Task::Keyword, model).await?;
            let text = normalize(text);
            let params = KeywordParams::with_top_n(top_n);
            Ok::<_, GatewayError>(capability.extract_keywords(&text, &params).await?)
        })
        .await
    }

    /// Embedding of the normalized text, memoized per model
    pub async fn embed(&self, client: &str, model: Option<&str>, text: &str) -> Result<EmbeddingOutput, GatewayError> {
        self.guarded(client, Task::Embedding, async {
            let capability = self.registry.resolve(Task::Embedding, model).await?;
            let text = normalize(text);
            let key = format!("{}{}{}", capability.model_name(), CACHE_KEY_SEPARATOR, text);

            let vector = self
                .embeddings
                .get_or_compute(&key, || async {
                    capability.embed(&text).await.map_err(GatewayError::from)
                })
                .await?;

            Ok::<_, GatewayError>(EmbeddingOutput {
                model: capability.model_name().to_string(),
                vector,
                tokens: self.tokenizer.token_spans(&text).len(),
            })
        })
        .await
    }

    /// Admit, run `work`, record the outcome
    async fn guarded<T, F>(&self, client: &str, task: Task, work: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        if let AdmissionDecision::Reject { retry_after_secs } = self.admission.admit(client).await {
            return Err(GatewayError::Throttled { retry_after_secs });
        }

        let result = work.await;

        match &result {
            Ok(_) => self.admission.record_outcome(client, Outcome::Success).await,
            Err(e) => {
                warn!(client = %client, task = %task, error = %e, "Request failed");
                self.admission.record_outcome(client, Outcome::Failure).await;
            }
        }

        result
    }
}
