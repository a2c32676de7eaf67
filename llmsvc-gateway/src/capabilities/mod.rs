//! Inference capabilities
//!
//! A capability is one loaded model for one task. The gateway treats it as an
//! opaque strategy behind the [`Capability`] trait; adapters decide how the
//! inference actually happens:
//! - [`builtin`]: in-process reference adapters
//! - [`remote`]: an external inference server over HTTP
//!
//! Task-specific parameters are plain data passed through unchanged.

pub mod builtin;
pub mod catalog;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub use catalog::{ModelCatalog, ModelSpec};
pub use llmsvc_common::api::types::{KeywordScore, SentimentLabel};

/// Tasks served by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Embedding,
    Summarization,
    Sentiment,
    Ner,
    Paraphrase,
    Keyword,
}

impl Task {
    pub const ALL: [Task; 6] = [
        Task::Embedding,
        Task::Summarization,
        Task::Sentiment,
        Task::Ner,
        Task::Paraphrase,
        Task::Keyword,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Embedding => "embedding",
            Task::Summarization => "summarization",
            Task::Sentiment => "sentiment",
            Task::Ner => "ner",
            Task::Paraphrase => "paraphrase",
            Task::Keyword => "keyword",
        }
    }

    /// Default capability must be loaded before the server accepts traffic
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Task::Summarization | Task::Sentiment | Task::Ner | Task::Paraphrase
        )
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| format!("unknown task '{}'", s))
    }
}

/// Summarization parameters (beam search, deterministic)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarizeParams {
    pub max_length: usize,
    pub min_length: usize,
    pub do_sample: bool,
    pub num_beams: u32,
    pub early_stopping: bool,
}

impl Default for SummarizeParams {
    fn default() -> Self {
        Self {
            max_length: 450,
            min_length: 150,
            do_sample: false,
            num_beams: 4,
            early_stopping: true,
        }
    }
}

/// Paraphrase parameters (sampled, so never cacheable)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParaphraseParams {
    pub prompt_prefix: String,
    pub max_length: usize,
    pub num_return_sequences: u32,
    pub do_sample: bool,
    pub temperature: f32,
}

impl Default for ParaphraseParams {
    fn default() -> Self {
        Self {
            prompt_prefix: "paraphrase: ".to_string(),
            max_length: 150,
            num_return_sequences: 1,
            do_sample: true,
            temperature: 0.9,
        }
    }
}

/// Keyword extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordParams {
    /// Inclusive (min, max) words per keyphrase
    pub keyphrase_ngram_range: (usize, usize),
    pub stop_words: Option<String>,
    pub top_n: usize,
}

impl KeywordParams {
    pub fn with_top_n(top_n: usize) -> Self {
        Self {
            keyphrase_ngram_range: (1, 2),
            stop_words: Some("english".to_string()),
            top_n,
        }
    }
}

/// One entity span recognized in a piece of text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityMention {
    /// Entity type (PER, ORG, LOC, MISC)
    pub entity_group: String,
    /// Surface form as it appears in the text
    pub word: String,
    pub score: f32,
    /// Byte offsets into the text the capability was given
    pub start: usize,
    pub end: usize,
}

/// Failure of a single inference call
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{task} capability does not support {operation}")]
    Unsupported {
        task: Task,
        operation: &'static str,
    },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Malformed backend response: {0}")]
    Malformed(String),
}

/// Failure to construct a capability
#[derive(Debug, Clone, Error)]
#[error("Failed to load {model} for {task}: {reason}")]
pub struct LoadError {
    pub task: Task,
    pub model: String,
    pub reason: String,
}

/// One loaded inference capability
///
/// Adapters implement the operation matching their task; every other
/// operation reports [`InferenceError::Unsupported`].
#[async_trait]
pub trait Capability: Send + Sync {
    fn task(&self) -> Task;

    /// Alias the capability was resolved under
    fn model_name(&self) -> &str;

    async fn summarize(&self, _text: &str, _params: &SummarizeParams) -> Result<String, InferenceError> {
        Err(self.unsupported("summarize"))
    }

    async fn classify_sentiment(&self, _text: &str) -> Result<Vec<SentimentLabel>, InferenceError> {
        Err(self.unsupported("classify_sentiment"))
    }

    async fn extract_entities(&self, _text: &str) -> Result<Vec<EntityMention>, InferenceError> {
        Err(self.unsupported("extract_entities"))
    }

    async fn paraphrase(&self, _text: &str, _params: &ParaphraseParams) -> Result<String, InferenceError> {
        Err(self.unsupported("paraphrase"))
    }

    async fn extract_keywords(
        &self,
        _text: &str,
        _params: &KeywordParams,
    ) -> Result<Vec<KeywordScore>, InferenceError> {
        Err(self.unsupported("extract_keywords"))
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, InferenceError> {
        Err(self.unsupported("embed"))
    }

    fn unsupported(&self, operation: &'static str) -> InferenceError {
        InferenceError::Unsupported {
            task: self.task(),
            operation,
        }
    }
}

/// Shared capability handle
pub type CapabilityHandle = Arc<dyn Capability>;

/// Constructs capabilities on demand for the registry
#[async_trait]
pub trait CapabilityFactory: Send + Sync {
    async fn load(&self, spec: &ModelSpec) -> Result<CapabilityHandle, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmbedOnly;

    #[async_trait]
    impl Capability for EmbedOnly {
        fn task(&self) -> Task {
            Task::Embedding
        }

        fn model_name(&self) -> &str {
            "embed-only"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, InferenceError> {
            Ok(vec![1.0])
        }
    }

    #[test]
    fn test_task_round_trips_through_str() {
        for task in Task::ALL {
            assert_eq!(task.as_str().parse::<Task>().unwrap(), task);
        }
        assert!("translation".parse::<Task>().is_err());
    }

    #[test]
    fn test_required_tasks() {
        let required: Vec<Task> = Task::ALL.into_iter().filter(Task::is_required).collect();
        assert_eq!(
            required,
            vec![Task::Summarization, Task::Sentiment, Task::Ner, Task::Paraphrase]
        );
    }

    #[tokio::test]
    async fn test_unimplemented_operations_report_unsupported() {
        let capability = EmbedOnly;
        assert_eq!(capability.embed("x").await.unwrap(), vec![1.0]);

        let err = capability
            .summarize("x", &SummarizeParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Unsupported {
                task: Task::Embedding,
                operation: "summarize"
            }
        ));
    }

    #[test]
    fn test_default_parameters() {
        let summarize = SummarizeParams::default();
        assert_eq!((summarize.max_length, summarize.min_length, summarize.num_beams), (450, 150, 4));
        assert!(!summarize.do_sample);

        let paraphrase = ParaphraseParams::default();
        assert!(paraphrase.do_sample);
        assert_eq!(paraphrase.prompt_prefix, "paraphrase: ");

        let keywords = KeywordParams::with_top_n(7);
        assert_eq!(keywords.keyphrase_ngram_range, (1, 2));
        assert_eq!(keywords.top_n, 7);
    }
}
