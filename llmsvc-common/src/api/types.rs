//! HTTP request/response schemas
//!
//! Request types carry their own validation so the gateway can reject bad
//! input before any admission or inference work happens.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of keywords returned by `/extract_keywords`
pub const DEFAULT_NUM_KEYWORDS: usize = 5;

/// Upper bound on `num_keywords`
pub const MAX_NUM_KEYWORDS: usize = 20;

// ========================================
// Requests
// ========================================

/// Body of every single-text task endpoint
///
/// # Examples
///
/// ```
/// use llmsvc_common::api::types::TextRequest;
///
/// let request: TextRequest = serde_json::from_str(r#"{"text": "Hello there."}"#).unwrap();
/// assert!(request.model.is_none());
/// assert!(request.validate(5000).is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextRequest {
    pub text: String,
    /// Model alias; the task default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl TextRequest {
    pub fn validate(&self, max_chars: usize) -> Result<()> {
        validate_text("text", &self.text, max_chars)
    }
}

/// How `/v1/embeddings` encodes vectors
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    #[default]
    Float,
    /// Little-endian f32 bytes, base64 encoded
    Base64,
}

/// Body of `/v1/embeddings`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingRequest {
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub encoding_format: EncodingFormat,
}

impl EmbeddingRequest {
    pub fn validate(&self, max_chars: usize) -> Result<()> {
        validate_text("input", &self.input, max_chars)
    }

    /// Requested model, treating an empty string as "use the default"
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().filter(|name| !name.is_empty())
    }
}

/// Query string of `/extract_keywords`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeywordQuery {
    pub num_keywords: Option<usize>,
}

impl KeywordQuery {
    /// Requested keyword count, defaulted and range checked (1..=20)
    pub fn resolve(&self) -> Result<usize> {
        let n = self.num_keywords.unwrap_or(DEFAULT_NUM_KEYWORDS);
        if n == 0 || n > MAX_NUM_KEYWORDS {
            return Err(Error::InvalidInput(format!(
                "num_keywords must be between 1 and {}, got {}",
                MAX_NUM_KEYWORDS, n
            )));
        }
        Ok(n)
    }
}

fn validate_text(field: &str, value: &str, max_chars: usize) -> Result<()> {
    let length = value.chars().count();
    if length == 0 {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    if length > max_chars {
        return Err(Error::InvalidInput(format!(
            "{} is {} characters, maximum is {}",
            field, length, max_chars
        )));
    }
    Ok(())
}

// ========================================
// Responses
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResponse {
    pub summary: String,
}

/// One label/score pair of a sentiment classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentLabel {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentResponse {
    pub sentiment: Vec<SentimentLabel>,
}

/// Entity with its frequency across the whole request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityFrequency {
    pub entity: String,
    pub word: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitiesResponse {
    pub entities: Vec<EntityFrequency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParaphraseResponse {
    pub paraphrased_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordScore {
    pub keyword: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordsResponse {
    pub keywords: Vec<KeywordScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
}

/// Vector payload of `/v1/embeddings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EmbeddingVector {
    Float(Vec<f32>),
    Base64(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingData {
    pub object: String,
    pub index: usize,
    pub embedding: EmbeddingVector,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddingUsage {
    pub prompt_tokens: usize,
    pub total_tokens: usize,
}

/// List-shaped embedding response of `/v1/embeddings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingList {
    pub object: String,
    pub data: Vec<EmbeddingData>,
    pub model: String,
    pub usage: EmbeddingUsage,
}

impl EmbeddingList {
    /// Single-input list response
    pub fn single(model: impl Into<String>, embedding: EmbeddingVector, tokens: usize) -> Self {
        Self {
            object: "list".to_string(),
            data: vec![EmbeddingData {
                object: "embedding".to_string(),
                index: 0,
                embedding,
            }],
            model: model.into(),
            usage: EmbeddingUsage {
                prompt_tokens: tokens,
                total_tokens: tokens,
            },
        }
    }
}
