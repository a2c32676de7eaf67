//! Feature-hashing sentence embedder

use super::word_spans;
use crate::capabilities::{Capability, InferenceError, Task};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

const SMALL_DIMENSIONS: usize = 384;
const BASE_DIMENSIONS: usize = 768;

/// Signed feature hashing of lowercase unigrams and bigrams, L2-normalized
///
/// Equal text always gives the bit-identical vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    alias: String,
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(alias: impl Into<String>, dimensions: usize) -> Self {
        Self {
            alias: alias.into(),
            dimensions: dimensions.max(1),
        }
    }

    /// Dimensionality follows the upstream model family
    pub fn for_model(alias: impl Into<String>, upstream_id: &str) -> Self {
        let dimensions = if upstream_id.contains("MiniLM") {
            SMALL_DIMENSIONS
        } else {
            BASE_DIMENSIONS
        };
        Self::new(alias, dimensions)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let words: Vec<String> = word_spans(text)
            .into_iter()
            .map(|(_, w)| w.to_lowercase())
            .collect();

        for word in &words {
            self.add_feature(&mut vector, word.as_bytes(), 1.0);
        }
        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.add_feature(&mut vector, bigram.as_bytes(), 0.5);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let digest = Sha256::digest(feature);
        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(bucket) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign * weight;
    }
}

/// Cosine similarity of two equal-length vectors (0 when either is zero)
pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[async_trait]
impl Capability for HashingEmbedder {
    fn task(&self) -> Task {
        Task::Embedding
    }

    fn model_name(&self) -> &str {
        &self.alias
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        Ok(self.vectorize(text))
    }
}
