//! Keyphrase extraction by embedding similarity
//!
//! Candidates are the n-grams of the requested range that neither start nor
//! end with a stop word. Each candidate is scored by cosine similarity between
//! its embedding and the embedding of the whole document.

use super::embedder::{cosine, HashingEmbedder};
use super::word_spans;
use crate::capabilities::{Capability, InferenceError, KeywordParams, KeywordScore, Task};
use async_trait::async_trait;
use std::collections::HashSet;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

pub struct KeywordRanker {
    embedder: HashingEmbedder,
    alias: String,
}

impl KeywordRanker {
    pub fn new(embedder: HashingEmbedder) -> Self {
        let alias = embedder.model_name().to_string();
        Self { embedder, alias }
    }

    fn candidates(text: &str, params: &KeywordParams) -> Vec<String> {
        let stop_words: HashSet<&str> = match params.stop_words.as_deref() {
            Some("english") => ENGLISH_STOP_WORDS.iter().copied().collect(),
            _ => HashSet::new(),
        };

        let words: Vec<String> = word_spans(text)
            .into_iter()
            .map(|(_, w)| w.to_lowercase())
            .collect();

        let (min_n, max_n) = params.keyphrase_ngram_range;
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for n in min_n.max(1)..=max_n {
            for gram in words.windows(n) {
                let first = gram[0].as_str();
                let last = gram[n - 1].as_str();
                if stop_words.contains(first) || stop_words.contains(last) {
                    continue;
                }
                let phrase = gram.join(" ");
                if seen.insert(phrase.clone()) {
                    out.push(phrase);
                }
            }
        }
        out
    }
}

#[async_trait]
impl Capability for KeywordRanker {
    fn task(&self) -> Task {
        Task::Keyword
    }

    fn model_name(&self) -> &str {
        &self.alias
    }

    async fn extract_keywords(
        &self,
        text: &str,
        params: &KeywordParams,
    ) -> Result<Vec<KeywordScore>, InferenceError> {
        let document = self.embedder.vectorize(text);

        let mut scored: Vec<KeywordScore> = Self::candidates(text, params)
            .into_iter()
            .map(|phrase| {
                let score = cosine(&document, &self.embedder.vectorize(&phrase));
                KeywordScore {
                    keyword: phrase,
                    score: (score * 10_000.0).round() / 10_000.0,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(params.top_n);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranker() -> KeywordRanker {
        KeywordRanker::new(HashingEmbedder::new("all-MiniLM-L6-v2", 384))
    }

    #[test]
    fn test_candidates_skip_stop_word_edges() {
        let candidates = KeywordRanker::candidates("the rust compiler is fast", &KeywordParams::with_top_n(5));

        assert!(candidates.contains(&"rust".to_string()));
        assert!(candidates.contains(&"rust compiler".to_string()));
        assert!(!candidates.contains(&"the".to_string()));
        assert!(!candidates.contains(&"compiler is".to_string()));
    }

    #[tokio::test]
    async fn test_returns_at_most_top_n_sorted() {
        let text = "Rust ownership rules make memory safety practical. Ownership and borrowing \
                    are checked by the compiler, and memory safety comes without a garbage collector.";
        let keywords = ranker()
            .extract_keywords(text, &KeywordParams::with_top_n(3))
            .await
            .unwrap();

        assert_eq!(keywords.len(), 3);
        assert!(keywords.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_alias() {
        assert_eq!(ranker().task(), Task::Keyword);
        assert_eq!(ranker().model_name(), "all-MiniLM-L6-v2");
    }
}
