//! In-process reference adapters
//!
//! Deterministic, dependency-free stand-ins for the real models so the
//! gateway runs (and is tested) without a model server. Quality is not the
//! point; shapes and task semantics are. Paraphrase is the only sampled
//! adapter.

mod embedder;
mod keywords;
mod ner;
mod paraphraser;
mod sentiment;
mod summarizer;

pub use embedder::HashingEmbedder;
pub use keywords::KeywordRanker;
pub use ner::CapitalizationTagger;
pub use paraphraser::SynonymParaphraser;
pub use sentiment::{LabelScheme, LexiconSentiment};
pub use summarizer::ExtractiveSummarizer;

use super::{CapabilityFactory, CapabilityHandle, LoadError, ModelSpec, Task};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Builds builtin adapters for any allow-listed model
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFactory;

#[async_trait]
impl CapabilityFactory for BuiltinFactory {
    async fn load(&self, spec: &ModelSpec) -> Result<CapabilityHandle, LoadError> {
        debug!(task = %spec.task, model = %spec.alias, "Building builtin capability");
        let alias = spec.alias.clone();

        let handle: CapabilityHandle = match spec.task {
            Task::Embedding => Arc::new(HashingEmbedder::for_model(alias, &spec.upstream_id)),
            Task::Keyword => Arc::new(KeywordRanker::new(HashingEmbedder::for_model(
                alias,
                &spec.upstream_id,
            ))),
            Task::Summarization => Arc::new(ExtractiveSummarizer::new(alias)),
            Task::Sentiment => Arc::new(LexiconSentiment::new(
                alias,
                LabelScheme::for_model(&spec.upstream_id),
            )),
            Task::Ner => Arc::new(CapitalizationTagger::new(alias)),
            Task::Paraphrase => Arc::new(SynonymParaphraser::new(alias)),
        };

        Ok(handle)
    }
}

/// Words of `text` with their byte offsets, split on anything that is not
/// alphanumeric or an apostrophe
pub(crate) fn word_spans(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        let is_word = c.is_alphanumeric() || c == '\'';
        match (is_word, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                words.push((s, &text[s..i]));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }

    words
}

/// Sentences of `text`, split after `.`, `!` or `?` followed by whitespace
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next, n)) = chars.peek() {
            if n.is_whitespace() {
                let sentence = text[start..next].trim();
                if !sentence.is_empty() {
                    out.push(sentence);
                }
                start = next;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}
