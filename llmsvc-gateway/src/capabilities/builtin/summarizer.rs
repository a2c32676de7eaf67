//! Extractive summarizer
//!
//! Sentences are scored by the document frequency of their content words;
//! the best ones are kept in original order until `max_length` words.

use super::{sentences, word_spans};
use crate::capabilities::{Capability, InferenceError, SummarizeParams, Task};
use async_trait::async_trait;
use std::collections::HashMap;

pub struct ExtractiveSummarizer {
    alias: String,
}

impl ExtractiveSummarizer {
    pub fn new(alias: impl Into<String>) -> Self {
        Self { alias: alias.into() }
    }

    fn summarize_text(text: &str, params: &SummarizeParams) -> String {
        let sentences = sentences(text);
        if sentences.len() <= 1 {
            return truncate_words(text.trim(), params.max_length);
        }

        let mut frequency: HashMap<String, usize> = HashMap::new();
        for (_, word) in word_spans(text) {
            if word.chars().count() > 3 {
                *frequency.entry(word.to_lowercase()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(usize, f32)> = sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                let words = word_spans(sentence);
                let total: usize = words
                    .iter()
                    .filter_map(|(_, w)| frequency.get(&w.to_lowercase()))
                    .sum();
                (i, total as f32 / words.len().max(1) as f32)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut chosen = Vec::new();
        let mut length = 0;
        for (i, _) in ranked {
            let words = word_spans(sentences[i]).len();
            if length > 0 && length + words > params.max_length {
                continue;
            }
            chosen.push(i);
            length += words;
            if length >= params.min_length.min(params.max_length) && length * 2 >= word_spans(text).len() {
                break;
            }
        }
        chosen.sort_unstable();

        let summary = chosen.iter().map(|&i| sentences[i]).collect::<Vec<_>>().join(" ");
        truncate_words(&summary, params.max_length)
    }
}

fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text.to_string()
    } else {
        words[..max_words].join(" ")
    }
}

#[async_trait]
impl Capability for ExtractiveSummarizer {
    fn task(&self) -> Task {
        Task::Summarization
    }

    fn model_name(&self) -> &str {
        &self.alias
    }

    async fn summarize(&self, text: &str, params: &SummarizeParams) -> Result<String, InferenceError> {
        Ok(Self::summarize_text(text, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "The city council approved the new transit budget on Monday. \
        The transit budget adds bus routes and extends train service hours. \
        Council members debated the budget for three hours. \
        Lunch was served at noon. \
        Residents had asked the council for better transit service for years.";

    #[test]
    fn test_summary_is_drawn_from_input_in_order() {
        let params = SummarizeParams {
            max_length: 30,
            min_length: 5,
            ..SummarizeParams::default()
        };
        let summary = ExtractiveSummarizer::summarize_text(ARTICLE, &params);

        assert!(!summary.is_empty());
        assert!(summary.split_whitespace().count() <= 30);
        assert!(!summary.contains("Lunch was served"));

        let positions: Vec<usize> = sentences(&summary)
            .iter()
            .map(|s| ARTICLE.find(s).expect("sentence must come from the input"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_sentence_is_returned_whole() {
        let summary = ExtractiveSummarizer::summarize_text("Just one sentence here", &SummarizeParams::default());
        assert_eq!(summary, "Just one sentence here");
    }

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("a b c d", 2), "a b");
        assert_eq!(truncate_words("a b", 5), "a b");
    }
}
