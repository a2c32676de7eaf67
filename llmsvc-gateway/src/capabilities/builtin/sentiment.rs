//! Lexicon sentiment classifier

use super::word_spans;
use crate::capabilities::{Capability, InferenceError, SentimentLabel, Task};
use async_trait::async_trait;

const POSITIVE: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "better", "brilliant", "delightful", "enjoy",
    "enjoyed", "excellent", "fantastic", "fast", "glad", "good", "great", "happy", "helpful",
    "impressive", "love", "loved", "nice", "perfect", "pleasant", "recommend", "reliable",
    "satisfied", "smooth", "superb", "wonderful",
];

const NEGATIVE: &[&str] = &[
    "angry", "annoying", "awful", "bad", "broken", "buggy", "crash", "crashed", "disappointed",
    "disappointing", "fail", "failed", "hate", "hated", "horrible", "poor", "problem", "sad",
    "slow", "terrible", "unhappy", "unreliable", "useless", "waste", "worse", "worst", "wrong",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "don't", "doesn't", "isn't", "wasn't", "can't"];

/// Label vocabulary of the model being emulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScheme {
    /// `POSITIVE` / `NEGATIVE`
    Binary,
    /// `1 star` .. `5 stars`
    FiveStar,
}

impl LabelScheme {
    pub fn for_model(upstream_id: &str) -> Self {
        if upstream_id.contains("multilingual-uncased-sentiment") {
            LabelScheme::FiveStar
        } else {
            LabelScheme::Binary
        }
    }
}

pub struct LexiconSentiment {
    alias: String,
    scheme: LabelScheme,
}

impl LexiconSentiment {
    pub fn new(alias: impl Into<String>, scheme: LabelScheme) -> Self {
        Self {
            alias: alias.into(),
            scheme,
        }
    }

    /// Polarity in [-1, 1]; a negation flips the next sentiment word
    fn polarity(text: &str) -> f32 {
        let mut score = 0i32;
        let mut hits = 0i32;
        let mut negate = false;

        for (_, word) in word_spans(text) {
            let word = word.to_lowercase();
            let w = word.as_str();
            let value = if POSITIVE.contains(&w) {
                1
            } else if NEGATIVE.contains(&w) {
                -1
            } else {
                if NEGATIONS.contains(&w) {
                    negate = true;
                }
                continue;
            };

            score += if negate { -value } else { value };
            hits += 1;
            negate = false;
        }

        if hits == 0 {
            0.0
        } else {
            score as f32 / hits as f32
        }
    }

    fn classify(&self, text: &str) -> SentimentLabel {
        let polarity = Self::polarity(text);

        match self.scheme {
            LabelScheme::Binary => {
                let label = if polarity >= 0.0 { "POSITIVE" } else { "NEGATIVE" };
                SentimentLabel {
                    label: label.to_string(),
                    score: 0.5 + polarity.abs() * 0.49,
                }
            }
            LabelScheme::FiveStar => {
                let stars = ((polarity + 1.0) * 2.0).round() as u8 + 1;
                let label = if stars == 1 {
                    "1 star".to_string()
                } else {
                    format!("{} stars", stars)
                };
                SentimentLabel {
                    label,
                    score: 0.4 + polarity.abs() * 0.5,
                }
            }
        }
    }
}

#[async_trait]
impl Capability for LexiconSentiment {
    fn task(&self) -> Task {
        Task::Sentiment
    }

    fn model_name(&self) -> &str {
        &self.alias
    }

    async fn classify_sentiment(&self, text: &str) -> Result<Vec<SentimentLabel>, InferenceError> {
        Ok(vec![self.classify(text)])
    }
}
