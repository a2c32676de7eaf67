//! Sampled synonym paraphraser

use crate::capabilities::{Capability, InferenceError, ParaphraseParams, Task};
use async_trait::async_trait;
use rand::Rng;

const SYNONYMS: &[(&str, &[&str])] = &[
    ("big", &["large", "huge", "sizable"]),
    ("small", &["little", "tiny", "compact"]),
    ("fast", &["quick", "rapid", "speedy"]),
    ("slow", &["sluggish", "unhurried"]),
    ("good", &["fine", "solid", "decent"]),
    ("bad", &["poor", "weak"]),
    ("happy", &["glad", "pleased", "cheerful"]),
    ("important", &["significant", "key", "crucial"]),
    ("use", &["employ", "utilize"]),
    ("help", &["assist", "support"]),
    ("show", &["reveal", "demonstrate"]),
    ("buy", &["purchase", "acquire"]),
    ("start", &["begin", "launch"]),
    ("end", &["finish", "conclude"]),
    ("make", &["create", "produce"]),
    ("many", &["numerous", "several"]),
    ("often", &["frequently", "regularly"]),
    ("very", &["extremely", "highly"]),
];

pub struct SynonymParaphraser {
    alias: String,
}

impl SynonymParaphraser {
    pub fn new(alias: impl Into<String>) -> Self {
        Self { alias: alias.into() }
    }

    /// Swap known words for a random synonym with probability `temperature`
    ///
    /// The prompt prefix is stripped when present; at most `max_length`
    /// words are returned.
    fn rewrite<R: Rng>(text: &str, params: &ParaphraseParams, rng: &mut R) -> String {
        let text = text.strip_prefix(params.prompt_prefix.as_str()).unwrap_or(text);
        let swap_probability = if params.do_sample {
            f64::from(params.temperature).clamp(0.0, 1.0)
        } else {
            0.0
        };

        text.split_whitespace()
            .take(params.max_length)
            .map(|token| {
                let core = token.trim_end_matches(|c: char| !c.is_alphanumeric());
                let suffix = &token[core.len()..];
                let lower = core.to_lowercase();

                match SYNONYMS.iter().find(|(word, _)| *word == lower) {
                    Some((_, choices)) if rng.gen_bool(swap_probability) => {
                        let choice = choices[rng.gen_range(0..choices.len())];
                        format!("{}{}", match_case(core, choice), suffix)
                    }
                    _ => token.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

#[async_trait]
impl Capability for SynonymParaphraser {
    fn task(&self) -> Task {
        Task::Paraphrase
    }

    fn model_name(&self) -> &str {
        &self.alias
    }

    async fn paraphrase(&self, text: &str, params: &ParaphraseParams) -> Result<String, InferenceError> {
        Ok(Self::rewrite(text, params, &mut rand::thread_rng()))
    }
}
