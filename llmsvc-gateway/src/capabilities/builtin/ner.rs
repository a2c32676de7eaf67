//! Capitalization-based entity tagger
//!
//! Runs of capitalized words form one entity span (grouped, like a
//! token-classification model with simple aggregation). The span type comes
//! from small cue lists: organization suffixes, location prepositions,
//! personal titles and first names; anything else is MISC.

use super::word_spans;
use crate::capabilities::{Capability, EntityMention, InferenceError, Task};
use async_trait::async_trait;

const FUNCTION_WORDS: &[&str] = &[
    "A", "An", "And", "As", "At", "But", "By", "For", "From", "He", "Her", "His", "I", "If", "In",
    "It", "Its", "Mr", "Mrs", "Ms", "Dr", "My", "Of", "On", "Or", "She", "So", "That", "The",
    "Their", "There", "These", "They", "This", "Those", "To", "We", "What", "When", "Where",
    "Which", "While", "Who", "With", "You",
];

const TITLES: &[&str] = &["Mr", "Mrs", "Ms", "Dr", "Prof", "President", "Senator"];

const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Corp", "Corporation", "Company", "Co", "Ltd", "LLC", "Group", "Bank", "University",
    "Institute", "Foundation", "Agency", "Council",
];

const LOCATION_CUES: &[&str] = &["in", "at", "from", "to", "near", "across"];

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Emma", "Frank", "Grace", "Henry", "Isabel", "James",
    "John", "Maria", "Mary", "Michael", "Olivia", "Peter", "Sarah", "Thomas", "William",
];

pub struct CapitalizationTagger {
    alias: String,
}

impl CapitalizationTagger {
    pub fn new(alias: impl Into<String>) -> Self {
        Self { alias: alias.into() }
    }

    fn tag(text: &str) -> Vec<EntityMention> {
        let words = word_spans(text);
        let mut mentions = Vec::new();
        let mut i = 0;

        while i < words.len() {
            if !is_entity_word(words[i].1) {
                i += 1;
                continue;
            }

            let first = i;
            while i < words.len() && is_entity_word(words[i].1) && contiguous(text, &words, first, i) {
                i += 1;
            }
            let last = i - 1;

            let start = words[first].0;
            let end = words[last].0 + words[last].1.len();
            let previous = first.checked_sub(1).map(|p| words[p].1);

            mentions.push(EntityMention {
                entity_group: classify(&words[first..=last], previous).to_string(),
                word: text[start..end].to_string(),
                score: 0.9,
                start,
                end,
            });
        }

        mentions
    }
}

fn is_entity_word(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase) && !FUNCTION_WORDS.contains(&word)
}

/// Words `first..=i` are separated only by single spaces
fn contiguous(text: &str, words: &[(usize, &str)], first: usize, i: usize) -> bool {
    if i == first {
        return true;
    }
    let (prev_start, prev) = words[i - 1];
    &text[prev_start + prev.len()..words[i].0] == " "
}

fn classify(span: &[(usize, &str)], previous: Option<&str>) -> &'static str {
    let first = span[0].1;
    let last = span[span.len() - 1].1;

    let acronym = span.len() == 1 && first.len() > 1 && first.chars().all(|c| c.is_ascii_uppercase());

    if ORG_SUFFIXES.contains(&last) || acronym {
        "ORG"
    } else if previous.is_some_and(|p| TITLES.contains(&p)) || FIRST_NAMES.contains(&first) {
        "PER"
    } else if previous.is_some_and(|p| LOCATION_CUES.contains(&p)) {
        "LOC"
    } else {
        "MISC"
    }
}

#[async_trait]
impl Capability for CapitalizationTagger {
    fn task(&self) -> Task {
        Task::Ner
    }

    fn model_name(&self) -> &str {
        &self.alias
    }

    async fn extract_entities(&self, text: &str) -> Result<Vec<EntityMention>, InferenceError> {
        Ok(Self::tag(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        CapitalizationTagger::tag(text)
            .into_iter()
            .map(|m| (m.entity_group, m.word))
            .collect()
    }

    #[test]
    fn test_types_from_cues() {
        assert_eq!(
            pairs("Alice Smith joined Acme Corp in Berlin after meeting Dr Jones at NASA."),
            vec![
                ("PER".to_string(), "Alice Smith".to_string()),
                ("ORG".to_string(), "Acme Corp".to_string()),
                ("LOC".to_string(), "Berlin".to_string()),
                ("PER".to_string(), "Jones".to_string()),
                ("ORG".to_string(), "NASA".to_string()),
            ]
        );
    }

    #[test]
    fn test_function_words_are_not_entities() {
        assert!(pairs("The cat sat. It was happy.").is_empty());
    }

    #[test]
    fn test_punctuation_breaks_spans() {
        assert_eq!(
            pairs("Alice, Bob"),
            vec![
                ("PER".to_string(), "Alice".to_string()),
                ("PER".to_string(), "Bob".to_string()),
            ]
        );
    }

    #[test]
    fn test_offsets_slice_the_input() {
        let text = "We visit Lisbon soon";
        let mention = &CapitalizationTagger::tag(text)[0];
        assert_eq!(&text[mention.start..mention.end], "Lisbon");
    }
}
