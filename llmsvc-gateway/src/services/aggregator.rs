//! Cross-chunk entity aggregation

use crate::capabilities::EntityMention;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedEntity {
    pub entity_type: String,
    pub surface_form: String,
    pub frequency: usize,
}

/// Merge per-chunk mentions into ranked `(type, surface form)` counts
///
/// Mentions seen in the overlap of two chunks count once per chunk. Ties in
/// frequency keep the order of first appearance.
pub fn aggregate<I, C>(per_chunk: I) -> Vec<AggregatedEntity>
where
    I: IntoIterator<Item = C>,
    C: IntoIterator<Item = EntityMention>,
{
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut merged: Vec<AggregatedEntity> = Vec::new();

    for mention in per_chunk.into_iter().flatten() {
        let key = (mention.entity_group, mention.word);
        match index.get(&key) {
            Some(&i) => merged[i].frequency += 1,
            None => {
                index.insert(key.clone(), merged.len());
                merged.push(AggregatedEntity {
                    entity_type: key.0,
                    surface_form: key.1,
                    frequency: 1,
                });
            }
        }
    }

    merged.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    merged
}
