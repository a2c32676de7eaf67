//! Model catalog: per-task allow-lists and defaults
//!
//! Names requested by clients are aliases; each alias maps to the upstream
//! model id the backend actually loads. Only aliases in a task's allow-list
//! can ever be constructed.

use super::Task;
use llmsvc_common::config::ModelsConfig;
use llmsvc_common::{Error, Result};
use std::collections::BTreeMap;

/// A resolvable model: task, client-facing alias, upstream id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelSpec {
    pub task: Task,
    pub alias: String,
    pub upstream_id: String,
}

#[derive(Debug, Clone)]
struct TaskModels {
    default: String,
    supported: BTreeMap<String, String>,
}

/// Allow-lists and defaults for every task
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    tasks: BTreeMap<Task, TaskModels>,
}

fn builtin_supported(task: Task) -> BTreeMap<String, String> {
    let pairs: &[(&str, &str)] = match task {
        Task::Embedding => &[
            ("all-MiniLM-L6-v2", "all-MiniLM-L6-v2"),
            ("all-mpnet-base-v2", "all-mpnet-base-v2"),
            ("all-distilroberta-v1", "all-distilroberta-v1"),
        ],
        Task::Summarization => &[
            ("facebook/bart-large-cnn", "facebook/bart-large-cnn"),
            ("t5-small", "t5-small"),
            ("t5-base", "t5-base"),
        ],
        Task::Sentiment => &[
            (
                "distilbert-base-uncased-finetuned-sst-2-english",
                "distilbert-base-uncased-finetuned-sst-2-english",
            ),
            ("bert-base-uncased", "nlptown/bert-base-multilingual-uncased-sentiment"),
        ],
        Task::Ner => &[
            (
                "dbmdz/bert-large-cased-finetuned-conll03-english",
                "dbmdz/bert-large-cased-finetuned-conll03-english",
            ),
            ("bert-base-cased", "dslim/bert-base-NER"),
        ],
        Task::Paraphrase => &[
            ("Vamsi/T5_Paraphrase_Paws", "Vamsi/T5_Paraphrase_Paws"),
            ("t5-small-paraphrase", "ramsrigouthamg/t5-small-paraphraser"),
        ],
        Task::Keyword => &[
            ("all-MiniLM-L6-v2", "all-MiniLM-L6-v2"),
            ("all-mpnet-base-v2", "all-mpnet-base-v2"),
        ],
    };

    pairs
        .iter()
        .map(|(alias, upstream)| (alias.to_string(), upstream.to_string()))
        .collect()
}

fn configured_default(models: &ModelsConfig, task: Task) -> &str {
    match task {
        Task::Embedding => &models.embedding_model,
        Task::Summarization => &models.summarization_model,
        Task::Sentiment => &models.sentiment_model,
        Task::Ner => &models.ner_model,
        Task::Paraphrase => &models.paraphrase_model,
        Task::Keyword => &models.keyword_model,
    }
}

impl ModelCatalog {
    /// Build the catalog from configuration
    ///
    /// Allow-list overrides replace the built-in list of their task. Every
    /// default must be a member of its task's allow-list.
    pub fn from_config(models: &ModelsConfig) -> Result<Self> {
        for task_name in models.supported.keys() {
            task_name.parse::<Task>().map_err(|e| {
                Error::Config(format!("[models.supported.{}]: {}", task_name, e))
            })?;
        }

        let mut tasks = BTreeMap::new();
        for task in Task::ALL {
            let supported = match models.supported.get(task.as_str()) {
                Some(overrides) if !overrides.is_empty() => overrides.clone(),
                Some(_) => {
                    return Err(Error::Config(format!(
                        "[models.supported.{}] must list at least one model",
                        task
                    )))
                }
                None => builtin_supported(task),
            };

            let default = configured_default(models, task).to_string();
            if !supported.contains_key(&default) {
                return Err(Error::Config(format!(
                    "Default {} model '{}' is not supported. Supported: {}",
                    task,
                    default,
                    supported.keys().cloned().collect::<Vec<_>>().join(", ")
                )));
            }

            tasks.insert(task, TaskModels { default, supported });
        }

        Ok(Self { tasks })
    }

    /// Spec of `alias` for `task`, if it is in the allow-list
    pub fn lookup(&self, task: Task, alias: &str) -> Option<ModelSpec> {
        let models = self.tasks.get(&task)?;
        models.supported.get(alias).map(|upstream| ModelSpec {
            task,
            alias: alias.to_string(),
            upstream_id: upstream.clone(),
        })
    }

    /// Alias of the configured default for `task`
    pub fn default_alias(&self, task: Task) -> &str {
        self.tasks
            .get(&task)
            .map(|models| models.default.as_str())
            .unwrap_or_default()
    }

    /// Spec of the configured default for `task`
    pub fn default_spec(&self, task: Task) -> Option<ModelSpec> {
        self.lookup(task, self.default_alias(task))
    }

    /// Allow-listed aliases for `task`, sorted
    pub fn supported_names(&self, task: Task) -> Vec<String> {
        self.tasks
            .get(&task)
            .map(|models| models.supported.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let tasks = Task::ALL
            .into_iter()
            .map(|task| {
                let default = configured_default(&ModelsConfig::default(), task).to_string();
                (
                    task,
                    TaskModels {
                        default,
                        supported: builtin_supported(task),
                    },
                )
            })
            .collect();
        Self { tasks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_resolves_every_default() {
        let catalog = ModelCatalog::default();
        for task in Task::ALL {
            let spec = catalog.default_spec(task).expect("default must be allow-listed");
            assert_eq!(spec.task, task);
        }
        assert_eq!(catalog.default_alias(Task::Embedding), "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_alias_maps_to_upstream_id() {
        let catalog = ModelCatalog::default();
        let spec = catalog.lookup(Task::Ner, "bert-base-cased").unwrap();
        assert_eq!(spec.upstream_id, "dslim/bert-base-NER");
    }

    #[test]
    fn test_lookup_is_per_task() {
        let catalog = ModelCatalog::default();
        assert!(catalog.lookup(Task::Embedding, "all-distilroberta-v1").is_some());
        assert!(catalog.lookup(Task::Keyword, "all-distilroberta-v1").is_none());
    }

    #[test]
    fn test_from_config_rejects_default_outside_allow_list() {
        let mut models = ModelsConfig::default();
        models.summarization_model = "gpt-unknown".to_string();

        let err = ModelCatalog::from_config(&models).unwrap_err();
        assert!(err.to_string().contains("gpt-unknown"));
    }

    #[test]
    fn test_from_config_override_replaces_list() {
        let mut models = ModelsConfig::default();
        models.embedding_model = "tiny".to_string();
        models
            .supported
            .entry("embedding".to_string())
            .or_default()
            .insert("tiny".to_string(), "org/tiny".to_string());

        let catalog = ModelCatalog::from_config(&models).unwrap();
        assert_eq!(catalog.supported_names(Task::Embedding), vec!["tiny".to_string()]);
        assert!(catalog.lookup(Task::Embedding, "all-MiniLM-L6-v2").is_none());
    }

    #[test]
    fn test_from_config_rejects_unknown_task_section() {
        let mut models = ModelsConfig::default();
        models
            .supported
            .entry("translation".to_string())
            .or_default()
            .insert("m".to_string(), "m".to_string());

        assert!(ModelCatalog::from_config(&models).is_err());
    }
}
