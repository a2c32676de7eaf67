//! Startup settings for llmsvc-gateway
//!
//! Resolution: CLI flags (and their environment variables) override the TOML
//! file, which overrides compiled defaults. The merged result is validated
//! once; any problem here stops the service before it binds a port.

use crate::capabilities::ModelCatalog;
use crate::services::{AdmissionConfig, Chunker};
use llmsvc_common::config::TomlConfig;
use llmsvc_common::{Error, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// Values supplied on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub log_level: Option<String>,
    pub embedding_model: Option<String>,
    pub summarization_model: Option<String>,
    pub sentiment_model: Option<String>,
    pub ner_model: Option<String>,
    pub paraphrase_model: Option<String>,
    pub keyword_model: Option<String>,
}

/// Validated settings the service runs with
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub config: TomlConfig,
    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
    pub catalog: ModelCatalog,
    pub chunker: Chunker,
}

impl GatewaySettings {
    /// Merge `overrides` into `config` and validate the result
    pub fn resolve(mut config: TomlConfig, source: Option<PathBuf>, overrides: ConfigOverrides) -> Result<Self> {
        apply_overrides(&mut config, overrides);

        if config.cache.capacity == 0 {
            return Err(Error::Config("[cache] capacity must be at least 1".to_string()));
        }
        if config.throttle.base_backoff_secs > config.throttle.max_backoff_secs {
            return Err(Error::Config(format!(
                "[throttle] base_backoff_secs ({}) exceeds max_backoff_secs ({})",
                config.throttle.base_backoff_secs, config.throttle.max_backoff_secs
            )));
        }

        let chunker = Chunker::from_config(&config.chunking).map_err(|e| Error::Config(e.to_string()))?;
        let catalog = ModelCatalog::from_config(&config.models)?;

        if config.server.api_key.is_empty() {
            warn!("No API key configured, authentication is disabled");
        } else {
            info!("API key authentication enabled");
        }

        Ok(Self {
            config,
            source,
            catalog,
            chunker,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }

    pub fn admission_config(&self) -> AdmissionConfig {
        AdmissionConfig::from(&self.config.throttle)
    }
}

fn apply_overrides(config: &mut TomlConfig, overrides: ConfigOverrides) {
    fn set<T>(target: &mut T, value: Option<T>) {
        if let Some(value) = value {
            *target = value;
        }
    }

    set(&mut config.server.host, overrides.host);
    set(&mut config.server.port, overrides.port);
    set(&mut config.server.api_key, overrides.api_key);
    set(&mut config.logging.level, overrides.log_level);

    let models = &mut config.models;
    set(&mut models.embedding_model, overrides.embedding_model);
    set(&mut models.summarization_model, overrides.summarization_model);
    set(&mut models.sentiment_model, overrides.sentiment_model);
    set(&mut models.ner_model, overrides.ner_model);
    set(&mut models.paraphrase_model, overrides.paraphrase_model);
    set(&mut models.keyword_model, overrides.keyword_model);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Task;

    #[test]
    fn test_defaults_resolve() {
        let settings = GatewaySettings::resolve(TomlConfig::default(), None, ConfigOverrides::default()).unwrap();
        assert_eq!(settings.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.chunker.max_span(), 512);
        assert_eq!(settings.admission_config().base_backoff_secs, 1);
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = TomlConfig::default();
        config.server.port = 7000;
        config.server.api_key = "from-file".to_string();

        let overrides = ConfigOverrides {
            port: Some(8080),
            api_key: Some("from-cli".to_string()),
            summarization_model: Some("t5-small".to_string()),
            ..ConfigOverrides::default()
        };
        let settings = GatewaySettings::resolve(config, None, overrides).unwrap();

        assert_eq!(settings.config.server.port, 8080);
        assert_eq!(settings.config.server.api_key, "from-cli");
        assert_eq!(settings.catalog.default_alias(Task::Summarization), "t5-small");
    }

    #[test]
    fn test_unknown_default_model_is_fatal() {
        let overrides = ConfigOverrides {
            ner_model: Some("not-a-model".to_string()),
            ..ConfigOverrides::default()
        };
        assert!(GatewaySettings::resolve(TomlConfig::default(), None, overrides).is_err());
    }

    #[test]
    fn test_invalid_chunking_is_fatal() {
        let mut config = TomlConfig::default();
        config.chunking.overlap = config.chunking.max_span;
        let err = GatewaySettings::resolve(config, None, ConfigOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("chunk"));
    }

    #[test]
    fn test_backoff_and_capacity_checked() {
        let mut config = TomlConfig::default();
        config.throttle.base_backoff_secs = 120;
        assert!(GatewaySettings::resolve(config, None, ConfigOverrides::default()).is_err());

        let mut config = TomlConfig::default();
        config.cache.capacity = 0;
        assert!(GatewaySettings::resolve(config, None, ConfigOverrides::default()).is_err());
    }
}
