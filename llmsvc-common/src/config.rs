//! Bootstrap configuration loading and config file resolution
//!
//! The gateway is configured once at startup from a TOML file. Every field has
//! a compiled default, so a missing file is not an error: the service starts
//! with defaults. Loading happens before logging is set up, so nothing here
//! logs; the caller reports the returned source (and warns when it is `None`).
//!
//! # Config File Priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`LLMSVC_CONFIG`)
//! 3. User config (`~/.config/llmsvc/config.toml`)
//! 4. System config (`/etc/llmsvc/config.toml`)
//! 5. Compiled defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LLMSVC_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub backend: BackendConfig,
    pub models: ModelsConfig,
    pub cache: CacheConfig,
    pub throttle: ThrottleConfig,
    pub chunking: ChunkingConfig,
}

/// HTTP listener and request limits
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Value expected in the `Authorization` header. Empty disables auth.
    pub api_key: String,
    /// Maximum accepted input length in characters
    pub max_text_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_key: String::new(),
            max_text_chars: 5000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Which adapter family backs the inference capabilities
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process reference adapters (no model server needed)
    #[default]
    Builtin,
    /// External inference server reached over HTTP
    Remote,
}

/// Inference backend selection
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Base URL of the inference server (remote backend only)
    pub endpoint: String,
    /// Per-call timeout for remote inference
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Builtin,
            endpoint: "http://127.0.0.1:8500".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Default model per task plus optional allow-list overrides
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ModelsConfig {
    pub embedding_model: String,
    pub summarization_model: String,
    pub sentiment_model: String,
    pub ner_model: String,
    pub paraphrase_model: String,
    pub keyword_model: String,
    /// Task name -> (alias -> upstream model id). Replaces the built-in
    /// allow-list for each task that appears here.
    pub supported: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            summarization_model: "facebook/bart-large-cnn".to_string(),
            sentiment_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            ner_model: "dbmdz/bert-large-cased-finetuned-conll03-english".to_string(),
            paraphrase_model: "Vamsi/T5_Paraphrase_Paws".to_string(),
            keyword_model: "all-MiniLM-L6-v2".to_string(),
            supported: BTreeMap::new(),
        }
    }
}

/// Embedding result cache sizing
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Adaptive admission control tuning
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ThrottleConfig {
    pub base_backoff_secs: u64,
    pub max_backoff_secs: u64,
    /// Trailing window kept per client for request timestamps
    pub window_secs: u64,
    /// Clients with no request for this long are forgotten (0 keeps them forever)
    pub idle_eviction_secs: u64,
    pub sweep_interval_secs: u64,
    /// Admit a failing client again once its backoff has elapsed
    pub release_after_backoff: bool,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            base_backoff_secs: 1,
            max_backoff_secs: 60,
            window_secs: 60,
            idle_eviction_secs: 600,
            sweep_interval_secs: 60,
            release_after_backoff: false,
        }
    }
}

/// Sliding-window chunking for span-limited capabilities
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_span: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_span: 512,
            overlap: 50,
        }
    }
}

impl TomlConfig {
    /// Resolve the config file and load it, falling back to defaults
    ///
    /// An explicitly named file (CLI or environment) must exist; the
    /// well-known locations are optional.
    ///
    /// Returns the configuration and the path it was read from; `None` means
    /// no file was found and compiled defaults are in effect.
    pub fn load(cli_arg: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match explicit_config_path(cli_arg).or_else(default_config_path) {
            Some(path) => {
                let config = load_toml_config(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }
}

/// Config path named by the CLI argument or `LLMSVC_CONFIG`
fn explicit_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    std::env::var(CONFIG_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// First existing well-known config location
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("llmsvc").join("config.toml"));
    let system_config = PathBuf::from("/etc/llmsvc/config.toml");

    user_config
        .into_iter()
        .chain(std::iter::once(system_config))
        .find(|path| path.exists())
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config = toml::from_str(&content)?;
    Ok(config)
}
