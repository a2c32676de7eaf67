//! Gateway core services
//!
//! - [`admission`]: per-client adaptive backoff
//! - [`registry`]: lazy at-most-once capability construction
//! - [`result_cache`]: bounded LRU memoization
//! - [`chunker`] / [`aggregator`]: sliding windows and cross-chunk merge
//! - [`gateway`]: the pipeline every request runs through

pub mod admission;
pub mod aggregator;
pub mod chunker;
pub mod gateway;
pub mod registry;
pub mod result_cache;

pub use admission::{spawn_idle_sweeper, AdmissionConfig, AdmissionController, AdmissionDecision, Outcome};
pub use aggregator::{aggregate, AggregatedEntity};
pub use chunker::{Chunk, Chunker, Chunks, Tokenizer, WhitespaceTokenizer};
pub use gateway::{EmbeddingOutput, Gateway, GatewayStats};
pub use registry::ResourceRegistry;
pub use result_cache::{CacheStats, ResultCache};
