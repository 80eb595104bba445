// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs with strict unknown-key rejection.

use serde::{Deserialize, Serialize};

/// Top-level Docwarden configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to values that run fully offline.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DocwardenConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Where documents are loaded from.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Passage splitting.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding backend.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Index artifact location.
    #[serde(default)]
    pub index: IndexConfig,

    /// Hybrid retrieval and fusion.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Prompt assembly and citation handling.
    #[serde(default)]
    pub answer: AnswerConfig,

    /// Language-model backend.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Ollama HTTP endpoint.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Durable fact stores.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Assistant identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in the shell prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "docwarden".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Document collection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Directory walked recursively for documents.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// File extensions (without dot) accepted as documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            extensions: default_extensions(),
        }
    }
}

fn default_source_dir() -> String {
    "data".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string(), "md".to_string()]
}

/// Passage splitting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkingConfig {
    /// Upper bound on chunk length, in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Characters of the previous chunk's tail carried into the next one.
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            overlap_chars: default_overlap_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    500
}

fn default_overlap_chars() -> usize {
    100
}

/// Which embedding implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Feature-hashed bag of words; offline and dependency free.
    Hash,
    /// all-MiniLM-L6-v2 through ONNX Runtime.
    Onnx,
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_backend")]
    pub backend: EmbeddingBackend,

    /// Vector width for the hashing backend. The ONNX model is fixed at 384.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Directory holding downloaded model files.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Texts per embedding call during index builds.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            dimensions: default_dimensions(),
            data_dir: None,
            batch_size: default_batch_size(),
        }
    }
}

fn default_embedding_backend() -> EmbeddingBackend {
    EmbeddingBackend::Hash
}

fn default_dimensions() -> usize {
    384
}

fn default_batch_size() -> usize {
    64
}

/// Index artifact configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Root directory for index generations and the `CURRENT` pointer.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
        }
    }
}

fn default_artifacts_dir() -> String {
    "artifacts".to_string()
}

/// Hybrid retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Number of fused results returned.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Each ranked list contributes `top_k * candidate_multiplier` candidates.
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,

    /// Reciprocal Rank Fusion damping constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            candidate_multiplier: default_candidate_multiplier(),
            rrf_k: default_rrf_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_candidate_multiplier() -> usize {
    3
}

fn default_rrf_k() -> f64 {
    60.0
}

/// Prompt assembly and citation handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerConfig {
    #[serde(default = "default_max_context_chunks")]
    pub max_context_chunks: usize,

    /// Each chunk is truncated to this many characters in the prompt.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Re-prompts allowed when an answer carries no valid citation.
    #[serde(default = "default_max_citation_retries")]
    pub max_citation_retries: u32,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_context_chunks: default_max_context_chunks(),
            max_chunk_chars: default_max_chunk_chars(),
            max_citation_retries: default_max_citation_retries(),
        }
    }
}

fn default_max_context_chunks() -> usize {
    5
}

fn default_max_chunk_chars() -> usize {
    1200
}

fn default_max_citation_retries() -> u32 {
    1
}

/// Which generation backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackend {
    /// A local Ollama server.
    Ollama,
    /// Deterministic sentence extraction from the prompt's sources.
    Extractive,
}

/// Generation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_backend")]
    pub backend: GenerationBackend,

    /// Model name passed to the backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on a single generation call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: default_generation_backend(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_generation_backend() -> GenerationBackend {
    GenerationBackend::Ollama
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Ollama server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Memory store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory engine. When false, no facts are read or written.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Markdown file holding facts about the user.
    #[serde(default = "default_user_store_path")]
    pub user_store_path: String,

    /// Markdown file holding facts about the organisation.
    #[serde(default = "default_company_store_path")]
    pub company_store_path: String,

    /// Decisions below this confidence are not persisted.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            user_store_path: default_user_store_path(),
            company_store_path: default_company_store_path(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_user_store_path() -> String {
    "USER_MEMORY.md".to_string()
}

fn default_company_store_path() -> String {
    "COMPANY_MEMORY.md".to_string()
}

fn default_min_confidence() -> f64 {
    0.8
}
