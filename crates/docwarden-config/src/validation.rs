// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: size relationships, positive
//! limits, URL shape, and probability ranges.

use crate::diagnostic::ConfigError;
use crate::model::DocwardenConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing on the first.
pub fn validate_config(config: &DocwardenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` must be one of: {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.ingest.source_dir.trim().is_empty() {
        errors.push(ConfigError::validation("ingest.source_dir must not be empty"));
    }
    if config.ingest.extensions.is_empty() {
        errors.push(ConfigError::validation(
            "ingest.extensions must list at least one extension",
        ));
    }

    let chunking = &config.chunking;
    if chunking.max_chars == 0 {
        errors.push(ConfigError::validation("chunking.max_chars must be positive"));
    } else if chunking.overlap_chars >= chunking.max_chars {
        errors.push(ConfigError::validation(format!(
            "chunking.overlap_chars ({}) must be smaller than chunking.max_chars ({})",
            chunking.overlap_chars, chunking.max_chars
        )));
    }

    if config.embedding.dimensions == 0 {
        errors.push(ConfigError::validation("embedding.dimensions must be positive"));
    }
    if config.embedding.batch_size == 0 {
        errors.push(ConfigError::validation("embedding.batch_size must be positive"));
    }

    if config.index.artifacts_dir.trim().is_empty() {
        errors.push(ConfigError::validation("index.artifacts_dir must not be empty"));
    }

    let retrieval = &config.retrieval;
    if retrieval.top_k == 0 {
        errors.push(ConfigError::validation("retrieval.top_k must be positive"));
    }
    if retrieval.candidate_multiplier == 0 {
        errors.push(ConfigError::validation(
            "retrieval.candidate_multiplier must be positive",
        ));
    }
    if !(retrieval.rrf_k.is_finite() && retrieval.rrf_k > 0.0) {
        errors.push(ConfigError::validation(format!(
            "retrieval.rrf_k must be a positive number, got {}",
            retrieval.rrf_k
        )));
    }

    if config.answer.max_context_chunks == 0 {
        errors.push(ConfigError::validation("answer.max_context_chunks must be positive"));
    }
    if config.answer.max_chunk_chars == 0 {
        errors.push(ConfigError::validation("answer.max_chunk_chars must be positive"));
    }

    if config.generation.model.trim().is_empty() {
        errors.push(ConfigError::validation("generation.model must not be empty"));
    }
    if config.generation.timeout_secs == 0 {
        errors.push(ConfigError::validation("generation.timeout_secs must be positive"));
    }

    if !is_http_url(&config.ollama.base_url) {
        errors.push(ConfigError::validation(format!(
            "ollama.base_url `{}` is not an http(s) URL",
            config.ollama.base_url
        )));
    }

    let memory = &config.memory;
    if !(0.0..=1.0).contains(&memory.min_confidence) {
        errors.push(ConfigError::validation(format!(
            "memory.min_confidence must be within 0.0..=1.0, got {}",
            memory.min_confidence
        )));
    }
    if memory.enabled && memory.user_store_path == memory.company_store_path {
        errors.push(ConfigError::validation(
            "memory.user_store_path and memory.company_store_path must differ",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', ':']).next().unwrap_or_default();
            !host.is_empty() && !rest.contains(char::is_whitespace)
        }
        None => false,
    }
}
