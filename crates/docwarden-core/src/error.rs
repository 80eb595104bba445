// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Docwarden.

use std::path::PathBuf;

use thiserror::Error;

/// Sentence shown when the collection cannot answer a question.
pub const REFUSAL_NOT_FOUND: &str =
    "I don't have enough information in the uploaded documents to answer that.";

/// Sentence shown when a query or answer touches confidential contact data.
pub const REFUSAL_CONFIDENTIAL: &str =
    "I can't share that information because it is confidential.";

/// Sentence shown when a query looks like an attempt to subvert the assistant.
pub const REFUSAL_INJECTION: &str = "I cannot assist with that request.";

/// The primary error type used across all Docwarden adapter traits and core operations.
#[derive(Debug, Error)]
pub enum DocwardenError {
    /// Configuration errors (invalid values, unknown backends).
    #[error("configuration error: {0}")]
    Config(String),

    /// A document could not be read or decoded.
    #[error("ingestion error for {}: {message}", path.display())]
    Ingestion { path: PathBuf, message: String },

    /// No index has been built or the persisted index is unusable.
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),

    /// Artifact or memory file I/O and serialization failures.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding backend errors (model load, tokenization, inference).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generation backend errors (connection failure, bad response, model not found).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DocwardenError {
    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Fixed, user-facing sentence for this error.
    ///
    /// Details never leave the process through this path; they go to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Config(_) => "The assistant is misconfigured. Check the configuration and try again.",
            Self::Ingestion { .. } => "Some documents could not be read.",
            Self::IndexUnavailable(_) => {
                "No document index is available yet. Run ingestion first."
            }
            Self::Storage { .. } => "Local data could not be read or written.",
            Self::Embedding { .. } => "The embedding model is unavailable right now.",
            Self::Generation { .. } | Self::HealthCheckFailed { .. } => {
                "The language model is unavailable right now. Please try again."
            }
            Self::Timeout { .. } => "The language model took too long to respond. Please try again.",
            Self::Internal(_) => "Something went wrong while answering. Please try again.",
        }
    }
}

impl From<std::io::Error> for DocwardenError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err)
    }
}

impl From<serde_json::Error> for DocwardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(err)
    }
}
