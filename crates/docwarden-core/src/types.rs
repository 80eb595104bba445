// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by every Docwarden crate.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status of an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    DocumentSource,
    Embedding,
    Generation,
}

/// One page of extracted document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub page_number: u32,
    pub text: String,
}

/// A loaded source document. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// File stem plus a short content hash, stable across runs.
    pub doc_id: String,
    pub filename: String,
    pub pages: Vec<Page>,
}

/// A retrievable passage of a single document page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub doc_id: String,
    pub filename: String,
    pub page: u32,
    pub text: String,
}

impl Chunk {
    /// The citation pointing at this chunk.
    pub fn citation(&self) -> Citation {
        Citation {
            filename: self.filename.clone(),
            chunk_id: self.chunk_id.clone(),
            page: self.page,
        }
    }
}

/// A reference from an answer back to one chunk.
///
/// Renders bit-exactly as `[source:<filename>#<chunk_id> p=<page>]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub filename: String,
    pub chunk_id: String,
    pub page: u32,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[source:{}#{} p={}]",
            self.filename, self.chunk_id, self.page
        )
    }
}

/// A chunk returned by hybrid retrieval, with its per-list ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// 1-based rank in the dense list, if present there.
    pub dense_rank: Option<usize>,
    /// 1-based rank in the lexical list, if present there.
    pub sparse_rank: Option<usize>,
    pub fused_score: f64,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter. One vector per input text, in order.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

/// A single, non-streaming generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
}

/// The full text produced by a generation backend.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub text: String,
    pub model: String,
}

/// A file that failed to load during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Result of loading a document collection.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub documents: Vec<Document>,
    pub failures: Vec<IngestFailure>,
}
