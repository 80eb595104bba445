// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An immutable, fully built index generation.

use docwarden_core::Chunk;
use serde::{Deserialize, Serialize};

use crate::dense::DenseIndex;
use crate::lexical::LexicalIndex;

/// Contents of `index_meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Name of the embedder that produced the vectors.
    pub embedder: String,
    pub dimensions: usize,
    pub num_chunks: usize,
}

/// Chunks sorted by id with the dense and lexical indexes built over them.
///
/// Row `i` of both indexes is `chunks[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    pub meta: IndexMeta,
    pub chunks: Vec<Chunk>,
    pub dense: DenseIndex,
    pub lexical: LexicalIndex,
}

impl IndexSnapshot {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk(&self, chunk_id: &str) -> Option<&Chunk> {
        self.chunks
            .binary_search_by(|c| c.chunk_id.as_str().cmp(chunk_id))
            .ok()
            .map(|i| &self.chunks[i])
    }
}
