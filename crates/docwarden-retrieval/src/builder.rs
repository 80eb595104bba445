// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds an [`IndexSnapshot`] from a chunk set.

use std::sync::Arc;

use docwarden_core::{Chunk, DocwardenError, EmbeddingAdapter, EmbeddingInput};
use tracing::{debug, info};

use crate::dense::{DenseIndex, l2_normalize};
use crate::lexical::LexicalIndex;
use crate::snapshot::{IndexMeta, IndexSnapshot};

pub const DEFAULT_BATCH_SIZE: usize = 64;

pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingAdapter>,
    batch_size: usize,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, batch_size: usize) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
        }
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingAdapter> {
        &self.embedder
    }

    /// Sort, embed and index `chunks`. The same input always yields the same
    /// snapshot.
    pub async fn build(&self, mut chunks: Vec<Chunk>) -> Result<IndexSnapshot, DocwardenError> {
        if chunks.is_empty() {
            return Err(DocwardenError::IndexUnavailable(
                "no chunks to index".to_string(),
            ));
        }
        chunks.sort_by(|a, b| a.chunk_id.cmp(&b.chunk_id));
        if let Some(pair) = chunks.windows(2).find(|w| w[0].chunk_id == w[1].chunk_id) {
            return Err(DocwardenError::Internal(format!(
                "duplicate chunk id {}",
                pair[0].chunk_id
            )));
        }

        let mut rows: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
        let mut dimensions: Option<usize> = None;

        for (batch_no, batch) in chunks.chunks(self.batch_size).enumerate() {
            let output = self
                .embedder
                .embed(EmbeddingInput {
                    texts: batch.iter().map(|c| c.text.clone()).collect(),
                })
                .await?;
            if output.embeddings.len() != batch.len() {
                return Err(DocwardenError::Embedding {
                    message: format!(
                        "embedder returned {} vectors for {} texts",
                        output.embeddings.len(),
                        batch.len()
                    ),
                    source: None,
                });
            }

            for mut vector in output.embeddings {
                let expected = *dimensions.get_or_insert(vector.len());
                if vector.len() != expected {
                    return Err(DocwardenError::Embedding {
                        message: format!(
                            "dimension mismatch within build: got {}, expected {expected}",
                            vector.len()
                        ),
                        source: None,
                    });
                }
                l2_normalize(&mut vector);
                rows.push(vector);
            }
            debug!(batch = batch_no, size = batch.len(), "embedded batch");
        }

        let dimensions = dimensions.unwrap_or(0);
        let dense = DenseIndex::from_rows(dimensions, rows)?;
        let lexical = LexicalIndex::build(chunks.iter().map(|c| c.text.as_str()));

        let meta = IndexMeta {
            embedder: self.embedder.name().to_string(),
            dimensions,
            num_chunks: chunks.len(),
        };
        info!(
            chunks = meta.num_chunks,
            dimensions,
            embedder = %meta.embedder,
            "index built"
        );

        Ok(IndexSnapshot {
            meta,
            chunks,
            dense,
            lexical,
        })
    }
}
