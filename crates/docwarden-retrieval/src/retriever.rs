// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retriever combining dense similarity and BM25 via RRF fusion.
//!
//! Fusion uses ranks, not scores, so the two lists never need to share a
//! scale.

use std::collections::BTreeMap;
use std::sync::Arc;

use docwarden_config::model::RetrievalConfig;
use docwarden_core::{DocwardenError, EmbeddingAdapter, EmbeddingInput, RetrievedChunk};
use tracing::debug;

use crate::dense::l2_normalize;
use crate::handle::IndexHandle;

/// Default RRF constant.
pub const RRF_K: f64 = 60.0;

/// A fused candidate, identified by its row in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub row: usize,
    pub dense_rank: Option<usize>,
    pub sparse_rank: Option<usize>,
    pub score: f64,
}

/// Reciprocal Rank Fusion of two best-first lists of index rows.
///
/// score(d) = Σ 1 / (k + rank) over the lists containing d, with 1-based
/// ranks. Sorted by descending score, ties by ascending row.
pub fn reciprocal_rank_fusion(dense: &[usize], sparse: &[usize], k: f64) -> Vec<FusedCandidate> {
    let mut fused: BTreeMap<usize, FusedCandidate> = BTreeMap::new();

    for (list, is_dense) in [(dense, true), (sparse, false)] {
        for (i, &row) in list.iter().enumerate() {
            let rank = i + 1;
            let candidate = fused.entry(row).or_insert(FusedCandidate {
                row,
                dense_rank: None,
                sparse_rank: None,
                score: 0.0,
            });
            let slot = if is_dense {
                &mut candidate.dense_rank
            } else {
                &mut candidate.sparse_rank
            };
            if slot.is_none() {
                *slot = Some(rank);
                candidate.score += 1.0 / (k + rank as f64);
            }
        }
    }

    let mut ranked: Vec<FusedCandidate> = fused.into_values().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.row.cmp(&b.row)));
    ranked
}

pub struct HybridRetriever {
    handle: Arc<IndexHandle>,
    embedder: Arc<dyn EmbeddingAdapter>,
    candidate_multiplier: usize,
    rrf_k: f64,
}

impl HybridRetriever {
    pub fn new(handle: Arc<IndexHandle>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self {
            handle,
            embedder,
            candidate_multiplier: 3,
            rrf_k: RRF_K,
        }
    }

    pub fn from_config(
        handle: Arc<IndexHandle>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            handle,
            embedder,
            candidate_multiplier: config.candidate_multiplier.max(1),
            rrf_k: config.rrf_k,
        }
    }

    /// Top `top_k` chunks for `query`, best first.
    ///
    /// Fails with `IndexUnavailable` before the first build. A blank query
    /// yields no results and no embedder call.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, DocwardenError> {
        let snapshot = self.handle.snapshot()?;
        if query.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let candidates = top_k * self.candidate_multiplier;

        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![query.to_string()],
            })
            .await?;
        let mut query_vector = output.embeddings.into_iter().next().ok_or_else(|| {
            DocwardenError::Embedding {
                message: "embedder returned no vector for the query".to_string(),
                source: None,
            }
        })?;
        if query_vector.len() != snapshot.dense.dimensions() {
            return Err(DocwardenError::IndexUnavailable(format!(
                "query embedding has {} dimensions, index has {}",
                query_vector.len(),
                snapshot.dense.dimensions()
            )));
        }
        l2_normalize(&mut query_vector);

        let dense: Vec<usize> = snapshot
            .dense
            .search(&query_vector, candidates)
            .into_iter()
            .map(|(row, _)| row)
            .collect();
        let sparse: Vec<usize> = snapshot
            .lexical
            .search(query, candidates)
            .into_iter()
            .map(|(row, _)| row)
            .collect();

        let results: Vec<RetrievedChunk> = reciprocal_rank_fusion(&dense, &sparse, self.rrf_k)
            .into_iter()
            .take(top_k)
            .map(|c| RetrievedChunk {
                chunk: snapshot.chunks[c.row].clone(),
                dense_rank: c.dense_rank,
                sparse_rank: c.sparse_rank,
                fused_score: c.score,
            })
            .collect();

        debug!(
            dense = dense.len(),
            sparse = sparse.len(),
            returned = results.len(),
            "hybrid retrieval"
        );
        Ok(results)
    }
}
