// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document loading, chunking, indexing and hybrid retrieval for Docwarden.
//!
//! Documents from a [`DirectorySource`] are split by the [`Chunker`], embedded
//! and indexed by the [`IndexBuilder`], persisted by the [`ArtifactStore`] and
//! published through an [`IndexHandle`]. The [`HybridRetriever`] fuses dense
//! and BM25 rankings with Reciprocal Rank Fusion.

pub mod artifacts;
pub mod builder;
pub mod chunker;
pub mod dense;
pub mod embedder;
pub mod handle;
pub mod indexer;
pub mod lexical;
pub mod retriever;
pub mod snapshot;
pub mod source;
pub mod tokenize;

#[cfg(feature = "onnx")]
pub mod model_manager;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use artifacts::ArtifactStore;
pub use builder::IndexBuilder;
pub use chunker::Chunker;
pub use embedder::HashingEmbedder;
pub use handle::IndexHandle;
pub use indexer::{Indexer, ReindexReport};
pub use retriever::{HybridRetriever, reciprocal_rank_fusion};
pub use snapshot::{IndexMeta, IndexSnapshot};
pub use source::DirectorySource;

#[cfg(feature = "onnx")]
pub use model_manager::ModelManager;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;
