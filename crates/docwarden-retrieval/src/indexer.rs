// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index lifecycle: load the published generation or rebuild from sources.

use std::sync::Arc;

use docwarden_core::{DocumentSource, DocwardenError, IngestFailure};
use tracing::{info, warn};

use crate::artifacts::ArtifactStore;
use crate::builder::IndexBuilder;
use crate::chunker::Chunker;
use crate::handle::IndexHandle;
use crate::snapshot::IndexSnapshot;

/// Outcome of a full rebuild.
#[derive(Debug, Clone)]
pub struct ReindexReport {
    pub documents: usize,
    pub chunks: usize,
    pub failures: Vec<IngestFailure>,
}

pub struct Indexer {
    source: Arc<dyn DocumentSource>,
    chunker: Chunker,
    builder: IndexBuilder,
    store: ArtifactStore,
    handle: Arc<IndexHandle>,
}

impl Indexer {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        chunker: Chunker,
        builder: IndexBuilder,
        store: ArtifactStore,
        handle: Arc<IndexHandle>,
    ) -> Self {
        Self {
            source,
            chunker,
            builder,
            store,
            handle,
        }
    }

    pub fn handle(&self) -> &Arc<IndexHandle> {
        &self.handle
    }

    /// Install the published generation, rebuilding when there is none, when
    /// it is stale or corrupt, or when `force_rebuild` is set.
    pub async fn open(&self, force_rebuild: bool) -> Result<Arc<IndexSnapshot>, DocwardenError> {
        if !force_rebuild {
            let embedder = self.builder.embedder();
            match self
                .store
                .load_current(embedder.name(), embedder.dimensions())
                .await
            {
                Ok(Some(snapshot)) => {
                    info!(chunks = snapshot.len(), "loaded persisted index");
                    let snapshot = Arc::new(snapshot);
                    self.handle.install(Arc::clone(&snapshot));
                    return Ok(snapshot);
                }
                Ok(None) => info!("no persisted index, building"),
                Err(DocwardenError::IndexUnavailable(reason)) => {
                    warn!(%reason, "persisted index unusable, rebuilding");
                }
                Err(e) => return Err(e),
            }
        }
        self.reindex().await?;
        self.handle.snapshot()
    }

    /// Load, chunk, embed, persist and swap in a new generation.
    ///
    /// Holds the handle's rebuild lock throughout; on failure the previous
    /// snapshot stays live.
    pub async fn reindex(&self) -> Result<ReindexReport, DocwardenError> {
        let _guard = self.handle.lock_rebuild().await;

        let report = self.source.load().await?;
        let chunks: Vec<_> = report
            .documents
            .iter()
            .flat_map(|doc| self.chunker.chunk_document(doc))
            .collect();
        if chunks.is_empty() {
            return Err(DocwardenError::IndexUnavailable(
                "no readable documents to index".to_string(),
            ));
        }

        let snapshot = self.builder.build(chunks).await?;
        self.store.persist(&snapshot).await?;

        let summary = ReindexReport {
            documents: report.documents.len(),
            chunks: snapshot.len(),
            failures: report.failures,
        };
        self.handle.install(Arc::new(snapshot));
        info!(
            documents = summary.documents,
            chunks = summary.chunks,
            failures = summary.failures.len(),
            "reindex complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashingEmbedder;
    use crate::source::DirectorySource;

    fn indexer(docs: &std::path::Path, artifacts: &std::path::Path) -> Indexer {
        indexer_with_dimensions(docs, artifacts, 64)
    }

    fn indexer_with_dimensions(
        docs: &std::path::Path,
        artifacts: &std::path::Path,
        dimensions: usize,
    ) -> Indexer {
        Indexer::new(
            Arc::new(DirectorySource::new(docs, &["txt".to_string()])),
            Chunker::new(200, 40).unwrap(),
            IndexBuilder::new(Arc::new(HashingEmbedder::new(dimensions).unwrap()), 8),
            ArtifactStore::new(artifacts),
            Arc::new(IndexHandle::new()),
        )
    }

    #[tokio::test]
    async fn open_builds_then_reuses_persisted_index() {
        let docs = tempfile::tempdir().unwrap();
        let artifacts = tempfile::tempdir().unwrap();
        std::fs::write(docs.path().join("a.txt"), "Revenue grew in FY2024.").unwrap();

        let first = indexer(docs.path(), artifacts.path());
        let built = first.open(false).await.unwrap();
        assert_eq!(built.len(), 1);

        // A second process picks up the published generation.
        std::fs::write(docs.path().join("b.txt"), "Added later.").unwrap();
        let second = indexer(docs.path(), artifacts.path());
        assert_eq!(second.open(false).await.unwrap().len(), 1);
        assert_eq!(second.open(true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn dimension_change_rebuilds_index() {
        let docs = tempfile::tempdir().unwrap();
        let artifacts = tempfile::tempdir().unwrap();
        std::fs::write(docs.path().join("a.txt"), "Revenue grew in FY2024.").unwrap();

        let narrow = indexer_with_dimensions(docs.path(), artifacts.path(), 32);
        assert_eq!(narrow.open(false).await.unwrap().dense.dimensions(), 32);

        std::fs::write(docs.path().join("b.txt"), "Added later.").unwrap();
        let wide = indexer_with_dimensions(docs.path(), artifacts.path(), 64);
        let rebuilt = wide.open(false).await.unwrap();
        assert_eq!(rebuilt.dense.dimensions(), 64);
        assert_eq!(rebuilt.len(), 2);
    }

    #[tokio::test]
    async fn empty_collection_leaves_handle_unready() {
        let docs = tempfile::tempdir().unwrap();
        let artifacts = tempfile::tempdir().unwrap();
        let indexer = indexer(docs.path(), artifacts.path());
        assert!(indexer.reindex().await.is_err());
        assert!(!indexer.handle().is_ready());
    }
}
