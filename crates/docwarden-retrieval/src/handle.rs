// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared pointer to the live index snapshot.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use docwarden_core::DocwardenError;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::snapshot::IndexSnapshot;

/// Readers take a cheap `Arc` of the current snapshot; rebuilds are
/// serialised and swap the pointer only once the new snapshot is complete.
#[derive(Default)]
pub struct IndexHandle {
    current: ArcSwapOption<IndexSnapshot>,
    rebuild_lock: Mutex<()>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// The live snapshot, or `IndexUnavailable` before the first install.
    pub fn snapshot(&self) -> Result<Arc<IndexSnapshot>, DocwardenError> {
        self.current.load_full().ok_or_else(|| {
            DocwardenError::IndexUnavailable("no index has been built".to_string())
        })
    }

    pub fn install(&self, snapshot: Arc<IndexSnapshot>) {
        debug!(chunks = snapshot.len(), "installing index snapshot");
        self.current.store(Some(snapshot));
    }

    /// Exclusive rebuild permit. Readers keep the previous snapshot while
    /// the holder builds; only [`install`](Self::install) swaps it.
    pub async fn lock_rebuild(&self) -> MutexGuard<'_, ()> {
        self.rebuild_lock.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseIndex;
    use crate::lexical::LexicalIndex;
    use crate::snapshot::IndexMeta;
    use docwarden_core::Chunk;

    fn snapshot(tag: &str) -> IndexSnapshot {
        let chunks = vec![Chunk {
            chunk_id: format!("{tag}_p1_0000"),
            doc_id: tag.into(),
            filename: format!("{tag}.txt"),
            page: 1,
            text: tag.into(),
        }];
        IndexSnapshot {
            meta: IndexMeta {
                embedder: "test".into(),
                dimensions: 1,
                num_chunks: 1,
            },
            lexical: LexicalIndex::build(chunks.iter().map(|c| c.text.as_str())),
            dense: DenseIndex::from_rows(1, vec![vec![1.0]]).unwrap(),
            chunks,
        }
    }

    #[test]
    fn empty_handle_is_unavailable() {
        let handle = IndexHandle::new();
        assert!(!handle.is_ready());
        assert!(matches!(
            handle.snapshot().unwrap_err(),
            DocwardenError::IndexUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn rebuild_lock_is_exclusive() {
        let handle = IndexHandle::new();
        let guard = handle.lock_rebuild().await;
        assert!(handle.rebuild_lock.try_lock().is_err());
        drop(guard);
        assert!(handle.rebuild_lock.try_lock().is_ok());
    }

    #[tokio::test]
    async fn readers_keep_their_snapshot_across_swap() {
        let handle = IndexHandle::new();
        handle.install(Arc::new(snapshot("old")));
        let held = handle.snapshot().unwrap();
        handle.install(Arc::new(snapshot("new")));
        assert_eq!(held.chunks[0].doc_id, "old");
        assert_eq!(handle.snapshot().unwrap().chunks[0].doc_id, "new");
    }
}
