// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk index generations.
//!
//! ```text
//! <root>/CURRENT                  name of the live generation
//! <root>/index-<uuid>/vectors.bin
//! <root>/index-<uuid>/chunks.jsonl
//! <root>/index-<uuid>/lexical.json
//! <root>/index-<uuid>/index_meta.json
//! ```
//!
//! A generation is written completely before `CURRENT` is replaced by
//! renaming a temp file over it, so readers never see a partial index.

use std::path::{Path, PathBuf};

use docwarden_core::{Chunk, DocwardenError};
use tracing::{debug, info, warn};

use crate::dense::DenseIndex;
use crate::lexical::LexicalIndex;
use crate::snapshot::{IndexMeta, IndexSnapshot};

pub const CURRENT_FILE: &str = "CURRENT";
pub const VECTORS_FILE: &str = "vectors.bin";
pub const CHUNKS_FILE: &str = "chunks.jsonl";
pub const LEXICAL_FILE: &str = "lexical.json";
pub const META_FILE: &str = "index_meta.json";

const GENERATION_PREFIX: &str = "index-";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the live generation, if one has been published.
    pub async fn current_dir(&self) -> Result<Option<PathBuf>, DocwardenError> {
        match tokio::fs::read_to_string(self.root.join(CURRENT_FILE)).await {
            Ok(name) => {
                let name = name.trim();
                if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
                    return Err(DocwardenError::IndexUnavailable(
                        "CURRENT pointer is malformed".to_string(),
                    ));
                }
                Ok(Some(self.root.join(name)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write `snapshot` as a new generation, publish it, then prune older
    /// generations. Returns the new generation's directory.
    ///
    /// A generation that fails to write is removed again and `CURRENT` keeps
    /// pointing at the previous one.
    pub async fn persist(&self, snapshot: &IndexSnapshot) -> Result<PathBuf, DocwardenError> {
        let name = format!("{GENERATION_PREFIX}{}", uuid::Uuid::new_v4().simple());
        let dir = self.root.join(&name);

        if let Err(e) = self.write_generation(&dir, &name, snapshot).await {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&dir).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(generation = %name, error = %cleanup, "failed to remove partial generation");
                }
            }
            return Err(e);
        }
        info!(generation = %name, chunks = snapshot.len(), "index generation published");

        self.prune(&name).await;
        Ok(dir)
    }

    async fn write_generation(
        &self,
        dir: &Path,
        name: &str,
        snapshot: &IndexSnapshot,
    ) -> Result<(), DocwardenError> {
        tokio::fs::create_dir_all(dir).await?;

        tokio::fs::write(dir.join(VECTORS_FILE), snapshot.dense.to_bytes()).await?;

        let mut jsonl = String::new();
        for chunk in &snapshot.chunks {
            jsonl.push_str(&serde_json::to_string(chunk)?);
            jsonl.push('\n');
        }
        tokio::fs::write(dir.join(CHUNKS_FILE), jsonl).await?;

        tokio::fs::write(dir.join(LEXICAL_FILE), serde_json::to_vec(&snapshot.lexical)?).await?;
        tokio::fs::write(
            dir.join(META_FILE),
            serde_json::to_vec_pretty(&snapshot.meta)?,
        )
        .await?;

        let pointer_tmp = self.root.join(format!("{CURRENT_FILE}.tmp"));
        tokio::fs::write(&pointer_tmp, name).await?;
        tokio::fs::rename(&pointer_tmp, self.root.join(CURRENT_FILE)).await?;
        Ok(())
    }

    /// Best-effort removal of every generation except `keep`.
    async fn prune(&self, keep: &str) {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "could not list artifact directory for pruning");
                return;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == keep || !name.starts_with(GENERATION_PREFIX) {
                continue;
            }
            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => debug!(generation = %name, "pruned old generation"),
                Err(e) => warn!(generation = %name, error = %e, "failed to prune generation"),
            }
        }
    }

    /// Load the live generation.
    ///
    /// `Ok(None)` when nothing has been published. A generation built by a
    /// different embedder or at a different vector width, or one whose files
    /// disagree, is reported as `IndexUnavailable` so the caller can rebuild.
    pub async fn load_current(
        &self,
        expected_embedder: &str,
        expected_dimensions: usize,
    ) -> Result<Option<IndexSnapshot>, DocwardenError> {
        let Some(dir) = self.current_dir().await? else {
            return Ok(None);
        };

        let meta: IndexMeta =
            serde_json::from_slice(&read_artifact(&dir, META_FILE).await?).map_err(corrupt)?;
        if meta.embedder != expected_embedder {
            return Err(DocwardenError::IndexUnavailable(format!(
                "index was built with embedder {}, current embedder is {expected_embedder}",
                meta.embedder
            )));
        }
        if meta.dimensions != expected_dimensions {
            return Err(DocwardenError::IndexUnavailable(format!(
                "index has {} dimensions, embedder produces {expected_dimensions}",
                meta.dimensions
            )));
        }

        let dense = DenseIndex::from_bytes(&read_artifact(&dir, VECTORS_FILE).await?)?;
        let lexical: LexicalIndex =
            serde_json::from_slice(&read_artifact(&dir, LEXICAL_FILE).await?).map_err(corrupt)?;
        let chunks_raw = read_artifact(&dir, CHUNKS_FILE).await?;
        let chunks = String::from_utf8_lossy(&chunks_raw)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<Chunk>(line).map_err(corrupt))
            .collect::<Result<Vec<_>, _>>()?;

        if dense.len() != chunks.len()
            || lexical.len() != chunks.len()
            || meta.num_chunks != chunks.len()
            || meta.dimensions != dense.dimensions()
        {
            return Err(DocwardenError::IndexUnavailable(format!(
                "artifacts disagree: {} vectors of width {}, {} lexical rows, {} chunks, meta says {}",
                dense.len(),
                dense.dimensions(),
                lexical.len(),
                chunks.len(),
                meta.num_chunks
            )));
        }

        debug!(dir = %dir.display(), chunks = chunks.len(), "index generation loaded");
        Ok(Some(IndexSnapshot {
            meta,
            chunks,
            dense,
            lexical,
        }))
    }
}

async fn read_artifact(dir: &Path, file: &str) -> Result<Vec<u8>, DocwardenError> {
    tokio::fs::read(dir.join(file))
        .await
        .map_err(|e| DocwardenError::IndexUnavailable(format!("cannot read {file}: {e}")))
}

fn corrupt(err: serde_json::Error) -> DocwardenError {
    DocwardenError::IndexUnavailable(format!("corrupt artifact: {err}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::builder::IndexBuilder;
    use crate::embedder::HashingEmbedder;

    async fn snapshot() -> IndexSnapshot {
        let chunks = (0..3)
            .map(|i| Chunk {
                chunk_id: format!("doc_p1_{i:04}"),
                doc_id: "doc".into(),
                filename: "doc.txt".into(),
                page: 1,
                text: format!("sentence {i} on quarterly revenue"),
            })
            .collect();
        IndexBuilder::new(Arc::new(HashingEmbedder::new(32).unwrap()), 2)
            .build(chunks)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn nothing_published_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(store.load_current("hashing-embedder", 32).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persist_then_load_returns_same_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let original = snapshot().await;
        let gen_dir = store.persist(&original).await.unwrap();

        for file in [VECTORS_FILE, CHUNKS_FILE, LEXICAL_FILE, META_FILE] {
            assert!(gen_dir.join(file).is_file(), "{file} missing");
        }
        let loaded = store.load_current("hashing-embedder", 32).await.unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn republish_prunes_old_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let snap = snapshot().await;
        let first = store.persist(&snap).await.unwrap();
        let second = store.persist(&snap).await.unwrap();

        assert!(!first.exists());
        assert!(second.exists());
        assert_eq!(store.current_dir().await.unwrap().unwrap(), second);
        assert!(!dir.path().join("CURRENT.tmp").exists());
    }

    #[tokio::test]
    async fn embedder_change_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(&snapshot().await).await.unwrap();
        let err = store.load_current("onnx-minilm", 32).await.unwrap_err();
        assert!(matches!(err, DocwardenError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn dimension_change_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(&snapshot().await).await.unwrap();
        let err = store.load_current("hashing-embedder", 64).await.unwrap_err();
        assert!(matches!(err, DocwardenError::IndexUnavailable(_)));
    }

    #[tokio::test]
    async fn failed_publish_removes_partial_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        // The pointer temp file cannot be written over a directory.
        std::fs::create_dir(dir.path().join("CURRENT.tmp")).unwrap();

        assert!(store.persist(&snapshot().await).await.is_err());
        assert!(store.load_current("hashing-embedder", 32).await.unwrap().is_none());
        let generations = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(GENERATION_PREFIX))
            .count();
        assert_eq!(generations, 0);
    }

    #[tokio::test]
    async fn count_mismatch_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let gen_dir = store.persist(&snapshot().await).await.unwrap();

        let chunks = std::fs::read_to_string(gen_dir.join(CHUNKS_FILE)).unwrap();
        let first_line = chunks.lines().next().unwrap();
        std::fs::write(gen_dir.join(CHUNKS_FILE), format!("{first_line}\n")).unwrap();

        let err = store.load_current("hashing-embedder", 32).await.unwrap_err();
        assert!(matches!(err, DocwardenError::IndexUnavailable(_)));
    }
}
