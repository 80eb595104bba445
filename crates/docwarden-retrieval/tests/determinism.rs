// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two independent builds over the same documents must agree exactly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docwarden_core::EmbeddingAdapter;
use docwarden_retrieval::artifacts::{CHUNKS_FILE, LEXICAL_FILE, META_FILE, VECTORS_FILE};
use docwarden_retrieval::{
    ArtifactStore, Chunker, DirectorySource, HashingEmbedder, HybridRetriever, IndexBuilder,
    IndexHandle, Indexer,
};

fn write_corpus(dir: &Path) {
    std::fs::write(
        dir.join("finance.txt"),
        "FY2024 Summary\n\nARR was $148.5 million, YoY growth 27.3%. Net retention \
         stayed above 120% for the third year.\n\nGross margin improved to 78% on lower \
         hosting costs. Operating expenses grew slower than revenue.",
    )
    .unwrap();
    std::fs::write(
        dir.join("handbook.md"),
        "# Handbook\n\nNew hires receive a laptop on day one. Badges are issued by \
         facilities.\n\n---------\n\nThe engineering team follows trunk-based develop-\nment \
         with mandatory code review.",
    )
    .unwrap();
}

struct Built {
    indexer: Indexer,
    embedder: Arc<dyn EmbeddingAdapter>,
    generation: PathBuf,
}

async fn build(docs: &Path, artifacts: &Path) -> Built {
    let embedder: Arc<dyn EmbeddingAdapter> = Arc::new(HashingEmbedder::new(128).unwrap());
    let store = ArtifactStore::new(artifacts);
    let indexer = Indexer::new(
        Arc::new(DirectorySource::new(docs, &["txt".into(), "md".into()])),
        Chunker::new(120, 30).unwrap(),
        IndexBuilder::new(Arc::clone(&embedder), 3),
        store.clone(),
        Arc::new(IndexHandle::new()),
    );
    indexer.reindex().await.unwrap();
    let generation = store.current_dir().await.unwrap().unwrap();
    Built {
        indexer,
        embedder,
        generation,
    }
}

#[tokio::test]
async fn identical_documents_give_identical_indexes() {
    let docs = tempfile::tempdir().unwrap();
    write_corpus(docs.path());
    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();

    let a = build(docs.path(), out_a.path()).await;
    let b = build(docs.path(), out_b.path()).await;

    let snap_a = a.indexer.handle().snapshot().unwrap();
    let snap_b = b.indexer.handle().snapshot().unwrap();
    let ids = |s: &docwarden_retrieval::IndexSnapshot| {
        s.chunks.iter().map(|c| c.chunk_id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&snap_a), ids(&snap_b));
    assert!(snap_a.len() > 2);

    for file in [VECTORS_FILE, CHUNKS_FILE, LEXICAL_FILE, META_FILE] {
        let bytes_a = std::fs::read(a.generation.join(file)).unwrap();
        let bytes_b = std::fs::read(b.generation.join(file)).unwrap();
        assert_eq!(bytes_a, bytes_b, "{file} differs between builds");
    }

    let retriever_a = HybridRetriever::new(Arc::clone(a.indexer.handle()), a.embedder);
    let retriever_b = HybridRetriever::new(Arc::clone(b.indexer.handle()), b.embedder);
    for query in ["What was the FY2024 ARR?", "code review practice", "laptop badges"] {
        let hits_a = retriever_a.retrieve(query, 3).await.unwrap();
        let hits_b = retriever_b.retrieve(query, 3).await.unwrap();
        assert_eq!(hits_a, hits_b, "ranking differs for {query:?}");
    }
}

#[tokio::test]
async fn cleaning_reaches_the_index() {
    let docs = tempfile::tempdir().unwrap();
    write_corpus(docs.path());
    let out = tempfile::tempdir().unwrap();
    let built = build(docs.path(), out.path()).await;

    let snapshot = built.indexer.handle().snapshot().unwrap();
    let all_text: String = snapshot.chunks.iter().map(|c| c.text.as_str()).collect();
    assert!(all_text.contains("development"));
    assert!(!all_text.contains("---------"));
    assert!(snapshot.chunks.iter().all(|c| c.text.chars().count() <= 120));
}
