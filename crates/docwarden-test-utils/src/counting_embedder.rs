// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedder wrapper that counts calls, for asserting that a stage never ran.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use docwarden_core::{
    AdapterType, DocwardenError, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus,
    PluginAdapter,
};
use docwarden_retrieval::HashingEmbedder;

/// Deterministic hashing embedder that records how often it was used.
pub struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
    texts: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, DocwardenError> {
        Ok(Self {
            inner: HashingEmbedder::new(dimensions)?,
            calls: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        })
    }

    /// Number of `embed` calls since creation or the last [`reset`](Self::reset).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of texts embedded.
    pub fn text_count(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.texts.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for CountingEmbedder {
    fn name(&self) -> &str {
        // Same vectors as the wrapped embedder, so persisted indexes stay compatible.
        self.inner.name()
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, DocwardenError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocwardenError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for CountingEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, DocwardenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(input.texts.len(), Ordering::SeqCst);
        self.inner.embed(input).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}
