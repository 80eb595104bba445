// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles adapters, the index lifecycle and the turn pipeline from config.

use std::sync::Arc;

use docwarden_agent::{TurnPipeline, TurnReply, build_pipeline};
use docwarden_answer::ExtractiveGenerator;
use docwarden_config::DocwardenConfig;
use docwarden_config::model::{EmbeddingBackend, GenerationBackend};
use docwarden_core::{
    DocumentSource, DocwardenError, EmbeddingAdapter, GenerationAdapter, HealthStatus,
};
use docwarden_memory::MemoryLedger;
use docwarden_ollama::OllamaProvider;
use docwarden_retrieval::{
    ArtifactStore, Chunker, DirectorySource, HashingEmbedder, IndexBuilder, IndexHandle, Indexer,
    ReindexReport,
};
use tracing::{debug, info, warn};

/// Everything a command needs to answer questions over the local corpus.
pub struct Runtime {
    config: DocwardenConfig,
    indexer: Indexer,
    pipeline: TurnPipeline,
    embedder: Arc<dyn EmbeddingAdapter>,
    generator: Arc<dyn GenerationAdapter>,
}

impl Runtime {
    /// Build adapters and wire the pipeline. The index is not opened yet.
    pub async fn new(config: DocwardenConfig) -> Result<Self, DocwardenError> {
        let embedder = build_embedder(&config).await?;
        let generator = build_generator(&config)?;

        let source: Arc<dyn DocumentSource> = Arc::new(DirectorySource::from_config(&config.ingest));
        let handle = Arc::new(IndexHandle::new());
        let indexer = Indexer::new(
            source,
            Chunker::from_config(&config.chunking)?,
            IndexBuilder::new(embedder.clone(), config.embedding.batch_size),
            ArtifactStore::new(&config.index.artifacts_dir),
            handle.clone(),
        );

        let ledger = MemoryLedger::from_config(&config.memory);
        let pipeline = build_pipeline(
            &config,
            handle,
            embedder.clone(),
            generator.clone(),
            ledger,
        );

        info!(
            embedder = embedder.name(),
            generator = generator.name(),
            source_dir = %config.ingest.source_dir,
            "runtime initialized"
        );

        Ok(Self {
            config,
            indexer,
            pipeline,
            embedder,
            generator,
        })
    }

    pub fn config(&self) -> &DocwardenConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &TurnPipeline {
        &self.pipeline
    }

    pub fn ledger(&self) -> &MemoryLedger {
        self.pipeline.ledger()
    }

    /// Load the live index generation, building one when needed.
    ///
    /// Returns the number of indexed chunks.
    pub async fn open_index(&self, force_rebuild: bool) -> Result<usize, DocwardenError> {
        let snapshot = self.indexer.open(force_rebuild).await?;
        Ok(snapshot.len())
    }

    pub async fn reindex(&self) -> Result<ReindexReport, DocwardenError> {
        self.indexer.reindex().await
    }

    pub async fn ask(&self, question: &str) -> Result<TurnReply, DocwardenError> {
        self.pipeline.handle_turn(question).await
    }

    /// Health of the generation backend. Problems are returned as warnings
    /// rather than errors so an offline corpus stays browsable.
    pub async fn check_generator(&self) -> Option<String> {
        match self.generator.health_check().await {
            Ok(HealthStatus::Healthy) => None,
            Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => {
                Some(reason)
            }
            Err(e) => Some(e.to_string()),
        }
    }

    pub async fn shutdown(&self) {
        if let Err(e) = self.generator.shutdown().await {
            warn!(error = %e, "generator shutdown failed");
        }
        if let Err(e) = self.embedder.shutdown().await {
            warn!(error = %e, "embedder shutdown failed");
        }
        debug!("runtime shut down");
    }
}

async fn build_embedder(
    config: &DocwardenConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, DocwardenError> {
    match config.embedding.backend {
        EmbeddingBackend::Hash => Ok(Arc::new(HashingEmbedder::new(
            config.embedding.dimensions,
        )?)),
        EmbeddingBackend::Onnx => build_onnx_embedder(config).await,
    }
}

#[cfg(feature = "onnx")]
async fn build_onnx_embedder(
    config: &DocwardenConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, DocwardenError> {
    use docwarden_retrieval::{ModelManager, OnnxEmbedder};

    let data_dir = match &config.embedding.data_dir {
        Some(dir) => std::path::PathBuf::from(dir),
        None => dirs::data_dir()
            .map(|d| d.join("docwarden"))
            .ok_or_else(|| {
                DocwardenError::Config("no data directory available for model files".into())
            })?,
    };
    let model_path = ModelManager::new(data_dir).ensure_model().await?;
    Ok(Arc::new(OnnxEmbedder::new(&model_path)?))
}

#[cfg(not(feature = "onnx"))]
async fn build_onnx_embedder(
    _config: &DocwardenConfig,
) -> Result<Arc<dyn EmbeddingAdapter>, DocwardenError> {
    Err(DocwardenError::Config(
        "embedding.backend = \"onnx\" requires a build with the `onnx` feature".into(),
    ))
}

fn build_generator(
    config: &DocwardenConfig,
) -> Result<Arc<dyn GenerationAdapter>, DocwardenError> {
    let generator: Arc<dyn GenerationAdapter> = match config.generation.backend {
        GenerationBackend::Ollama => Arc::new(OllamaProvider::new(config)?),
        GenerationBackend::Extractive => Arc::new(ExtractiveGenerator::new()),
    };
    Ok(generator)
}
