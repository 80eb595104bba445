// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles the full turn pipeline over in-memory chunks with
//! a counting embedder, a mock generator, and memory stores that live in a
//! temp directory. `send()` drives one turn.

use std::path::PathBuf;
use std::sync::Arc;

use docwarden_agent::{TurnPipeline, TurnReply};
use docwarden_answer::Answerer;
use docwarden_config::model::MemoryConfig;
use docwarden_core::{Chunk, DocwardenError};
use docwarden_memory::MemoryLedger;
use docwarden_retrieval::{HybridRetriever, IndexBuilder, IndexHandle};

use crate::counting_embedder::CountingEmbedder;
use crate::mock_generator::MockGenerator;

const HARNESS_DIMENSIONS: usize = 256;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    chunks: Vec<Chunk>,
    responses: Vec<String>,
    extractive: bool,
    top_k: usize,
    max_citation_retries: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            responses: Vec::new(),
            extractive: false,
            top_k: 5,
            max_citation_retries: 1,
        }
    }

    /// Add one indexed passage.
    pub fn with_chunk(mut self, filename: &str, chunk_id: &str, page: u32, text: &str) -> Self {
        self.chunks.push(Chunk {
            chunk_id: chunk_id.to_string(),
            doc_id: filename.split('.').next().unwrap_or(filename).to_string(),
            filename: filename.to_string(),
            page,
            text: text.to_string(),
        });
        self
    }

    pub fn with_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.chunks.extend(chunks);
        self
    }

    /// Set mock generator replies.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Answer from the prompt's sources once queued replies run out.
    pub fn with_extractive_backend(mut self) -> Self {
        self.extractive = true;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_citation_retries(mut self, retries: u32) -> Self {
        self.max_citation_retries = retries;
        self
    }

    /// Build the index and wire the pipeline.
    ///
    /// Embedder counters are reset after the index build, so they only
    /// reflect query-time calls.
    pub async fn build(self) -> Result<TestHarness, DocwardenError> {
        let temp_dir = tempfile::TempDir::new()?;

        let embedder = Arc::new(CountingEmbedder::new(HARNESS_DIMENSIONS)?);
        let handle = Arc::new(IndexHandle::new());
        if !self.chunks.is_empty() {
            let snapshot = IndexBuilder::new(embedder.clone(), 16)
                .build(self.chunks)
                .await?;
            handle.install(Arc::new(snapshot));
        }
        embedder.reset();

        let generator = Arc::new(if self.extractive {
            MockGenerator::extractive()
        } else {
            MockGenerator::new()
        });
        for reply in self.responses {
            generator.add_response(reply).await;
        }

        let memory_config = MemoryConfig {
            enabled: true,
            user_store_path: temp_dir.path().join("USER_MEMORY.md").display().to_string(),
            company_store_path: temp_dir.path().join("COMPANY_MEMORY.md").display().to_string(),
            min_confidence: 0.8,
        };
        let ledger = MemoryLedger::from_config(&memory_config);

        let pipeline = TurnPipeline::new(
            HybridRetriever::new(handle.clone(), embedder.clone()),
            Answerer::new(generator.clone(), "mock")
                .with_max_citation_retries(self.max_citation_retries),
            ledger,
        )
        .with_top_k(self.top_k);

        Ok(TestHarness {
            pipeline,
            embedder,
            generator,
            handle,
            memory_config,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully assembled pipeline plus handles to its fakes.
pub struct TestHarness {
    pub pipeline: TurnPipeline,
    pub embedder: Arc<CountingEmbedder>,
    pub generator: Arc<MockGenerator>,
    pub handle: Arc<IndexHandle>,
    memory_config: MemoryConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drive one turn through the pipeline.
    pub async fn send(&self, text: &str) -> Result<TurnReply, DocwardenError> {
        self.pipeline.handle_turn(text).await
    }

    pub fn user_memory_path(&self) -> PathBuf {
        PathBuf::from(&self.memory_config.user_store_path)
    }

    pub fn company_memory_path(&self) -> PathBuf {
        PathBuf::from(&self.memory_config.company_store_path)
    }

    /// Lines currently in the user memory file.
    pub fn user_memory_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.user_memory_path())
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
