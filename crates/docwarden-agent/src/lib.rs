// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn handling for Docwarden.
//!
//! The [`TurnPipeline`] is the central coordinator that:
//! - Refuses blank, adversarial and classified queries
//! - Answers "who am I" style questions from stored user facts
//! - Records preference and identity statements
//! - Retrieves, answers with citations, and remembers durable facts

pub mod intent;
pub mod pipeline;

use std::sync::Arc;

use docwarden_answer::Answerer;
use docwarden_config::DocwardenConfig;
use docwarden_core::{EmbeddingAdapter, GenerationAdapter};
use docwarden_memory::MemoryLedger;
use docwarden_retrieval::{HybridRetriever, IndexHandle};

pub use intent::SlashCommand;
pub use pipeline::{TurnKind, TurnPipeline, TurnReply};

/// Wire a pipeline from configuration and already-built adapters.
pub fn build_pipeline(
    config: &DocwardenConfig,
    handle: Arc<IndexHandle>,
    embedder: Arc<dyn EmbeddingAdapter>,
    generator: Arc<dyn GenerationAdapter>,
    ledger: MemoryLedger,
) -> TurnPipeline {
    let retriever = HybridRetriever::from_config(handle, embedder, &config.retrieval);
    let answerer = Answerer::from_config(generator, &config.answer, &config.generation);
    TurnPipeline::new(retriever, answerer, ledger).with_top_k(config.retrieval.top_k)
}
