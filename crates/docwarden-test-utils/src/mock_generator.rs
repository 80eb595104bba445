// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockGenerator` implements `GenerationAdapter` with pre-configured replies,
//! records every prompt it receives, and can be told to fail.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docwarden_answer::ExtractiveGenerator;
use docwarden_core::{
    AdapterType, DocwardenError, GenerationAdapter, GenerationRequest, GenerationResponse,
    HealthStatus, PluginAdapter,
};

/// A mock generator that returns queued replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty the
/// generator either returns "mock response" or, when built with
/// [`MockGenerator::extractive`], answers from the prompt's sources.
pub struct MockGenerator {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
    fallback: Option<ExtractiveGenerator>,
    delay: Option<Duration>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
            fallback: None,
            delay: None,
        }
    }

    /// Create a mock generator pre-loaded with the given replies.
    pub fn with_responses(replies: Vec<String>) -> Self {
        let generator = Self::new();
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            ..generator
        }
    }

    /// Answer like the offline extractive backend once the queue is drained.
    pub fn extractive() -> Self {
        Self {
            fallback: Some(ExtractiveGenerator::new()),
            ..Self::new()
        }
    }

    /// Sleep for `delay` before every reply.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(text.into());
    }

    /// Make every following call fail with a generation error.
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().await = Some(message.into());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, DocwardenError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DocwardenError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DocwardenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(request.prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.lock().await.clone() {
            return Err(DocwardenError::Generation {
                message,
                source: None,
            });
        }

        let queued = self.replies.lock().await.pop_front();
        let text = match (queued, &self.fallback) {
            (Some(text), _) => text,
            (None, Some(extractive)) => extractive.respond(&request.prompt),
            (None, None) => "mock response".to_string(),
        };
        Ok(GenerationResponse {
            text,
            model: request.model,
        })
    }
}
