// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic offline embedder based on feature hashing.
//!
//! Each term and adjacent-term bigram is hashed into one of `dimensions`
//! buckets with a hash-derived sign. The result is L2-normalised, so inner
//! product equals cosine similarity. Needs no model files and produces
//! identical vectors on every platform.

use async_trait::async_trait;
use docwarden_core::{
    AdapterType, DocwardenError, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus,
    PluginAdapter,
};

use crate::dense::l2_normalize;
use crate::tokenize::tokenize;

const BIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, DocwardenError> {
        if dimensions == 0 {
            return Err(DocwardenError::Config(
                "embedding dimensions must be positive".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let terms = tokenize(text);

        for term in &terms {
            self.add_feature(&mut vector, term.as_bytes(), 1.0);
        }
        for pair in terms.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.add_feature(&mut vector, bigram.as_bytes(), BIGRAM_WEIGHT);
        }

        l2_normalize(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

#[async_trait]
impl PluginAdapter for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
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
impl EmbeddingAdapter for HashingEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, DocwardenError> {
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.embed_text(t)).collect(),
            dimensions: self.dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::inner_product;

    #[test]
    fn identical_text_identical_vector() {
        let embedder = HashingEmbedder::new(64).unwrap();
        assert_eq!(
            embedder.embed_text("ARR grew 27%"),
            embedder.embed_text("ARR grew 27%")
        );
    }

    #[test]
    fn vectors_are_unit_length() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let v = embedder.embed_text("quarterly revenue and churn summary");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn related_text_scores_higher_than_unrelated() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let query = embedder.embed_text("FY2024 ARR");
        let related = embedder.embed_text("ARR was $148.5 million in FY2024");
        let unrelated = embedder.embed_text("The cafeteria opens at nine");
        assert!(inner_product(&query, &related) > inner_product(&query, &unrelated));
    }

    #[test]
    fn stopword_only_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        assert!(embedder.embed_text("what was the").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn fnv_matches_reference_vector() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[tokio::test]
    async fn embed_preserves_input_order() {
        let embedder = HashingEmbedder::new(32).unwrap();
        let out = embedder
            .embed(EmbeddingInput {
                texts: vec!["alpha".into(), "beta".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.dimensions, 32);
        assert_eq!(out.embeddings[0], embedder.embed_text("alpha"));
        assert_eq!(out.embeddings[1], embedder.embed_text("beta"));
    }
}
