// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! all-MiniLM-L6-v2 sentence embeddings through ONNX Runtime.
//!
//! Each batch of texts is padded to a common length and run through the
//! model in one session call; token vectors are mean-pooled under the
//! attention mask and L2-normalised.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use docwarden_core::{
    AdapterType, DocwardenError, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus,
    PluginAdapter,
};
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use tokenizers::{PaddingParams, Tokenizer, TruncationParams};
use tracing::debug;

use crate::dense::l2_normalize;

/// Output width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Token limit per text; longer chunks are truncated.
const MAX_TOKENS: usize = 256;

fn embedding_error(message: String) -> DocwardenError {
    DocwardenError::Embedding {
        message,
        source: None,
    }
}

pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxEmbedder {
    /// Load `model.onnx` and the sibling `tokenizer.json`.
    pub fn new(model_path: &Path) -> Result<Self, DocwardenError> {
        let model_dir = model_path
            .parent()
            .ok_or_else(|| embedding_error("model path has no parent directory".to_string()))?;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            embedding_error(format!(
                "failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;
        tokenizer.with_padding(Some(PaddingParams::default()));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| embedding_error(format!("failed to configure truncation: {e}")))?;

        let session = Session::builder()
            .map_err(|e| embedding_error(format!("failed to create ONNX session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| embedding_error(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(1)
            .map_err(|e| embedding_error(format!("failed to set thread count: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                embedding_error(format!(
                    "failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embed a batch of texts with one inference call.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DocwardenError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| embedding_error(format!("tokenization failed: {e}")))?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.len());
        let flatten = |f: &dyn Fn(&tokenizers::Encoding) -> &[u32]| -> Vec<i64> {
            encodings
                .iter()
                .flat_map(|e| f(e).iter().map(|&v| i64::from(v)))
                .collect()
        };
        let input_ids = flatten(&|e| e.get_ids());
        let attention_mask = flatten(&|e| e.get_attention_mask());
        let type_ids = flatten(&|e| e.get_type_ids());

        let to_array = |name: &str, values: Vec<i64>| {
            Array2::from_shape_vec((batch, seq_len), values)
                .map_err(|e| embedding_error(format!("failed to shape {name}: {e}")))
        };
        let input_ids_array = to_array("input_ids", input_ids)?;
        let attention_mask_array = to_array("attention_mask", attention_mask.clone())?;
        let type_ids_array = to_array("token_type_ids", type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| embedding_error(format!("ONNX session lock poisoned: {e}")))?;

        let tensor = |array: &Array2<i64>| {
            TensorRef::from_array_view(array)
                .map_err(|e| embedding_error(format!("failed to build input tensor: {e}")))
        };
        let outputs = session
            .run(ort::inputs![
                "input_ids" => tensor(&input_ids_array)?,
                "attention_mask" => tensor(&attention_mask_array)?,
                "token_type_ids" => tensor(&type_ids_array)?
            ])
            .map_err(|e| embedding_error(format!("ONNX inference failed: {e}")))?;

        // Shape [batch, seq_len, hidden].
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| embedding_error(format!("failed to read output tensor: {e}")))?;
        let hidden = shape[shape.len() - 1] as usize;

        debug!(batch, seq_len, hidden, "onnx batch embedded");

        Ok((0..batch)
            .map(|row| {
                let offset = row * seq_len;
                let mut pooled = mean_pool(
                    &data[offset * hidden..(offset + seq_len) * hidden],
                    &attention_mask[offset..offset + seq_len],
                    hidden,
                );
                l2_normalize(&mut pooled);
                pooled
            })
            .collect())
    }
}

/// Average of token vectors whose attention mask is set.
fn mean_pool(tokens: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden];
    let mut count = 0.0f32;
    for (token, _) in tokens.chunks_exact(hidden).zip(mask).filter(|(_, m)| **m > 0) {
        for (acc, v) in sum.iter_mut().zip(token) {
            *acc += v;
        }
        count += 1.0;
    }
    if count > 0.0 {
        sum.iter_mut().for_each(|v| *v /= count);
    }
    sum
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-minilm"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, DocwardenError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("session lock poisoned: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), DocwardenError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, DocwardenError> {
        Ok(EmbeddingOutput {
            embeddings: self.embed_batch(&input.texts)?,
            dimensions: EMBEDDING_DIM,
        })
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pool_skips_padding() {
        let tokens = vec![
            1.0, 2.0, 3.0, // real
            9.0, 9.0, 9.0, // padding
        ];
        assert_eq!(mean_pool(&tokens, &[1, 0], 3), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn mean_pool_averages_real_tokens() {
        let tokens = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let pooled = mean_pool(&tokens, &[1, 1, 1], 2);
        assert!((pooled[0] - 3.0).abs() < f32::EPSILON);
        assert!((pooled[1] - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mean_pool_all_masked_is_zero() {
        assert_eq!(mean_pool(&[5.0, 5.0], &[0], 2), vec![0.0, 0.0]);
    }
}
