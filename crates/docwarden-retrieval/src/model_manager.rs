// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run download of the all-MiniLM-L6-v2 ONNX model.
//!
//! Files are fetched from HuggingFace into `<data_dir>/models/all-MiniLM-L6-v2/`
//! once; later runs work fully offline.

use std::path::{Path, PathBuf};

use docwarden_core::DocwardenError;
use tokio::sync::Mutex;
use tracing::info;

const MODEL_URL: &str = "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

const MODEL_DIR_NAME: &str = "all-MiniLM-L6-v2";

/// Resolves and, when missing, downloads the embedding model files.
pub struct ModelManager {
    data_dir: PathBuf,
    download_lock: Mutex<()>,
}

impl ModelManager {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            download_lock: Mutex::new(()),
        }
    }

    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("models").join(MODEL_DIR_NAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join("model.onnx")
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join("tokenizer.json")
    }

    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Path to `model.onnx`, downloading both files first if needed.
    pub async fn ensure_model(&self) -> Result<PathBuf, DocwardenError> {
        let _guard = self.download_lock.lock().await;
        if self.is_model_available() {
            return Ok(self.model_path());
        }

        let model_dir = self.model_dir();
        info!(dir = %model_dir.display(), "embedding model missing, downloading");
        tokio::fs::create_dir_all(&model_dir).await?;

        for (filename, url) in [("model.onnx", MODEL_URL), ("tokenizer.json", TOKENIZER_URL)] {
            let dest = model_dir.join(filename);
            if dest.exists() {
                continue;
            }
            let size = download_file(url, &dest).await?;
            info!(file = filename, bytes = size, "downloaded model file");
        }

        Ok(self.model_path())
    }
}

/// Fetch `url` into `dest` via a sibling temp file so a failed download
/// never leaves a truncated model behind.
async fn download_file(url: &str, dest: &Path) -> Result<usize, DocwardenError> {
    let fail = |message: String| DocwardenError::Embedding {
        message,
        source: None,
    };

    let response = reqwest::get(url)
        .await
        .map_err(|e| fail(format!("failed to download {url}: {e}")))?;
    if !response.status().is_success() {
        return Err(fail(format!(
            "download of {url} failed with status {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| fail(format!("failed to read body from {url}: {e}")))?;

    let partial = dest.with_extension("part");
    if let Err(e) = tokio::fs::write(&partial, &bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    tokio::fs::rename(&partial, dest).await?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_data_dir() {
        let mgr = ModelManager::new(PathBuf::from("/tmp/docwarden"));
        assert_eq!(
            mgr.model_path(),
            PathBuf::from("/tmp/docwarden/models/all-MiniLM-L6-v2/model.onnx")
        );
        assert_eq!(
            mgr.tokenizer_path(),
            PathBuf::from("/tmp/docwarden/models/all-MiniLM-L6-v2/tokenizer.json")
        );
    }

    #[tokio::test]
    async fn existing_files_skip_download() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = ModelManager::new(dir.path().to_path_buf());
        std::fs::create_dir_all(mgr.model_dir()).unwrap();
        std::fs::write(mgr.model_path(), b"onnx").unwrap();
        std::fs::write(mgr.tokenizer_path(), b"{}").unwrap();

        assert!(mgr.is_model_available());
        assert_eq!(mgr.ensure_model().await.unwrap(), mgr.model_path());
    }
}
