// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loads `.txt` / `.md` documents from a directory tree.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use docwarden_config::model::IngestConfig;
use docwarden_core::{
    AdapterType, Document, DocumentSource, DocwardenError, HealthStatus, IngestFailure,
    IngestReport, Page, PluginAdapter,
};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

static HYPHEN_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w)-\n(\w)").unwrap());
static DECORATIVE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[=\-]{4,}[ \t]*$").unwrap());
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalise raw file text before chunking.
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = HYPHEN_BREAK.replace_all(&text, "$1$2");
    let text = DECORATIVE_LINE.replace_all(&text, "");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// `{stem}_{first 8 hex of sha256(bytes)}`. Depends only on name and content.
///
/// Whitespace, `#` and brackets in the stem become `_` so the id can sit
/// inside a citation token.
pub fn doc_id_for(path: &Path, bytes: &[u8]) -> String {
    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
        .chars()
        .map(|c| match c {
            '#' | '[' | ']' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    let digest = hex::encode(Sha256::digest(bytes));
    format!("{stem}_{}", &digest[..8])
}

/// Recursive directory walk in sorted order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(&config.source_dir, &config.extensions)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|want| *want == e))
    }

    fn load_blocking(&self) -> Result<IngestReport, DocwardenError> {
        if !self.root.is_dir() {
            return Err(DocwardenError::Ingestion {
                path: self.root.clone(),
                message: "source directory not found".to_string(),
            });
        }

        let mut report = IngestReport::default();
        let walker = WalkDir::new(&self.root).sort_by_file_name().into_iter();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    report.failures.push(IngestFailure {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.wants(entry.path()) {
                continue;
            }

            match load_file(entry.path()) {
                Ok(Some(document)) => report.documents.push(document),
                Ok(None) => debug!(path = %entry.path().display(), "skipping empty file"),
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to load document");
                    report.failures.push(IngestFailure {
                        path: entry.path().to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            root = %self.root.display(),
            documents = report.documents.len(),
            failures = report.failures.len(),
            "documents loaded"
        );
        Ok(report)
    }
}

/// One file becomes one single-page document; `None` if nothing remains
/// after cleaning.
fn load_file(path: &Path) -> Result<Option<Document>, DocwardenError> {
    let bytes = std::fs::read(path).map_err(|e| DocwardenError::Ingestion {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let text = clean_text(&String::from_utf8_lossy(&bytes));
    if text.is_empty() {
        return Ok(None);
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Some(Document {
        doc_id: doc_id_for(path, &bytes),
        filename,
        pages: vec![Page {
            page_number: 1,
            text,
        }],
    }))
}

#[async_trait]
impl PluginAdapter for DirectorySource {
    fn name(&self) -> &str {
        "directory-source"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::DocumentSource
    }

    async fn health_check(&self) -> Result<HealthStatus, DocwardenError> {
        if self.root.is_dir() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(format!(
                "source directory {} not found",
                self.root.display()
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), DocwardenError> {
        Ok(())
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn load(&self) -> Result<IngestReport, DocwardenError> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.load_blocking())
            .await
            .map_err(|e| DocwardenError::Internal(format!("document loader panicked: {e}")))?
    }
}
