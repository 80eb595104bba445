// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only fact stores.
//!
//! Each store owns one target and serialises its read-dedup-append cycle
//! behind its own lock. [`FileMemoryStore`] keeps one markdown line per fact;
//! [`InMemoryStore`] backs tests.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docwarden_core::DocwardenError;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::{MemoryRecord, MemoryTarget};

/// Storage for the facts of a single target.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    fn target(&self) -> MemoryTarget;

    /// Every stored summary, oldest first.
    async fn summaries(&self) -> Result<Vec<String>, DocwardenError>;

    /// Appends `record` unless an existing summary already contains it
    /// (case-insensitive). Returns whether a line was written.
    async fn append_if_new(&self, record: &MemoryRecord) -> Result<bool, DocwardenError>;
}

/// Whether `summary` is already covered by one of `existing`.
pub fn is_duplicate(existing: &[String], summary: &str) -> bool {
    let needle = summary.trim().to_lowercase();
    existing
        .iter()
        .any(|prior| prior.to_lowercase().contains(&needle))
}

/// Summary text of one stored line.
///
/// Full records yield their summary; hand-written `- ` bullets are taken
/// verbatim so edited files stay readable.
fn summary_of(line: &str) -> Option<String> {
    if let Some(record) = MemoryRecord::parse_line(line) {
        return Some(record.summary);
    }
    let bullet = line.trim().strip_prefix("- ")?.trim();
    (!bullet.is_empty()).then(|| bullet.to_string())
}

/// Markdown-file store, one fact per line.
pub struct FileMemoryStore {
    path: PathBuf,
    target: MemoryTarget,
    lock: Mutex<()>,
}

impl FileMemoryStore {
    pub fn new(path: impl Into<PathBuf>, target: MemoryTarget) -> Self {
        Self {
            path: path.into(),
            target,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, DocwardenError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn parse(content: &str) -> Vec<String> {
        content.lines().filter_map(summary_of).collect()
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    fn target(&self) -> MemoryTarget {
        self.target
    }

    async fn summaries(&self) -> Result<Vec<String>, DocwardenError> {
        let _guard = self.lock.lock().await;
        Ok(Self::parse(&self.read().await?))
    }

    async fn append_if_new(&self, record: &MemoryRecord) -> Result<bool, DocwardenError> {
        let _guard = self.lock.lock().await;

        let content = self.read().await?;
        if is_duplicate(&Self::parse(&content), &record.summary) {
            debug!(path = %self.path.display(), "memory fact already stored");
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = String::new();
        if !content.is_empty() && !content.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&record.to_line());
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(true)
    }
}

/// Volatile store for tests and disabled persistence.
pub struct InMemoryStore {
    target: MemoryTarget,
    records: Mutex<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    pub fn new(target: MemoryTarget) -> Self {
        Self {
            target,
            records: Mutex::new(Vec::new()),
        }
    }

    pub async fn records(&self) -> Vec<MemoryRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn target(&self) -> MemoryTarget {
        self.target
    }

    async fn summaries(&self) -> Result<Vec<String>, DocwardenError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .map(|r| r.summary.clone())
            .collect())
    }

    async fn append_if_new(&self, record: &MemoryRecord) -> Result<bool, DocwardenError> {
        let mut records = self.records.lock().await;
        let existing: Vec<String> = records.iter().map(|r| r.summary.clone()).collect();
        if is_duplicate(&existing, &record.summary) {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }
}
