// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes memory decisions to the right store.

use std::sync::Arc;

use docwarden_config::model::MemoryConfig;
use docwarden_core::DocwardenError;
use tracing::{debug, info};

use crate::engine::decide;
use crate::store::{FileMemoryStore, InMemoryStore, MemoryStore};
use crate::types::{MemoryDecision, MemoryRecord, MemoryTarget, MemoryWriteEvent, WriteStatus};

/// Default minimum confidence for a write.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.8;

/// The user and company stores plus the write policy.
#[derive(Clone)]
pub struct MemoryLedger {
    user: Arc<dyn MemoryStore>,
    company: Arc<dyn MemoryStore>,
    min_confidence: f64,
    enabled: bool,
}

impl MemoryLedger {
    pub fn new(
        user: Arc<dyn MemoryStore>,
        company: Arc<dyn MemoryStore>,
        min_confidence: f64,
    ) -> Self {
        Self {
            user,
            company,
            min_confidence,
            enabled: true,
        }
    }

    /// Volatile stores with the default threshold.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::new(MemoryTarget::User)),
            Arc::new(InMemoryStore::new(MemoryTarget::Company)),
            DEFAULT_MIN_CONFIDENCE,
        )
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        let mut ledger = Self::new(
            Arc::new(FileMemoryStore::new(&config.user_store_path, MemoryTarget::User)),
            Arc::new(FileMemoryStore::new(
                &config.company_store_path,
                MemoryTarget::Company,
            )),
            config.min_confidence,
        );
        ledger.enabled = config.enabled;
        ledger
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self, target: MemoryTarget) -> &Arc<dyn MemoryStore> {
        match target {
            MemoryTarget::User => &self.user,
            MemoryTarget::Company => &self.company,
        }
    }

    /// Decide on a turn and persist the result.
    ///
    /// Returns `None` when memory is disabled or the turn holds no fact.
    pub async fn remember(
        &self,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<Option<MemoryWriteEvent>, DocwardenError> {
        if !self.enabled {
            return Ok(None);
        }
        self.record(decide(user_text, assistant_text)).await
    }

    /// Persist an already-made decision.
    pub async fn record(
        &self,
        decision: MemoryDecision,
    ) -> Result<Option<MemoryWriteEvent>, DocwardenError> {
        let Some(target) = decision.target.filter(|_| self.enabled && decision.should_write)
        else {
            return Ok(None);
        };

        let status = if decision.confidence < self.min_confidence {
            debug!(
                confidence = decision.confidence,
                min = self.min_confidence,
                "memory decision below threshold"
            );
            WriteStatus::BelowThreshold
        } else {
            let record = MemoryRecord::new(target, decision.summary.clone(), decision.confidence);
            if self.store(target).append_if_new(&record).await? {
                info!(store = %target, rule = decision.rule.unwrap_or("-"), "memory fact stored");
                WriteStatus::Written
            } else {
                WriteStatus::Duplicate
            }
        };

        Ok(Some(MemoryWriteEvent {
            target,
            summary: decision.summary,
            confidence: decision.confidence,
            status,
        }))
    }

    /// Everything known about the user.
    pub async fn user_facts(&self) -> Result<Vec<String>, DocwardenError> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        self.user.summaries().await
    }

    pub async fn company_facts(&self) -> Result<Vec<String>, DocwardenError> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        self.company.summaries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn repeated_identity_is_stored_once() {
        let ledger = MemoryLedger::in_memory();

        let first = ledger.remember("I'm a data analyst", "").await.unwrap().unwrap();
        assert_eq!(first.status, WriteStatus::Written);
        assert_eq!(first.target, MemoryTarget::User);

        let second = ledger.remember("I'm a data analyst", "").await.unwrap().unwrap();
        assert_eq!(second.status, WriteStatus::Duplicate);

        assert_eq!(ledger.user_facts().await.unwrap(), vec!["User is a data analyst"]);
        assert!(ledger.company_facts().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn writes_are_logged_without_the_fact() {
        let ledger = MemoryLedger::in_memory();
        ledger.remember("My name is Durgesh", "").await.unwrap();
        assert!(logs_contain("memory fact stored"));
        assert!(logs_contain("store=USER"));
        assert!(!logs_contain("Durgesh"));
    }

    #[tokio::test]
    async fn secrets_are_never_stored() {
        let ledger = MemoryLedger::in_memory();
        assert!(ledger.remember("My email is x@y.com", "").await.unwrap().is_none());
        assert!(ledger.user_facts().await.unwrap().is_empty());
        assert!(ledger.company_facts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn threshold_gates_company_facts() {
        let ledger = MemoryLedger::new(
            Arc::new(InMemoryStore::new(MemoryTarget::User)),
            Arc::new(InMemoryStore::new(MemoryTarget::Company)),
            0.88,
        );
        let event = ledger.remember("We use Snowflake", "").await.unwrap().unwrap();
        assert_eq!(event.status, WriteStatus::BelowThreshold);
        assert!(ledger.company_facts().await.unwrap().is_empty());

        let event = ledger.remember("I'm a data analyst", "").await.unwrap().unwrap();
        assert_eq!(event.status, WriteStatus::Written);
    }

    #[tokio::test]
    async fn disabled_ledger_is_inert() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemoryConfig {
            enabled: false,
            user_store_path: dir.path().join("U.md").display().to_string(),
            company_store_path: dir.path().join("C.md").display().to_string(),
            min_confidence: 0.8,
        };
        let ledger = MemoryLedger::from_config(&config);
        assert!(ledger.remember("I'm a data analyst", "").await.unwrap().is_none());
        assert!(!dir.path().join("U.md").exists());
    }

    #[tokio::test]
    async fn file_backed_ledger_writes_to_target_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemoryConfig {
            enabled: true,
            user_store_path: dir.path().join("USER_MEMORY.md").display().to_string(),
            company_store_path: dir.path().join("COMPANY_MEMORY.md").display().to_string(),
            min_confidence: 0.8,
        };
        let ledger = MemoryLedger::from_config(&config);
        ledger.remember("Our team uses Jira for planning", "").await.unwrap();

        let company = std::fs::read_to_string(dir.path().join("COMPANY_MEMORY.md")).unwrap();
        assert!(company.contains("[COMPANY] [0.85] Team uses Jira for planning"));
        assert!(!dir.path().join("USER_MEMORY.md").exists());
    }
}
