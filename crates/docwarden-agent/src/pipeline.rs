// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One conversational turn, start to finish.
//!
//! Stages run strictly in order and each is awaited before the next:
//! empty check, security gate, memory question, memory statement, then
//! retrieval, grounded answer and a memory write of the user text.

use docwarden_answer::{AnswerOutcome, Answerer};
use docwarden_core::{Citation, DocwardenError};
use docwarden_memory::{MemoryLedger, MemoryWriteEvent, WriteStatus};
use docwarden_retrieval::HybridRetriever;
use docwarden_security::{BlockReason, GateDecision, SecurityGate};
use tracing::{debug, info};

use crate::intent::{is_memory_question, memory_answer, memory_statement};

pub const DEFAULT_TOP_K: usize = 5;

pub const NOTED: &str = "Got it, I'll remember that.";
pub const ALREADY_NOTED: &str = "I already have that noted.";

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// Blank input; nothing ran.
    Empty,
    /// Refused by the security gate before retrieval.
    Blocked(BlockReason),
    /// Answered from the user's stored facts.
    MemoryAnswer,
    /// A preference or identity statement was recorded.
    MemoryNoted,
    /// Went through retrieval and the grounded answerer.
    Answer(AnswerOutcome),
}

impl TurnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Blocked(reason) => match reason {
                BlockReason::Injection => "blocked_injection",
                BlockReason::Classified => "blocked_classified",
            },
            Self::MemoryAnswer => "memory_answer",
            Self::MemoryNoted => "memory_noted",
            Self::Answer(outcome) => outcome.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub text: String,
    pub citations: Vec<Citation>,
    pub kind: TurnKind,
    pub memory_events: Vec<MemoryWriteEvent>,
}

impl TurnReply {
    fn plain(text: impl Into<String>, kind: TurnKind) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
            kind,
            memory_events: Vec::new(),
        }
    }
}

pub struct TurnPipeline {
    gate: SecurityGate,
    retriever: HybridRetriever,
    answerer: Answerer,
    ledger: MemoryLedger,
    top_k: usize,
}

impl TurnPipeline {
    pub fn new(retriever: HybridRetriever, answerer: Answerer, ledger: MemoryLedger) -> Self {
        Self {
            gate: SecurityGate::new(),
            retriever,
            answerer,
            ledger,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Process one user message.
    pub async fn handle_turn(&self, input: &str) -> Result<TurnReply, DocwardenError> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(TurnReply::plain("", TurnKind::Empty));
        }

        if let GateDecision::Block { reason, rule } = self.gate.check(text) {
            info!(reason = reason.as_str(), rule, "turn blocked by security gate");
            return Ok(TurnReply::plain(reason.refusal(), TurnKind::Blocked(reason)));
        }

        if self.ledger.is_enabled() {
            if is_memory_question(text) {
                debug!("answering from user memory");
                let facts = self.ledger.user_facts().await?;
                return Ok(TurnReply::plain(memory_answer(&facts), TurnKind::MemoryAnswer));
            }

            if let Some(parts) = memory_statement(text) {
                if let Some(reply) = self.note_statement(&parts).await? {
                    return Ok(reply);
                }
                debug!("statement held no durable fact, answering from documents");
            }
        }

        let retrieved = self.retriever.retrieve(text, self.top_k).await?;
        let answer = self.answerer.answer(text, &retrieved).await?;

        // Model output is never mined for facts.
        let memory_events = self.ledger.remember(text, "").await?.into_iter().collect();

        Ok(TurnReply {
            text: answer.text,
            citations: answer.citations,
            kind: TurnKind::Answer(answer.outcome),
            memory_events,
        })
    }

    /// Record each fragment of a statement on its own.
    ///
    /// `None` when no fragment produced a decision.
    async fn note_statement(&self, parts: &[String]) -> Result<Option<TurnReply>, DocwardenError> {
        let mut events = Vec::new();
        for part in parts {
            if let Some(event) = self.ledger.remember(part, "").await? {
                events.push(event);
            }
        }
        if events.is_empty() {
            return Ok(None);
        }

        let written = events.iter().any(|e| e.status == WriteStatus::Written);
        let known = events.iter().any(|e| e.status == WriteStatus::Duplicate);
        let text = if known && !written { ALREADY_NOTED } else { NOTED };

        Ok(Some(TurnReply {
            text: text.to_string(),
            citations: Vec::new(),
            kind: TurnKind::MemoryNoted,
            memory_events: events,
        }))
    }
}
