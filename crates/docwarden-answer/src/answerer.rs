// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grounded answering: prompt, generate, repair, validate, filter.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use docwarden_config::model::{AnswerConfig, GenerationConfig};
use docwarden_core::{
    Citation, DocwardenError, GenerationAdapter, GenerationRequest, REFUSAL_CONFIDENTIAL,
    REFUSAL_NOT_FOUND, RetrievedChunk,
};
use docwarden_security::find_sensitive;
use tracing::{debug, info, warn};

use crate::citation::{CheckedAnswer, check_citations, repair_citations};
use crate::prompt::{CITATION_REMINDER, PromptBuilder};

/// How the final answer was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The model cited at least one retrieved chunk.
    Grounded,
    /// Retrieval returned nothing; the backend was not called.
    NoContext,
    /// The model replied with the not-found sentence.
    Refused,
    /// No valid citation after retries; the top chunk was attached.
    FallbackCitation,
    /// The answer contained contact data and was withheld.
    Redacted,
}

impl AnswerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grounded => "grounded",
            Self::NoContext => "no_context",
            Self::Refused => "refused",
            Self::FallbackCitation => "fallback_citation",
            Self::Redacted => "redacted",
        }
    }
}

impl fmt::Display for AnswerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroundedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
    pub outcome: AnswerOutcome,
}

impl GroundedAnswer {
    fn fixed(text: &str, outcome: AnswerOutcome) -> Self {
        Self {
            text: text.to_string(),
            citations: Vec::new(),
            outcome,
        }
    }
}

/// Progress of citation handling for one question.
///
/// `Init → Repaired → {Valid, Retrying, Fallback}`; `Retrying` generates
/// again and returns to `Repaired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CitationState {
    Init,
    Repaired,
    Retrying,
    Valid,
    Fallback,
}

impl CitationState {
    /// Where `Repaired` goes given how many valid citations were found.
    pub(crate) fn after_repair(valid: usize, retries_used: u32, max_retries: u32) -> Self {
        if valid > 0 {
            Self::Valid
        } else if retries_used < max_retries {
            Self::Retrying
        } else {
            Self::Fallback
        }
    }
}

pub struct Answerer {
    generator: Arc<dyn GenerationAdapter>,
    model: String,
    prompt: PromptBuilder,
    max_citation_retries: u32,
    timeout: Duration,
}

impl Answerer {
    pub fn new(generator: Arc<dyn GenerationAdapter>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
            prompt: PromptBuilder::default(),
            max_citation_retries: 1,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn from_config(
        generator: Arc<dyn GenerationAdapter>,
        answer: &AnswerConfig,
        generation: &GenerationConfig,
    ) -> Self {
        Self {
            generator,
            model: generation.model.clone(),
            prompt: PromptBuilder::from_config(answer),
            max_citation_retries: answer.max_citation_retries,
            timeout: Duration::from_secs(generation.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_citation_retries(mut self, retries: u32) -> Self {
        self.max_citation_retries = retries;
        self
    }

    /// Answer `query` from `retrieved` (best first).
    pub async fn answer(
        &self,
        query: &str,
        retrieved: &[RetrievedChunk],
    ) -> Result<GroundedAnswer, DocwardenError> {
        let Some(top) = retrieved.first() else {
            debug!("no retrieved context, refusing without generation");
            return Ok(GroundedAnswer::fixed(REFUSAL_NOT_FOUND, AnswerOutcome::NoContext));
        };

        let base_prompt = self.prompt.build(query, retrieved);
        let mut prompt = base_prompt.clone();
        let mut retries_used = 0;
        let mut checked = CheckedAnswer::default();
        let mut state = CitationState::Init;

        loop {
            state = match state {
                CitationState::Init | CitationState::Retrying => {
                    let raw = self.generate(&prompt).await?;
                    if is_refusal(&raw) {
                        info!("backend refused: answer not in sources");
                        return Ok(GroundedAnswer::fixed(REFUSAL_NOT_FOUND, AnswerOutcome::Refused));
                    }
                    checked = check_citations(&repair_citations(&raw), retrieved);
                    CitationState::Repaired
                }
                CitationState::Repaired => {
                    let next = CitationState::after_repair(
                        checked.citations.len(),
                        retries_used,
                        self.max_citation_retries,
                    );
                    if next == CitationState::Retrying {
                        retries_used += 1;
                        warn!(attempt = retries_used, "no valid citations, retrying with reminder");
                        prompt = format!("{base_prompt}{CITATION_REMINDER}");
                    }
                    next
                }
                CitationState::Valid => {
                    let CheckedAnswer { text, citations } = std::mem::take(&mut checked);
                    return Ok(self.finish(text, citations, AnswerOutcome::Grounded));
                }
                CitationState::Fallback => {
                    let text = std::mem::take(&mut checked.text);
                    if text.is_empty() {
                        return Ok(GroundedAnswer::fixed(REFUSAL_NOT_FOUND, AnswerOutcome::Refused));
                    }
                    warn!(chunk_id = %top.chunk.chunk_id, "attaching top chunk as fallback citation");
                    return Ok(self.finish(
                        text,
                        vec![top.chunk.citation()],
                        AnswerOutcome::FallbackCitation,
                    ));
                }
            };
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, DocwardenError> {
        let request = GenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
        };
        match tokio::time::timeout(self.timeout, self.generator.generate(request)).await {
            Ok(result) => Ok(result?.text),
            Err(_) => Err(DocwardenError::Timeout {
                duration: self.timeout,
            }),
        }
    }

    /// Output safety filter, applied last.
    fn finish(&self, text: String, citations: Vec<Citation>, outcome: AnswerOutcome) -> GroundedAnswer {
        if let Some(kind) = find_sensitive(&text) {
            warn!(kind = kind.as_str(), "answer withheld by output filter");
            return GroundedAnswer::fixed(REFUSAL_CONFIDENTIAL, AnswerOutcome::Redacted);
        }
        debug!(%outcome, citations = citations.len(), "answer ready");
        GroundedAnswer {
            text,
            citations,
            outcome,
        }
    }
}

/// Whether the reply is just the not-found sentence, possibly quoted.
fn is_refusal(raw: &str) -> bool {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim() == REFUSAL_NOT_FOUND
}
