// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline generation backend that answers by quoting a source sentence.
//!
//! It reads the SOURCE blocks and question back out of a grounded prompt,
//! picks the sentence sharing the most terms with the question and cites
//! its source. With no overlap it replies with the not-found sentence.
//! Deterministic, so it backs the self-check and tests.

use std::collections::HashSet;

use async_trait::async_trait;
use docwarden_core::{
    AdapterType, DocwardenError, GenerationAdapter, GenerationRequest, GenerationResponse,
    HealthStatus, PluginAdapter, REFUSAL_NOT_FOUND,
};
use docwarden_retrieval::tokenize::tokenize;

use crate::prompt::{END_OF_SOURCES, QUESTION_PREFIX, SOURCE_HEADER};

/// A source block read back from a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSource {
    /// The `[source:...]` token exactly as in the header.
    pub citation: String,
    pub text: String,
}

/// SOURCE blocks of a prompt built by [`crate::prompt::PromptBuilder`].
pub fn parse_sources(prompt: &str) -> Vec<PromptSource> {
    let mut sources: Vec<PromptSource> = Vec::new();
    for line in prompt.lines() {
        if line == END_OF_SOURCES {
            break;
        }
        if let Some(citation) = line
            .strip_prefix(SOURCE_HEADER)
            .filter(|rest| rest.starts_with("[source:") && rest.ends_with(']'))
        {
            sources.push(PromptSource {
                citation: citation.to_string(),
                text: String::new(),
            });
        } else if let Some(current) = sources.last_mut() {
            if !current.text.is_empty() {
                current.text.push('\n');
            }
            current.text.push_str(line);
        }
    }
    for source in &mut sources {
        source.text = source.text.trim().to_string();
    }
    sources
}

/// The question line of a grounded prompt.
pub fn parse_question(prompt: &str) -> Option<&str> {
    let start = prompt.rfind(&format!("\n{QUESTION_PREFIX}"))? + 1 + QUESTION_PREFIX.len();
    let rest = &prompt[start..];
    let end = rest.find("\nAnswer:").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Split on `.`, `!` or `?` followed by whitespace, and on blank lines.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '.' | '!' | '?' => chars.peek().is_some_and(|(_, next)| next.is_whitespace()),
            '\n' => chars.peek().is_some_and(|(_, next)| *next == '\n'),
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveGenerator;

impl ExtractiveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Best `(sentence, citation)` for the prompt, if any sentence shares a
    /// term with the question. Earlier sources win ties.
    pub fn select<'a>(&self, question: &str, sources: &'a [PromptSource]) -> Option<(&'a str, &'a str)> {
        let wanted: HashSet<String> = tokenize(question).into_iter().collect();
        if wanted.is_empty() {
            return None;
        }

        let mut best: Option<(usize, &str, &str)> = None;
        for source in sources {
            for sentence in sentences(&source.text) {
                let terms: HashSet<String> = tokenize(sentence).into_iter().collect();
                let overlap = terms.intersection(&wanted).count();
                if overlap > 0 && best.is_none_or(|(score, _, _)| overlap > score) {
                    best = Some((overlap, sentence, source.citation.as_str()));
                }
            }
        }
        best.map(|(_, sentence, citation)| (sentence, citation))
    }

    pub fn respond(&self, prompt: &str) -> String {
        let sources = parse_sources(prompt);
        let question = parse_question(prompt).unwrap_or_default();
        match self.select(question, &sources) {
            Some((sentence, citation)) => format!("{sentence} {citation}"),
            None => REFUSAL_NOT_FOUND.to_string(),
        }
    }
}

#[async_trait]
impl PluginAdapter for ExtractiveGenerator {
    fn name(&self) -> &str {
        "extractive"
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
impl GenerationAdapter for ExtractiveGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DocwardenError> {
        Ok(GenerationResponse {
            text: self.respond(&request.prompt),
            model: request.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptBuilder;
    use docwarden_core::{Chunk, RetrievedChunk};

    fn hit(id: &str, page: u32, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: Chunk {
                chunk_id: id.into(),
                doc_id: "test".into(),
                filename: "test.txt".into(),
                page,
                text: text.into(),
            },
            dense_rank: None,
            sparse_rank: Some(1),
            fused_score: 1.0 / 61.0,
        }
    }

    fn prompt(question: &str) -> String {
        PromptBuilder::default().build(
            question,
            &[
                hit("c11", 3, "The board met twice.\n\nBudgets were approved."),
                hit("c12", 4, "Revenue rose. ARR was $148.5 million, YoY growth 27.3%"),
            ],
        )
    }

    #[test]
    fn parses_sources_and_question() {
        let p = prompt("What was the FY2024 ARR?");
        let sources = parse_sources(&p);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].citation, "[source:test.txt#c11 p=3]");
        assert_eq!(sources[0].text, "The board met twice.\n\nBudgets were approved.");
        assert_eq!(parse_question(&p), Some("What was the FY2024 ARR?"));
    }

    #[test]
    fn quotes_best_sentence_with_citation() {
        let reply = ExtractiveGenerator::new().respond(&prompt("What was the FY2024 ARR?"));
        assert_eq!(
            reply,
            "ARR was $148.5 million, YoY growth 27.3% [source:test.txt#c12 p=4]"
        );
    }

    #[test]
    fn refuses_without_overlap() {
        let reply = ExtractiveGenerator::new().respond(&prompt("Who designed the logo?"));
        assert_eq!(reply, REFUSAL_NOT_FOUND);
    }

    #[test]
    fn sentence_split_keeps_decimals() {
        assert_eq!(
            sentences("ARR was $148.5 million. Growth was 27.3%!\n\nNext"),
            vec!["ARR was $148.5 million.", "Growth was 27.3%!", "Next"]
        );
    }
}
