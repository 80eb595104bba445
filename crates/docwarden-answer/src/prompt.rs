// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Citation-constrained prompt assembly.

use docwarden_config::model::AnswerConfig;
use docwarden_core::{REFUSAL_NOT_FOUND, RetrievedChunk};

/// Prefix of every source header line.
pub const SOURCE_HEADER: &str = "SOURCE ";
/// Line that closes the sources section.
pub const END_OF_SOURCES: &str = "END OF SOURCES";
/// Prefix of the question line.
pub const QUESTION_PREFIX: &str = "Question: ";

/// Appended to the prompt when the previous reply had no usable citation.
pub const CITATION_REMINDER: &str = "\n\nYour previous answer had no valid citation. \
Cite sources ONLY as [source:<filename>#<chunk_id> p=<page>], copied exactly from a \
SOURCE header, with a single integer page. Citations in any other form are rejected.";

#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    max_context_chunks: usize,
    max_chunk_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            max_context_chunks: 5,
            max_chunk_chars: 1200,
        }
    }
}

impl PromptBuilder {
    pub fn new(max_context_chunks: usize, max_chunk_chars: usize) -> Self {
        Self {
            max_context_chunks,
            max_chunk_chars,
        }
    }

    pub fn from_config(config: &AnswerConfig) -> Self {
        Self::new(config.max_context_chunks, config.max_chunk_chars)
    }

    /// The chunks that make it into the prompt.
    pub fn context<'a>(&self, retrieved: &'a [RetrievedChunk]) -> &'a [RetrievedChunk] {
        &retrieved[..retrieved.len().min(self.max_context_chunks)]
    }

    pub fn build(&self, query: &str, retrieved: &[RetrievedChunk]) -> String {
        let mut sources = String::new();
        for hit in self.context(retrieved) {
            sources.push_str(SOURCE_HEADER);
            sources.push_str(&hit.chunk.citation().to_string());
            sources.push('\n');
            sources.push_str(truncate_chars(&hit.chunk.text, self.max_chunk_chars));
            sources.push_str("\n\n");
        }

        format!(
            "You are a precise document assistant. Answer the question using ONLY the sources below.\n\
             \n\
             Rules:\n\
             1. Use only information stated in the sources. Do not use outside knowledge.\n\
             2. Support every factual claim with an inline citation in exactly this form:\n   \
             [source:<filename>#<chunk_id> p=<page>]\n   \
             Copy it from the SOURCE header. <page> is one integer: no ranges, lists or extra spaces.\n\
             3. If the sources do not contain the answer, reply with exactly:\n   \
             {REFUSAL_NOT_FOUND}\n\
             4. Do not guess or speculate.\n\
             \n\
             {sources}{END_OF_SOURCES}\n\
             \n\
             {QUESTION_PREFIX}{question}\n\
             Answer:",
            question = query.trim(),
        )
    }
}

/// Longest prefix of `text` with at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
