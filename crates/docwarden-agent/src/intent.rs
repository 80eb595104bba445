// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cheap pattern checks that route a turn before retrieval.

use std::sync::LazyLock;

use regex::Regex;

static MEMORY_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:what\s+(?:do|did|don't|doesn't)\s+i\s+(?:like|love|enjoy|prefer|hate|want|need)|what\s+is\s+my\s+(?:name|role|job|preference|hobby|interest)|who\s+am\s+i|what\s+are\s+my\s+(?:preferences?|interests?|hobbies|goals?)|do\s+you\s+(?:know|remember)\s+(?:me|my))\b",
    )
    .unwrap()
});

static MEMORY_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:i\s+prefer|i\s+like|i\s+love|i\s+enjoy|i'?m\s+into|i\s+am\s+into|my\s+name\s+is|call\s+me|i'?m\s+an?|i\s+am\s+an?|my\s+role\s+is|i\s+work\s+as|i\s+am\s+working\s+as|send\s+me|don'?t\s+explain|don'?t\s+summari[sz]e|do\s+not\s+explain|do\s+not\s+summari[sz]e|no\s+summary|no\s+explanation|no\s+briefing|no\s+brief)\b",
    )
    .unwrap()
});

static AND_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\band\b").unwrap());

/// "What is my name", "what do I like", "who am I" and similar.
pub fn is_memory_question(text: &str) -> bool {
    MEMORY_QUESTION.is_match(text)
}

/// Non-empty pieces of `text` split on the word "and".
pub fn fragments(text: &str) -> Vec<String> {
    AND_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// The fragments of a preference or identity statement.
///
/// Returns `None` unless at least one fragment reads like one.
pub fn memory_statement(text: &str) -> Option<Vec<String>> {
    let parts = fragments(text);
    parts
        .iter()
        .any(|f| MEMORY_STATEMENT.is_match(f))
        .then_some(parts)
}

/// Commands understood by the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Memory,
    Reindex,
    Exit,
    Unknown(String),
}

impl SlashCommand {
    /// Parses `/help`, `/memory`, `/reindex`, `/exit` and `/quit`.
    ///
    /// Returns `None` for input that is not a command at all.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let name = input.strip_prefix('/')?;
        let command = match name.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "memory" => Self::Memory,
            "reindex" => Self::Reindex,
            "exit" | "quit" => Self::Exit,
            _ => Self::Unknown(input.to_string()),
        };
        Some(command)
    }
}

/// Reply to a memory question, built from stored user facts.
pub fn memory_answer(facts: &[String]) -> String {
    if facts.is_empty() {
        return "I don't have anything stored in your memory yet.".to_string();
    }
    let mut out = String::from("Based on what I know about you:");
    for fact in facts {
        out.push_str("\n  • ");
        out.push_str(fact);
    }
    out
}
