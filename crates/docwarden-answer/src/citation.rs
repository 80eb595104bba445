// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Citation repair, extraction and validation.
//!
//! Model output is untrusted. Repairs only touch the page part of a
//! `[source:...]` block, after the chunk id; filename and chunk id are never
//! rewritten. Extraction accepts only the strict grammar
//! `[source:<filename>#<chunk_id> p=<integer>]`. Chunk ids never contain
//! whitespace, `#` or brackets, so the last `#` in a block starts the id.

use std::collections::HashSet;
use std::sync::LazyLock;

use docwarden_core::{Citation, RetrievedChunk};
use regex::{Captures, Regex};

static SOURCE_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[source:[^\]]*\]").unwrap());

static STRICT_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[source:([^\]]+)#([^\s#\]]+)\s+p=(\d+)\]").unwrap());

/// `pages=`, `page=`, `pg=`, `page:` and spaced `p =` all become `p=`.
static PAGE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:pages|page|pg|p)\s*[=:]\s*").unwrap());

/// `p=1-3`, `p=1 – 3`, `p=1 - p=19`.
static PAGE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"p=(\d+)\s*[-–]\s*(?:p=)?\d+").unwrap());

/// `p=2,5` and `p=2, 5, 7`.
static PAGE_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"p=(\d+)(?:\s*,\s*(?:p=)?\d+)+").unwrap());

const BLOCK_OPEN: &str = "[source:";

/// Fix common page-token mistakes inside every `[source:...]` block.
pub fn repair_citations(text: &str) -> String {
    SOURCE_BLOCK
        .replace_all(text, |caps: &Captures<'_>| repair_block(&caps[0]))
        .into_owned()
}

fn repair_block(block: &str) -> String {
    let inner = &block[BLOCK_OPEN.len()..block.len() - 1];
    let Some(hash) = inner.rfind('#') else {
        return block.to_string();
    };
    let after_hash = &inner[hash + 1..];
    let id_len = after_hash
        .find(char::is_whitespace)
        .unwrap_or(after_hash.len());
    let (head, tail) = inner.split_at(hash + 1 + id_len);

    let tail = PAGE_KEY.replace_all(tail, "p=");
    let tail = PAGE_RANGE.replace_all(&tail, "p=$1");
    let tail = PAGE_LIST.replace_all(&tail, "p=$1");
    let tail = tail.trim();

    if tail.is_empty() {
        format!("{BLOCK_OPEN}{head}]")
    } else {
        format!("{BLOCK_OPEN}{head} {tail}]")
    }
}

/// Strict-grammar citations in first-seen order, without duplicates.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    let mut seen = HashSet::new();
    STRICT_CITATION
        .captures_iter(text)
        .filter_map(|caps| {
            let page = caps[3].parse::<u32>().ok()?;
            let citation = Citation {
                filename: caps[1].to_string(),
                chunk_id: caps[2].to_string(),
                page,
            };
            seen.insert(citation.clone()).then_some(citation)
        })
        .collect()
}

/// Answer text after validation against the retrieved set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckedAnswer {
    /// Text with valid citations canonicalised and invalid ones removed.
    pub text: String,
    /// Valid citations, deduplicated by chunk, in first-seen order.
    pub citations: Vec<Citation>,
}

/// Keep only citations whose chunk id was retrieved.
///
/// Valid tokens are rewritten from the chunk record so filename and page are
/// always right. Tokens naming unknown chunks, and any `[source:...]` block
/// still malformed after repair, are dropped from the text.
pub fn check_citations(text: &str, retrieved: &[RetrievedChunk]) -> CheckedAnswer {
    let mut citations: Vec<Citation> = Vec::new();
    let mut rendered_valid: HashSet<String> = HashSet::new();

    let rewritten = STRICT_CITATION.replace_all(text, |caps: &Captures<'_>| {
        match retrieved.iter().find(|hit| hit.chunk.chunk_id == caps[2]) {
            Some(hit) => {
                let canonical = hit.chunk.citation();
                let rendered = canonical.to_string();
                if !citations.iter().any(|c| c.chunk_id == canonical.chunk_id) {
                    citations.push(canonical);
                }
                rendered_valid.insert(rendered.clone());
                rendered
            }
            None => String::new(),
        }
    });

    let stripped = SOURCE_BLOCK.replace_all(&rewritten, |caps: &Captures<'_>| {
        if rendered_valid.contains(&caps[0]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });

    CheckedAnswer {
        text: tidy_spacing(&stripped),
        citations,
    }
}

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+([.,;:!?])").unwrap());
static DOUBLE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Clean up the gaps left by removed tokens.
fn tidy_spacing(text: &str) -> String {
    let text = DOUBLE_SPACE.replace_all(text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    text.trim().to_string()
}
