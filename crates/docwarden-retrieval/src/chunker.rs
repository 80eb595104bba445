// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page-level passage splitting with word-aligned overlap.
//!
//! Each page is cut into segments (paragraphs, then sentences, then hard
//! splits for oversize sentences) which are packed greedily into windows of
//! at most `max_chars` characters. Every chunk is a contiguous slice of the
//! page text, so the overlap carried into chunk N+1 is literally a suffix of
//! chunk N.

use std::sync::LazyLock;

use docwarden_config::model::ChunkingConfig;
use docwarden_core::{Chunk, Document, DocwardenError};
use regex::Regex;
use tracing::debug;

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// Byte offsets of one chunk inside its page text.
///
/// `text[start..overlap_end]` is the part shared with the previous chunk
/// (empty for the first chunk or when no overlap fits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub overlap_end: usize,
    pub end: usize,
}

/// Splits documents into retrievable chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chars: usize,
    overlap_chars: usize,
}

impl Chunker {
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self, DocwardenError> {
        if max_chars == 0 {
            return Err(DocwardenError::Config(
                "chunk size must be positive".to_string(),
            ));
        }
        if overlap_chars >= max_chars {
            return Err(DocwardenError::Config(format!(
                "chunk overlap ({overlap_chars}) must be smaller than chunk size ({max_chars})"
            )));
        }
        Ok(Self {
            max_chars,
            overlap_chars,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self, DocwardenError> {
        Self::new(config.max_chars, config.overlap_chars)
    }

    /// Chunks every page of `document`, in page order.
    ///
    /// Ids are `{doc_id}_p{page}_{index:04}` with the index counted per page.
    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in &document.pages {
            for (index, span) in self.spans(&page.text).into_iter().enumerate() {
                chunks.push(Chunk {
                    chunk_id: format!("{}_p{}_{index:04}", document.doc_id, page.page_number),
                    doc_id: document.doc_id.clone(),
                    filename: document.filename.clone(),
                    page: page.page_number,
                    text: page.text[span.start..span.end].to_string(),
                });
            }
        }
        debug!(
            doc_id = %document.doc_id,
            pages = document.pages.len(),
            chunks = chunks.len(),
            "chunked document"
        );
        chunks
    }

    /// Chunk boundaries for a single page of text.
    pub fn spans(&self, text: &str) -> Vec<ChunkSpan> {
        let segments = self.segments(text);
        let Some(&(first_start, first_end)) = segments.first() else {
            return Vec::new();
        };

        let mut spans = Vec::new();
        let mut current = ChunkSpan {
            start: first_start,
            overlap_end: first_start,
            end: first_end,
        };

        for &(seg_start, seg_end) in &segments[1..] {
            if char_len(&text[current.start..seg_end]) <= self.max_chars {
                current.end = seg_end;
                continue;
            }
            spans.push(current);
            let previous = current;
            current = match self.overlap_start(text, &previous, seg_end) {
                Some(start) => ChunkSpan {
                    start,
                    overlap_end: previous.end,
                    end: seg_end,
                },
                None => ChunkSpan {
                    start: seg_start,
                    overlap_end: seg_start,
                    end: seg_end,
                },
            };
        }
        spans.push(current);
        spans
    }

    /// Trimmed segments, each at most `max_chars` long, in text order.
    fn segments(&self, text: &str) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (p_start, p_end) in paragraphs(text) {
            if char_len(&text[p_start..p_end]) <= self.max_chars {
                out.push((p_start, p_end));
                continue;
            }
            for (s_start, s_end) in sentences(text, p_start, p_end) {
                if char_len(&text[s_start..s_end]) <= self.max_chars {
                    out.push((s_start, s_end));
                } else {
                    out.extend(hard_split(text, s_start, s_end, self.max_chars));
                }
            }
        }
        out
    }

    /// Start of the overlap carried from `previous` into a window ending at `next_end`.
    ///
    /// The overlap is a proper suffix of the previous chunk, at most
    /// `overlap_chars` long, starting at a word boundary. It shrinks word by
    /// word until the new window fits; `None` when nothing fits.
    fn overlap_start(&self, text: &str, previous: &ChunkSpan, next_end: usize) -> Option<usize> {
        if self.overlap_chars == 0 {
            return None;
        }
        let body = &text[previous.start..previous.end];
        let tail_start = body
            .char_indices()
            .rev()
            .take(self.overlap_chars)
            .last()
            .map(|(i, _)| previous.start + i)?;
        let earliest = if tail_start == previous.start {
            previous.start + body.chars().next()?.len_utf8()
        } else {
            tail_start
        };

        text[earliest..previous.end]
            .char_indices()
            .map(|(i, c)| (earliest + i, c))
            .filter(|&(pos, c)| {
                !c.is_whitespace() && text[..pos].chars().next_back().is_some_and(char::is_whitespace)
            })
            .map(|(pos, _)| pos)
            .find(|&pos| char_len(&text[pos..next_end]) <= self.max_chars)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Narrow `start..end` to its non-whitespace core; `None` if blank.
fn trim_range(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = slice.len() - slice.trim_start().len();
    Some((start + lead, start + lead + trimmed.len()))
}

fn skip_whitespace(text: &str, from: usize, end: usize) -> usize {
    let slice = &text[from..end];
    from + (slice.len() - slice.trim_start().len())
}

fn paragraphs(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in BLANK_LINE.find_iter(text) {
        out.extend(trim_range(text, last, m.start()));
        last = m.end();
    }
    out.extend(trim_range(text, last, text.len()));
    out
}

/// Sentences end at `.`, `!` or `?` followed by whitespace.
fn sentences(text: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut cursor = start;
    let mut chars = text[start..end].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && let Some(&(_, next)) = chars.peek()
            && next.is_whitespace()
        {
            let boundary = start + i + c.len_utf8();
            out.extend(trim_range(text, cursor, boundary));
            cursor = boundary;
        }
    }
    out.extend(trim_range(text, cursor, end));
    out
}

/// Cuts an oversize sentence at the last whitespace within the limit, or at
/// a character boundary when a piece has no whitespace at all.
fn hard_split(text: &str, start: usize, end: usize, max_chars: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut cursor = start;
    while char_len(&text[cursor..end]) > max_chars {
        let mut last_space = None;
        let mut limit = end;
        for (n, (i, c)) in text[cursor..end].char_indices().enumerate() {
            if n == max_chars {
                limit = cursor + i;
                if c.is_whitespace() {
                    last_space = Some(limit);
                }
                break;
            }
            if n > 0 && c.is_whitespace() {
                last_space = Some(cursor + i);
            }
        }
        let cut = last_space.unwrap_or(limit);
        out.extend(trim_range(text, cursor, cut));
        cursor = skip_whitespace(text, cut, end);
    }
    out.extend(trim_range(text, cursor, end));
    out
}
