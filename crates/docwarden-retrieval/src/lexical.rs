// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BM25 lexical index over the chunk corpus.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tokenize::tokenize;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Per-chunk term frequencies plus corpus document frequencies.
///
/// Maps are ordered so the serialized form is byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalIndex {
    doc_freq: BTreeMap<String, u32>,
    term_freqs: Vec<BTreeMap<String, u32>>,
    doc_lens: Vec<u32>,
    avg_doc_len: f64,
}

impl LexicalIndex {
    /// Index `texts`; position `i` in the input is document `i`.
    pub fn build<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut doc_freq: BTreeMap<String, u32> = BTreeMap::new();
        let mut term_freqs = Vec::new();
        let mut doc_lens = Vec::new();

        for text in texts {
            let tokens = tokenize(text);
            let mut tf: BTreeMap<String, u32> = BTreeMap::new();
            for token in &tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(tokens.len() as u32);
            term_freqs.push(tf);
        }

        let total: u64 = doc_lens.iter().map(|&l| u64::from(l)).sum();
        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            total as f64 / doc_lens.len() as f64
        };

        Self {
            doc_freq,
            term_freqs,
            doc_lens,
            avg_doc_len,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    /// BM25 score of document `doc` for the given query terms.
    fn score(&self, doc: usize, query_terms: &[String]) -> f64 {
        let total_docs = self.len() as f64;
        let doc_len = f64::from(self.doc_lens[doc]);
        if doc_len == 0.0 || self.avg_doc_len <= f64::EPSILON {
            return 0.0;
        }
        let tf = &self.term_freqs[doc];

        query_terms
            .iter()
            .filter_map(|term| {
                let term_tf = f64::from(*tf.get(term)?);
                let df = f64::from(self.doc_freq.get(term).copied().unwrap_or(0));
                let idf = (((total_docs - df + 0.5) / (df + 0.5)) + 1.0).ln();
                let denom = term_tf + K1 * (1.0 - B + B * (doc_len / self.avg_doc_len));
                Some(idf * (term_tf * (K1 + 1.0)) / denom)
            })
            .sum()
    }

    /// Up to `limit` `(document, score)` pairs with positive score, best
    /// first; equal scores keep index order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<(usize, f64)> {
        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = (0..self.len())
            .map(|doc| (doc, self.score(doc, &terms)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        scored
    }
}
