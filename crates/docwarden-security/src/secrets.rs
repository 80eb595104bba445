// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret and contact-data detection for text that may be persisted.
//!
//! Stricter than the answer filter: any credential-shaped token, any digit
//! run that could be a phone number, or any long high-entropy string rejects
//! the whole text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::sensitive::{EMAIL, INTL_PHONE, US_PHONE};

/// Minimum length for a token to be considered by the entropy check.
pub const ENTROPY_MIN_LEN: usize = 20;

/// Shannon entropy (bits per character) at or above which a token is treated as a secret.
pub const ENTROPY_THRESHOLD: f64 = 3.0;

/// Loose digit runs: eight or more digits with common separators.
static LOOSE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d[\d\s\-().]{7,}\d\b").unwrap());

static CREDENTIAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Provider-style keys: sk-..., sk-ant-...
        Regex::new(r"\bsk-[A-Za-z0-9_\-]{8,}").unwrap(),
        // Assignments: token: abc, password=hunter2, api_key = ...
        Regex::new(r"(?i)\b(token|secret|password|passwd|api[_-]?key|key)\s*[=:]\s*\S+").unwrap(),
        // Authorization headers.
        Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._\-]{10,}").unwrap(),
    ]
});

/// What made a text unsafe to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Email,
    Phone,
    Credential,
    HighEntropy,
}

impl SecretKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Credential => "credential",
            Self::HighEntropy => "high_entropy",
        }
    }
}

/// First secret-like content found in `text`, if any.
pub fn detect_secret(text: &str) -> Option<SecretKind> {
    if EMAIL.is_match(text) {
        return Some(SecretKind::Email);
    }
    if US_PHONE.is_match(text) || INTL_PHONE.is_match(text) || LOOSE_PHONE.is_match(text) {
        return Some(SecretKind::Phone);
    }
    if CREDENTIAL_PATTERNS.iter().any(|p| p.is_match(text)) {
        return Some(SecretKind::Credential);
    }
    if text.split_whitespace().any(is_high_entropy_token) {
        return Some(SecretKind::HighEntropy);
    }
    None
}

/// Whether a whitespace-delimited token looks like a random key.
///
/// Requires a minimum length, a mix of letters and digits, and high
/// per-character entropy.
pub fn is_high_entropy_token(token: &str) -> bool {
    let token = token.trim_matches(|c: char| !c.is_alphanumeric());
    if token.chars().count() < ENTROPY_MIN_LEN {
        return false;
    }
    let has_alpha = token.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = token.chars().any(|c| c.is_ascii_digit());
    has_alpha && has_digit && shannon_entropy(token) >= ENTROPY_THRESHOLD
}

/// Shannon entropy of the character distribution, in bits per character.
pub fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
