// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based memory decisions.
//!
//! No model is involved: a turn is first screened for secrets, then matched
//! against the USER table (user and assistant text) and the COMPANY table
//! (user text only).

use docwarden_security::detect_secret;
use tracing::debug;

use crate::rules::{COMPANY_RULES, MemoryRule, USER_RULES};
use crate::types::MemoryDecision;

/// Decide whether a turn carries a durable fact, and where it belongs.
pub fn decide(user_text: &str, assistant_text: &str) -> MemoryDecision {
    let combined = format!("{user_text}\n{assistant_text}");

    if let Some(kind) = detect_secret(&combined) {
        debug!(kind = kind.as_str(), "memory write suppressed: sensitive content");
        return MemoryDecision::none();
    }

    first_match(&USER_RULES, &combined)
        .or_else(|| first_match(&COMPANY_RULES, user_text))
        .unwrap_or_else(MemoryDecision::none)
}

fn first_match(rules: &[MemoryRule], text: &str) -> Option<MemoryDecision> {
    rules.iter().find_map(|rule| {
        rule.apply(text).map(|summary| MemoryDecision {
            should_write: true,
            target: Some(rule.target),
            summary,
            confidence: rule.confidence,
            rule: Some(rule.name),
        })
    })
}
