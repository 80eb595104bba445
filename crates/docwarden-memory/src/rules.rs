// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Priority-ordered memory extraction rules.
//!
//! Each rule is data: a name, a pattern, a target store, a confidence, and a
//! function that turns the match into a summary. Tables are evaluated top to
//! bottom and stop at the first match.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::MemoryTarget;

pub const USER_CONFIDENCE: f64 = 0.9;
pub const COMPANY_CONFIDENCE: f64 = 0.85;

pub struct MemoryRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub target: MemoryTarget,
    pub confidence: f64,
    pub summarize: fn(&Captures<'_>) -> String,
}

impl MemoryRule {
    /// Summary for the first match of this rule in `text`.
    pub fn apply(&self, text: &str) -> Option<String> {
        let caps = self.pattern.captures(text)?;
        let summary = (self.summarize)(&caps);
        let summary = summary.trim();
        (!summary.is_empty()).then(|| summary.to_string())
    }
}

fn user(name: &'static str, pattern: &str, summarize: fn(&Captures<'_>) -> String) -> MemoryRule {
    MemoryRule {
        name,
        pattern: Regex::new(pattern).unwrap(),
        target: MemoryTarget::User,
        confidence: USER_CONFIDENCE,
        summarize,
    }
}

fn company(
    name: &'static str,
    pattern: &str,
    summarize: fn(&Captures<'_>) -> String,
) -> MemoryRule {
    MemoryRule {
        name,
        pattern: Regex::new(pattern).unwrap(),
        target: MemoryTarget::Company,
        confidence: COMPANY_CONFIDENCE,
        summarize,
    }
}

/// Capture `i`, trimmed of whitespace and trailing punctuation.
fn group(caps: &Captures<'_>, i: usize) -> String {
    caps.get(i)
        .map(|m| {
            m.as_str()
                .trim()
                .trim_end_matches(|c: char| c.is_ascii_punctuation())
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Ends a short free-text capture at punctuation, a conjunction, or end of text.
const STOP: &str = r"(?:[.,;!?]|\s+(?:and|but|so|because|who|which)\b|$)";

/// Checked against user and assistant text together.
pub static USER_RULES: LazyLock<Vec<MemoryRule>> = LazyLock::new(|| {
    vec![
        user(
            "name",
            r"(?i)\b(?:my name is|call me)\s+([a-z][a-z'\-]+)",
            |c| format!("User's name is {}", capitalize(&group(c, 1))),
        ),
        user(
            "role_work_as",
            &format!(r"(?i)\bi\s+(?:am\s+|'?m\s+)?work(?:ing)?\s+as\s+(an?\s+)?([a-z][a-z \-]{{1,40}}?){STOP}"),
            |c| match c.get(1) {
                Some(article) => format!(
                    "User works as {} {}",
                    article.as_str().trim().to_lowercase(),
                    group(c, 2).to_lowercase()
                ),
                None => format!("User works as {}", group(c, 2).to_lowercase()),
            },
        ),
        user(
            "role_is",
            &format!(r"(?i)\bmy\s+(?:role|job|title)\s+is\s+(?:an?\s+)?([a-z][a-z \-]{{1,40}}?){STOP}"),
            |c| format!("User's role is {}", group(c, 1).to_lowercase()),
        ),
        user(
            "identity",
            &format!(r"(?i)\bi(?:'m|\s+am)\s+(an?\s+[a-z][a-z \-]{{1,40}}?){STOP}"),
            |c| format!("User is {}", group(c, 1).to_lowercase()),
        ),
        user(
            "prefers_concise",
            r"(?i)\bprefer\b.{0,40}\b(?:concise|brief|short)\b",
            |_| "User prefers concise answers".to_string(),
        ),
        user(
            "prefers_bullets",
            r"(?i)\bprefer\b.{0,40}\bbullet",
            |_| "User prefers bullet point answers".to_string(),
        ),
        user(
            "prefers_steps",
            r"(?i)\bprefer\b.{0,40}\bstep.by.step\b",
            |_| "User prefers step-by-step explanations".to_string(),
        ),
        user(
            "no_explanations",
            r"(?i)\b(?:(?:don'?t|do\s+not)\s+(?:explain|summari[sz]e)|no\s+(?:summary|explanations?|briefing))\b",
            |_| "User prefers answers without extra explanation".to_string(),
        ),
        user(
            "hobby",
            &format!(r"(?i)\bi(?:\s+really)?\s+(?:like|love|enjoy)\s+([a-z][a-z0-9 '\-]{{1,50}}?){STOP}"),
            |c| format!("User enjoys {}", group(c, 1)),
        ),
        user(
            "interest",
            &format!(r"(?i)\bi(?:'m|\s+am)\s+into\s+([a-z][a-z0-9 '\-]{{1,50}}?){STOP}"),
            |c| format!("User enjoys {}", group(c, 1)),
        ),
        user(
            "goal",
            r"(?i)\b(?:preparing|studying|practicing|training)\s+for\s+([^.!?\n]{4,60})",
            |c| format!("User is preparing for: {}", group(c, 1)),
        ),
        user(
            "schedule",
            r"(?i)\b(every\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|morning|evening|day|week|month)\b[^.!?\n]{3,80})",
            |c| format!("User has a recurring schedule: {}", group(c, 1)),
        ),
    ]
});

/// Checked against user text only.
pub static COMPANY_RULES: LazyLock<Vec<MemoryRule>> = LazyLock::new(|| {
    vec![
        company(
            "bottleneck",
            r"(?i)\b(?:our|the)\s+(?:biggest\s+|main\s+)?bottleneck\s+is\s+([^.!?\n]{3,80})",
            |c| format!("Company bottleneck: {}", group(c, 1)),
        ),
        company(
            "team_tool",
            r"(?i)\b(?:our\s+team|the\s+whole\s+team|everyone(?:\s+here)?)\s+uses\s+([^.!?\n]{2,60})",
            |c| format!("Team uses {}", group(c, 1)),
        ),
        company(
            "team_practice",
            r"(?i)\bour\s+team\s+(always|never|follows)\s+([^.!?\n]{3,80})",
            |c| format!("Team practice: {} {}", group(c, 1).to_lowercase(), group(c, 2)),
        ),
        company(
            "we_use",
            r"(?i)\bwe\s+use\s+([^.!?\n]{2,60})",
            |c| format!("Company uses {}", group(c, 1)),
        ),
        company(
            "named_technology",
            r"(?i)\b(jira|confluence|slack|github|gitlab|kubernetes|docker|terraform|snowflake|databricks|airflow|tableau|power\s?bi|salesforce|postgres(?:ql)?|ollama|mistral|bm25)\b",
            |c| format!("Company stack includes {}", group(c, 1).to_lowercase()),
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    fn first(rules: &[MemoryRule], text: &str) -> Option<(&'static str, String)> {
        rules
            .iter()
            .find_map(|r| r.apply(text).map(|s| (r.name, s)))
    }

    #[test]
    fn identity_statement() {
        assert_eq!(
            first(&USER_RULES, "I'm a data analyst"),
            Some(("identity", "User is a data analyst".into()))
        );
        assert_eq!(
            first(&USER_RULES, "I am an SRE and I like hiking"),
            Some(("identity", "User is an sre".into()))
        );
    }

    #[test]
    fn name_is_capitalised() {
        assert_eq!(
            first(&USER_RULES, "hi, my name is durgesh"),
            Some(("name", "User's name is Durgesh".into()))
        );
    }

    #[test]
    fn work_as_keeps_article() {
        assert_eq!(
            first(&USER_RULES, "I work as a product manager at Nexabridge"),
            Some(("role_work_as", "User works as a product manager at nexabridge".into()))
        );
        assert_eq!(
            first(&USER_RULES, "I work as accountant."),
            Some(("role_work_as", "User works as accountant".into()))
        );
    }

    #[test]
    fn preferences() {
        assert_eq!(
            first(&USER_RULES, "I prefer concise answers").unwrap().1,
            "User prefers concise answers"
        );
        assert_eq!(
            first(&USER_RULES, "I prefer answers in bullet points").unwrap().1,
            "User prefers bullet point answers"
        );
        assert_eq!(
            first(&USER_RULES, "please don't explain, just answer").unwrap().0,
            "no_explanations"
        );
    }

    #[test]
    fn hobbies_goals_schedules() {
        assert_eq!(first(&USER_RULES, "I love rock climbing.").unwrap().1, "User enjoys rock climbing");
        assert_eq!(
            first(&USER_RULES, "I'm preparing for the CFA level 2 exam").unwrap().1,
            "User is preparing for: the CFA level 2 exam"
        );
        assert_eq!(
            first(&USER_RULES, "Every Monday I review the pipeline report.").unwrap().1,
            "User has a recurring schedule: Every Monday I review the pipeline report"
        );
    }

    #[test]
    fn company_rules_in_priority_order() {
        assert_eq!(
            first(&COMPANY_RULES, "Our biggest bottleneck is QA sign-off.").unwrap().0,
            "bottleneck"
        );
        assert_eq!(
            first(&COMPANY_RULES, "Our team uses Jira for sprint planning").unwrap(),
            ("team_tool", "Team uses Jira for sprint planning".into())
        );
        assert_eq!(
            first(&COMPANY_RULES, "our team always writes design docs first").unwrap().1,
            "Team practice: always writes design docs first"
        );
        assert_eq!(
            first(&COMPANY_RULES, "We use Snowflake for reporting.").unwrap().0,
            "we_use"
        );
        assert_eq!(
            first(&COMPANY_RULES, "Is the Terraform plan ready?").unwrap().1,
            "Company stack includes terraform"
        );
    }

    #[test]
    fn plain_questions_match_nothing() {
        let q = "What was the FY2024 ARR?";
        assert!(first(&USER_RULES, q).is_none());
        assert!(first(&COMPANY_RULES, q).is_none());
    }
}
