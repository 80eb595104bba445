// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory record types and the one-line file format.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use strum::{Display, EnumString};

/// Which store a fact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum MemoryTarget {
    #[strum(serialize = "USER")]
    User,
    #[strum(serialize = "COMPANY")]
    Company,
}

/// Result of [`crate::engine::decide`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDecision {
    pub should_write: bool,
    /// `None` when nothing should be written.
    pub target: Option<MemoryTarget>,
    pub summary: String,
    pub confidence: f64,
    /// Name of the rule that matched.
    pub rule: Option<&'static str>,
}

impl MemoryDecision {
    pub fn none() -> Self {
        Self {
            should_write: false,
            target: None,
            summary: String::new(),
            confidence: 0.0,
            rule: None,
        }
    }

    /// `USER`, `COMPANY` or `NONE`.
    pub fn target_label(&self) -> String {
        self.target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "NONE".to_string())
    }
}

/// One persisted fact.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub target: MemoryTarget,
    pub summary: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

static RECORD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^- \[([^\]]+)\] \[(USER|COMPANY)\] \[(\d+(?:\.\d+)?)\] (.+)$").unwrap()
});

impl MemoryRecord {
    pub fn new(target: MemoryTarget, summary: impl Into<String>, confidence: f64) -> Self {
        Self {
            target,
            summary: summary.into(),
            confidence,
            timestamp: Utc::now(),
        }
    }

    /// `- [<rfc3339>] [<TARGET>] [<confidence>] <summary>`
    pub fn to_line(&self) -> String {
        format!(
            "- [{}] [{}] [{:.2}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.target,
            self.confidence,
            self.summary.replace('\n', " ")
        )
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = RECORD_LINE.captures(line.trim_end())?;
        Some(Self {
            timestamp: DateTime::parse_from_rfc3339(&caps[1]).ok()?.with_timezone(&Utc),
            target: caps[2].parse().ok()?,
            confidence: caps[3].parse().ok()?,
            summary: caps[4].to_string(),
        })
    }
}

impl fmt::Display for MemoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// What happened to a decided fact, reported to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryWriteEvent {
    pub target: MemoryTarget,
    pub summary: String,
    pub confidence: f64,
    pub status: WriteStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// An existing summary already contains this one.
    Duplicate,
    /// Confidence under the configured minimum.
    BelowThreshold,
}

impl WriteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Duplicate => "duplicate",
            Self::BelowThreshold => "below_threshold",
        }
    }
}
