// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redaction for log output.
//!
//! Queries, answers, and memory summaries are logged at debug level; this
//! keeps credentials and contact data out of the log sink.

use std::io::Write;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

use crate::sensitive::{EMAIL, INTL_PHONE, US_PHONE};

static CREDENTIAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"sk-[a-zA-Z0-9_\-]{20,}").unwrap(),
        Regex::new(r"Bearer\s+[a-zA-Z0-9._\-]{10,}").unwrap(),
        Regex::new(r"(?i)\b(token|secret|password|api[_-]?key)(\s*[=:]\s*)\S+").unwrap(),
    ]
});

const REDACTED: &str = "[REDACTED]";

/// Replace credentials, contact data, and any `extra_values` in `input`.
pub fn redact(input: &str, extra_values: &[String]) -> String {
    let mut result = input.to_string();

    for pattern in CREDENTIAL_PATTERNS.iter() {
        result = pattern.replace_all(&result, REDACTED).into_owned();
    }
    for pattern in [&*EMAIL, &*US_PHONE, &*INTL_PHONE] {
        result = pattern.replace_all(&result, REDACTED).into_owned();
    }

    // Longest first so a value containing another is replaced whole.
    let mut values: Vec<&String> = extra_values.iter().filter(|v| !v.is_empty()).collect();
    values.sort_by_key(|v| std::cmp::Reverse(v.len()));
    for value in values {
        result = result.replace(value.as_str(), REDACTED);
    }

    result
}

/// A `Write` wrapper that redacts every buffer before forwarding it.
///
/// Usable directly as a `tracing_subscriber` writer through a closure:
/// `.with_writer(move || RedactingWriter::new(std::io::stderr(), values.clone()))`.
pub struct RedactingWriter<W> {
    inner: W,
    extra_values: Arc<RwLock<Vec<String>>>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, extra_values: Arc<RwLock<Vec<String>>>) -> Self {
        Self {
            inner,
            extra_values,
        }
    }

    /// Register an additional literal to redact, such as a configured path or key.
    pub fn add_value(extra_values: &Arc<RwLock<Vec<String>>>, value: String) {
        if let Ok(mut values) = extra_values.write()
            && !values.contains(&value)
        {
            values.push(value);
        }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let input = String::from_utf8_lossy(buf);
        let values = self
            .extra_values
            .read()
            .map(|v| v.clone())
            .unwrap_or_default();
        self.inner.write_all(redact(&input, &values).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
