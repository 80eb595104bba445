// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security layers for Docwarden.
//!
//! - [`gate`]: blocks injection and classified-data queries before retrieval.
//! - [`sensitive`]: detects contact data in outgoing answers.
//! - [`secrets`]: rejects credential-like text before it reaches memory.
//! - [`redact`]: scrubs the same material from log output.

pub mod gate;
pub mod redact;
pub mod secrets;
pub mod sensitive;

pub use gate::{BlockReason, GateDecision, SecurityGate};
pub use redact::{RedactingWriter, redact};
pub use secrets::{SecretKind, detect_secret};
pub use sensitive::{SensitiveKind, contains_sensitive, find_sensitive};
