// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic long-term memory for Docwarden.
//!
//! Facts about the user and the organisation are extracted with ordered
//! regex rules (no model involved), screened for secrets, deduplicated and
//! appended to human-readable markdown files.
//!
//! ## Architecture
//!
//! - **rules**: priority-ordered USER and COMPANY rule tables
//! - **engine**: `decide(user_text, assistant_text)`
//! - **store**: `MemoryStore` trait, file-backed and in-memory stores
//! - **ledger**: threshold policy and routing to the target store

pub mod engine;
pub mod ledger;
pub mod rules;
pub mod store;
pub mod types;

pub use engine::decide;
pub use ledger::MemoryLedger;
pub use store::{FileMemoryStore, InMemoryStore, MemoryStore};
pub use types::*;
