// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grounded answer generation for Docwarden.
//!
//! The [`Answerer`] builds a citation-constrained prompt, calls a
//! [`GenerationAdapter`](docwarden_core::GenerationAdapter), repairs and
//! validates citations against the retrieved set, retries once with a
//! format reminder, falls back to the top chunk, and finally withholds any
//! answer that leaks contact data.

pub mod answerer;
pub mod citation;
pub mod extractive;
pub mod prompt;

pub use answerer::{AnswerOutcome, Answerer, GroundedAnswer};
pub use citation::{CheckedAnswer, check_citations, extract_citations, repair_citations};
pub use extractive::ExtractiveGenerator;
pub use prompt::PromptBuilder;
