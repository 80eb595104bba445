// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Docwarden integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without a model server or downloaded weights.
//!
//! # Components
//!
//! - [`MockGenerator`] - Generation backend with queued replies and failure injection
//! - [`CountingEmbedder`] - Hashing embedder that counts calls
//! - [`TestHarness`] - Full turn pipeline over in-memory chunks

pub mod counting_embedder;
pub mod harness;
pub mod mock_generator;

pub use counting_embedder::CountingEmbedder;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_generator::MockGenerator;
