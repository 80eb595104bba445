// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations behind the `docwarden` binary.

pub mod runtime;
pub mod selfcheck;
pub mod shell;

pub use runtime::Runtime;
