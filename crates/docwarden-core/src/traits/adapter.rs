// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all pluggable backends implement.

use async_trait::async_trait;

use crate::error::DocwardenError;
use crate::types::{AdapterType, HealthStatus};

/// Identity and lifecycle shared by document sources, embedders and generators.
///
/// `name()` is persisted in index metadata for embedders, so it must stay
/// stable across releases for indexes to remain loadable.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Stable identifier, e.g. `hashing-embedder` or `ollama`.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Reports whether the backend can serve requests right now.
    async fn health_check(&self) -> Result<HealthStatus, DocwardenError>;

    async fn shutdown(&self) -> Result<(), DocwardenError>;
}
