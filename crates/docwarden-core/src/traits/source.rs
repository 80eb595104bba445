// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document source trait.

use async_trait::async_trait;

use crate::error::DocwardenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::IngestReport;

/// Loads a document collection into page-level text.
///
/// Unreadable files are reported in [`IngestReport::failures`] rather than
/// failing the whole load.
#[async_trait]
pub trait DocumentSource: PluginAdapter {
    async fn load(&self) -> Result<IngestReport, DocwardenError>;
}
