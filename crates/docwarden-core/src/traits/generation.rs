// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for language-model backends.

use async_trait::async_trait;

use crate::error::DocwardenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationRequest, GenerationResponse};

/// A language-model backend that turns a prompt into text.
///
/// The call is a single blocking completion; callers bound it with a timeout.
/// Output is untrusted until it has passed citation validation and the
/// output safety filter.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DocwardenError>;
}
