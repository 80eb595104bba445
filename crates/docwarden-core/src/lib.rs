// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Docwarden.
//!
//! This crate provides the trait definitions, error type, and domain types
//! used throughout the workspace. Every backend (document source, embedder,
//! generator) implements a trait defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DocwardenError, REFUSAL_CONFIDENTIAL, REFUSAL_INJECTION, REFUSAL_NOT_FOUND};
pub use types::{
    AdapterType, Chunk, Citation, Document, EmbeddingInput, EmbeddingOutput, GenerationRequest,
    GenerationResponse, HealthStatus, IngestFailure, IngestReport, Page, RetrievedChunk,
};

pub use traits::{DocumentSource, EmbeddingAdapter, GenerationAdapter, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_renders_exact_grammar() {
        let citation = Citation {
            filename: "test.txt".into(),
            chunk_id: "c12".into(),
            page: 4,
        };
        assert_eq!(citation.to_string(), "[source:test.txt#c12 p=4]");
    }

    #[test]
    fn chunk_citation_copies_identity() {
        let chunk = Chunk {
            chunk_id: "report_1a2b3c4d_p2_0003".into(),
            doc_id: "report_1a2b3c4d".into(),
            filename: "report.md".into(),
            page: 2,
            text: "Revenue grew.".into(),
        };
        assert_eq!(
            chunk.citation().to_string(),
            "[source:report.md#report_1a2b3c4d_p2_0003 p=2]"
        );
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [
            AdapterType::DocumentSource,
            AdapterType::Embedding,
            AdapterType::Generation,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn user_messages_never_leak_details() {
        let errors = [
            DocwardenError::Config("secret path /etc/x".into()),
            DocwardenError::IndexUnavailable("no CURRENT".into()),
            DocwardenError::Generation {
                message: "connection refused at 10.0.0.1".into(),
                source: None,
            },
            DocwardenError::Timeout {
                duration: std::time::Duration::from_secs(30),
            },
            DocwardenError::Internal("boom".into()),
        ];
        for err in &errors {
            let msg = err.user_message();
            assert!(!msg.contains("/etc"));
            assert!(!msg.contains("10.0.0.1"));
            assert!(!msg.contains("boom"));
        }
    }

    #[test]
    fn io_errors_become_storage_errors() {
        let err: DocwardenError = std::io::Error::other("disk full").into();
        assert!(matches!(err, DocwardenError::Storage { .. }));
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_generation_adapter<T: GenerationAdapter>() {}
        fn _assert_document_source<T: DocumentSource>() {}
    }
}
