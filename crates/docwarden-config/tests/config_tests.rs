// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Docwarden configuration system.

use docwarden_config::diagnostic::ConfigError;
use docwarden_config::model::{DocwardenConfig, EmbeddingBackend, GenerationBackend};
use docwarden_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// A fully specified file deserializes into every section.
#[test]
fn full_toml_deserializes() {
    let toml = r#"
[agent]
name = "warden"
log_level = "debug"

[ingest]
source_dir = "/srv/docs"
extensions = ["txt"]

[chunking]
max_chars = 800
overlap_chars = 120

[embedding]
backend = "onnx"
data_dir = "/var/lib/docwarden"
batch_size = 32

[index]
artifacts_dir = "/var/lib/docwarden/index"

[retrieval]
top_k = 4
candidate_multiplier = 2
rrf_k = 30.0

[answer]
max_context_chunks = 3
max_chunk_chars = 900
max_citation_retries = 2

[generation]
backend = "extractive"
model = "llama3"
timeout_secs = 10

[ollama]
base_url = "http://gpu-box:11434"

[memory]
enabled = false
user_store_path = "/tmp/u.md"
company_store_path = "/tmp/c.md"
min_confidence = 0.9
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "warden");
    assert_eq!(config.ingest.extensions, vec!["txt"]);
    assert_eq!(config.chunking.max_chars, 800);
    assert_eq!(config.embedding.backend, EmbeddingBackend::Onnx);
    assert_eq!(config.embedding.data_dir.as_deref(), Some("/var/lib/docwarden"));
    assert_eq!(config.retrieval.rrf_k, 30.0);
    assert_eq!(config.answer.max_citation_retries, 2);
    assert_eq!(config.generation.backend, GenerationBackend::Extractive);
    assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
    assert!(!config.memory.enabled);
}

/// An empty file yields the offline-ready defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "docwarden");
    assert_eq!(config.chunking.max_chars, 500);
    assert_eq!(config.chunking.overlap_chars, 100);
    assert_eq!(config.embedding.backend, EmbeddingBackend::Hash);
    assert_eq!(config.embedding.batch_size, 64);
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.retrieval.candidate_multiplier, 3);
    assert_eq!(config.retrieval.rrf_k, 60.0);
    assert_eq!(config.answer.max_context_chunks, 5);
    assert_eq!(config.answer.max_chunk_chars, 1200);
    assert_eq!(config.answer.max_citation_retries, 1);
    assert_eq!(config.generation.model, "mistral");
    assert_eq!(config.memory.user_store_path, "USER_MEMORY.md");
    assert_eq!(config.memory.company_store_path, "COMPANY_MEMORY.md");
    assert_eq!(config.memory.min_confidence, 0.8);
}

#[test]
fn unknown_key_in_section_is_rejected() {
    let toml = r#"
[chunking]
max_char = 400
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let msg = err.to_string();
    assert!(
        msg.contains("unknown field") || msg.contains("max_char"),
        "error should mention the bad key, got: {msg}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    assert!(load_config_from_str("[telemetry]\nenabled = true\n").is_err());
}

/// Unknown keys carry a "did you mean" suggestion.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = "[retrieval]\ntop_kk = 3\n";
    let errors = load_and_validate_str(toml).expect_err("should fail");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key,
                suggestion,
                ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("an UnknownKey diagnostic");
    assert_eq!(unknown.0, "top_kk");
    assert_eq!(unknown.1.as_deref(), Some("top_k"));
}

#[test]
fn unknown_backend_is_reported_with_choices() {
    let toml = "[generation]\nbackend = \"openai\"\n";
    let errors = load_and_validate_str(toml).expect_err("should fail");
    let rendered = errors
        .iter()
        .map(|e| format!("{e} {:?}", miette::Diagnostic::help(e).map(|h| h.to_string())))
        .collect::<String>();
    assert!(rendered.contains("ollama"), "got: {rendered}");
    assert!(rendered.contains("extractive"), "got: {rendered}");
}

#[test]
fn wrong_type_is_reported_as_invalid_type() {
    let toml = "[retrieval]\ntop_k = \"five\"\n";
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key == "retrieval.top_k")),
        "got: {errors:?}"
    );
}

#[test]
fn semantic_violations_surface_from_load_and_validate() {
    let toml = r#"
[chunking]
max_chars = 50
overlap_chars = 80
"#;
    let errors = load_and_validate_str(toml).expect_err("overlap too large");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn explicit_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docwarden.toml");
    std::fs::write(&path, "[retrieval]\ntop_k = 9\n").unwrap();

    let config = load_and_validate_path(&path).expect("valid file");
    assert_eq!(config.retrieval.top_k, 9);
}

#[test]
fn serialized_defaults_round_trip_through_figment() {
    use figment::{Figment, providers::Serialized};

    let config: DocwardenConfig = Figment::new()
        .merge(Serialized::defaults(DocwardenConfig::default()))
        .merge(("ingest.source_dir", "/override"))
        .extract()
        .expect("dotted override should apply");
    assert_eq!(config.ingest.source_dir, "/override");
}
