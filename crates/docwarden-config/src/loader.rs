// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./docwarden.toml` > `~/.config/docwarden/docwarden.toml` >
//! `/etc/docwarden/docwarden.toml`, with `DOCWARDEN_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DocwardenConfig;

const SYSTEM_CONFIG: &str = "/etc/docwarden/docwarden.toml";
const LOCAL_CONFIG: &str = "docwarden.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/docwarden/docwarden.toml`
/// 3. `~/.config/docwarden/docwarden.toml`
/// 4. `./docwarden.toml`
/// 5. `DOCWARDEN_*` environment variables
pub fn load_config() -> Result<DocwardenConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DocwardenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DocwardenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DocwardenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DocwardenConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DocwardenConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("docwarden/docwarden.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `DOCWARDEN_INGEST_SOURCE_DIR` is `ingest.source_dir`, not
/// `ingest.source.dir`.
fn env_provider() -> Env {
    Env::prefixed("DOCWARDEN_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &[
        "agent",
        "ingest",
        "chunking",
        "embedding",
        "index",
        "retrieval",
        "answer",
        "generation",
        "ollama",
        "memory",
    ];

    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections_without_splitting_field_names() {
        assert_eq!(map_env_key("ingest_source_dir"), "ingest.source_dir");
        assert_eq!(map_env_key("ollama_base_url"), "ollama.base_url");
        assert_eq!(
            map_env_key("answer_max_citation_retries"),
            "answer.max_citation_retries"
        );
        assert_eq!(map_env_key("memory_enabled"), "memory.enabled");
    }

    #[test]
    fn unknown_env_section_is_left_alone() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }

    #[test]
    fn env_override_reaches_nested_field() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DOCWARDEN_GENERATION_MODEL", "llama3");
            jail.set_env("DOCWARDEN_RETRIEVAL_TOP_K", "8");
            let config: DocwardenConfig = Figment::new()
                .merge(Serialized::defaults(DocwardenConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.generation.model, "llama3");
            assert_eq!(config.retrieval.top_k, 8);
            Ok(())
        });
    }
}
