// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama generation backend for Docwarden.
//!
//! This crate implements [`GenerationAdapter`] against a local Ollama server
//! using the native `/api/generate` endpoint with streaming disabled.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use docwarden_config::DocwardenConfig;
use docwarden_core::{
    AdapterType, DocwardenError, GenerationAdapter, GenerationRequest, GenerationResponse,
    HealthStatus, PluginAdapter,
};
use tracing::{debug, info};

use crate::client::OllamaClient;

/// Ollama provider implementing [`GenerationAdapter`].
pub struct OllamaProvider {
    client: OllamaClient,
    model: String,
}

impl OllamaProvider {
    pub fn new(config: &DocwardenConfig) -> Result<Self, DocwardenError> {
        let client = OllamaClient::new(
            &config.ollama.base_url,
            Duration::from_secs(config.generation.timeout_secs),
        )?;
        info!(
            base_url = %config.ollama.base_url,
            model = %config.generation.model,
            "Ollama provider initialized"
        );
        Ok(Self::with_client(client, config.generation.model.clone()))
    }

    pub fn with_client(client: OllamaClient, model: String) -> Self {
        Self { client, model }
    }
}

/// Whether `wanted` is among `installed`, allowing the implicit `:latest` tag.
fn model_installed(installed: &[String], wanted: &str) -> bool {
    installed
        .iter()
        .any(|name| name == wanted || name.strip_suffix(":latest") == Some(wanted))
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, DocwardenError> {
        match self.client.list_models().await {
            Ok(models) if model_installed(&models, &self.model) => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Degraded(format!(
                "model {} is not installed; run `ollama pull {}`",
                self.model, self.model
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), DocwardenError> {
        debug!("Ollama provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for OllamaProvider {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, DocwardenError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let reply = self.client.generate(model, &request.prompt).await?;
        Ok(GenerationResponse {
            text: reply.response.trim().to_string(),
            model: reply.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(server: &MockServer) -> OllamaProvider {
        let toml = format!("[ollama]\nbase_url = \"{}\"\n", server.uri());
        let config = docwarden_config::load_config_from_str(&toml).unwrap();
        OllamaProvider::new(&config).unwrap()
    }

    #[test]
    fn latest_tag_is_implicit() {
        let installed = vec!["mistral:latest".to_string(), "llama3:8b".to_string()];
        assert!(model_installed(&installed, "mistral"));
        assert!(model_installed(&installed, "llama3:8b"));
        assert!(!model_installed(&installed, "llama3"));
    }

    #[tokio::test]
    async fn generate_trims_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "mistral",
                "response": "\n ARR was $148.5 million [source:test.txt#c12 p=4]\n",
                "done": true
            })))
            .mount(&server)
            .await;

        let reply = provider(&server)
            .await
            .generate(GenerationRequest {
                model: "mistral".into(),
                prompt: "q".into(),
            })
            .await
            .unwrap();
        assert_eq!(reply.text, "ARR was $148.5 million [source:test.txt#c12 p=4]");
    }

    #[tokio::test]
    async fn health_reports_missing_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"models": [{"name": "llama3:8b"}]})),
            )
            .mount(&server)
            .await;

        let status = provider(&server).await.health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn health_reports_unreachable_server() {
        let server = MockServer::start().await;
        let provider = provider(&server).await;
        drop(server);
        let status = provider.health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(_)));
    }
}
