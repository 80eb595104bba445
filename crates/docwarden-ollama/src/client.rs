// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a local Ollama server.
//!
//! Provides [`OllamaClient`] which sends non-streaming generate requests,
//! lists installed models, and retries once on transient errors.

use std::time::Duration;

use docwarden_core::DocwardenError;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, GenerateOptions, GenerateRequest, GenerateResponse, TagsResponse,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

fn generation_error(message: String, source: Option<reqwest::Error>) -> DocwardenError {
    DocwardenError::Generation {
        message,
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DocwardenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| generation_error(format!("failed to build HTTP client: {e}"), Some(e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One complete, non-streaming generation.
    ///
    /// On transient errors (429, 500, 502, 503), retries once after a
    /// 1-second delay.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<GenerateResponse, DocwardenError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: Some(GenerateOptions { temperature: 0.0 }),
        };

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generate request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    generation_error(
                        format!("could not reach Ollama at {}: {e}", self.base_url),
                        Some(e),
                    )
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "generate response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| {
                    generation_error(format!("failed to read response body: {e}"), Some(e))
                })?;
                let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
                    DocwardenError::Generation {
                        message: format!("failed to parse Ollama response: {e}"),
                        source: Some(Box::new(e)),
                    }
                })?;
                if parsed.response.trim().is_empty() {
                    return Err(generation_error(
                        format!("Ollama returned an empty response for model {model}"),
                        None,
                    ));
                }
                return Ok(parsed);
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(generation_error(format!("Ollama returned {status}: {body}"), None));
                continue;
            }

            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!("Ollama error ({status}): {}", api_err.error),
                Err(_) => format!("Ollama returned {status}: {body}"),
            };
            return Err(generation_error(message, None));
        }

        Err(last_error.unwrap_or_else(|| {
            generation_error("generate request failed after retries".into(), None)
        }))
    }

    /// Names of locally installed models.
    pub async fn list_models(&self) -> Result<Vec<String>, DocwardenError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            generation_error(format!("could not reach Ollama at {}: {e}", self.base_url), Some(e))
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(generation_error(format!("Ollama tags returned {status}"), None));
        }
        let tags: TagsResponse = response.json().await.map_err(|e| {
            generation_error(format!("failed to parse model list: {e}"), Some(e))
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Returns true for HTTP status codes worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OllamaClient {
        OllamaClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn generate_sends_non_streaming_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(
                serde_json::json!({"model": "mistral", "prompt": "hello", "stream": false}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "mistral",
                "response": "Hi there",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server).generate("mistral", "hello").await.unwrap();
        assert_eq!(reply.response, "Hi there");
        assert!(reply.done);
    }

    #[tokio::test]
    async fn generate_retries_on_503() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "mistral",
                "response": "after retry",
                "done": true
            })))
            .mount(&server)
            .await;

        let reply = client(&server).generate("mistral", "q").await.unwrap();
        assert_eq!(reply.response, "after retry");
    }

    #[tokio::test]
    async fn missing_model_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model 'llama9' not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).generate("llama9", "q").await.unwrap_err();
        assert!(matches!(err, DocwardenError::Generation { .. }));
        assert!(err.to_string().contains("not found"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_response_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "mistral",
                "response": "  ",
                "done": true
            })))
            .mount(&server)
            .await;

        assert!(client(&server).generate("mistral", "q").await.is_err());
    }

    #[tokio::test]
    async fn lists_installed_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "mistral:latest"}, {"name": "llama3:8b"}]
            })))
            .mount(&server)
            .await;

        let models = client(&server).list_models().await.unwrap();
        assert_eq!(models, vec!["mistral:latest", "llama3:8b"]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }
}
