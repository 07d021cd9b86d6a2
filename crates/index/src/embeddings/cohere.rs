//! Cohere embedding provider.
//!
//! API reference: https://docs.cohere.com/reference/embed

use crate::embeddings::EmbeddingProvider;
use consulta_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Cohere API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.cohere.com";

/// Cohere embed API request format.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: &'a str,
}

/// Cohere embed API response format.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Hosted Cohere embedding provider.
#[derive(Debug)]
pub struct CohereEmbeddings {
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl CohereEmbeddings {
    /// Create a new Cohere embeddings client with the default endpoint.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, model, dimensions, timeout)
    }

    /// Create a new Cohere embeddings client with a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Call the embed endpoint with the given input purpose.
    async fn embed(&self, texts: &[String], input_type: &str) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            texts,
            input_type,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Gateway(format!("Cohere embed request timed out: {}", e))
                } else {
                    AppError::Gateway(format!("Failed to send embed request to Cohere: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Gateway(format!(
                "Cohere embed API error ({}): {}",
                status, error_text
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            AppError::Gateway(format!("Failed to parse Cohere embed response: {}", e))
        })?;

        Ok(embed_response.embeddings)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CohereEmbeddings {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        tracing::info!("Embedding {} fragments via Cohere", texts.len());
        self.embed(texts, "search_document").await
    }

    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut embeddings = self.embed(&[text.to_string()], "search_query").await?;
        embeddings
            .pop()
            .ok_or_else(|| AppError::Gateway("Cohere returned no query embedding".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohere_embeddings_creation() {
        let provider =
            CohereEmbeddings::new("test-key", "embed-english-v3.0", 1024, Duration::from_secs(30));
        assert_eq!(provider.provider_name(), "cohere");
        assert_eq!(provider.model_name(), "embed-english-v3.0");
        assert_eq!(provider.dimensions(), 1024);
    }
}
