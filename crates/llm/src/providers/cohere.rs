//! Cohere gateway provider implementation.
//!
//! This module integrates with the Cohere chat API.
//! API reference: https://docs.cohere.com/reference/chat

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use consulta_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Cohere API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.cohere.com";

/// Cohere chat API request format.
#[derive(Debug, Serialize)]
struct CohereRequest {
    model: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Cohere chat API response format.
#[derive(Debug, Deserialize)]
struct CohereResponse {
    text: String,
    #[serde(default)]
    meta: Option<CohereMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct CohereMeta {
    #[serde(default)]
    tokens: Option<CohereTokens>,
}

#[derive(Debug, Default, Deserialize)]
struct CohereTokens {
    #[serde(default)]
    input_tokens: Option<f64>,
    #[serde(default)]
    output_tokens: Option<f64>,
}

/// Cohere gateway client.
pub struct CohereClient {
    /// Base URL for the Cohere API
    base_url: String,

    /// API key for authentication
    api_key: String,

    /// HTTP client with a bounded per-call timeout
    client: reqwest::Client,
}

impl CohereClient {
    /// Create a new Cohere client with the default endpoint.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    /// Create a new Cohere client with a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Convert LlmRequest to Cohere chat format.
    fn to_cohere_request(&self, request: &LlmRequest) -> CohereRequest {
        CohereRequest {
            model: request.model.clone(),
            message: request.prompt.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert Cohere response to LlmResponse.
    fn convert_response(&self, response: CohereResponse, model: &str) -> LlmResponse {
        let tokens = response
            .meta
            .and_then(|m| m.tokens)
            .unwrap_or_default();

        LlmResponse {
            content: response.text,
            model: model.to_string(),
            usage: LlmUsage::new(
                tokens.input_tokens.unwrap_or(0.0) as u32,
                tokens.output_tokens.unwrap_or(0.0) as u32,
            ),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for CohereClient {
    fn provider_name(&self) -> &str {
        "cohere"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Cohere");
        tracing::debug!("Model: {}, prompt bytes: {}", request.model, request.prompt.len());

        let cohere_request = self.to_cohere_request(request);
        let url = format!("{}/v1/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&cohere_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Gateway(format!("Cohere request timed out: {}", e))
                } else {
                    AppError::Gateway(format!("Failed to send request to Cohere: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Gateway(format!(
                "Cohere API error ({}): {}",
                status, error_text
            )));
        }

        let cohere_response: CohereResponse = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to parse Cohere response: {}", e)))?;

        tracing::info!("Received completion from Cohere");

        Ok(self.convert_response(cohere_response, &request.model))
    }
}
