//! Gateway provider factory.
//!
//! This module provides a factory for creating gateway clients based on
//! application configuration. It handles provider resolution and secret
//! injection.

use crate::client::LlmClient;
use crate::providers::{CohereClient, OllamaClient};
use consulta_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create a gateway client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("cohere", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (for providers that require it)
/// * `timeout` - Bounded per-call timeout for gateway round-trips
///
/// # Errors
/// Returns an error if the provider is unknown or required secrets are
/// missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "cohere" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Cohere provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => CohereClient::with_base_url(url, api_key, timeout),
                None => CohereClient::new(api_key, timeout),
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url, timeout);
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
