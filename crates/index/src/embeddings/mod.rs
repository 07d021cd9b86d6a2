//! Embedding providers for fragment and query vectors.

pub mod cohere;
pub mod trigram;

use consulta_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

pub use cohere::CohereEmbeddings;
pub use trigram::TrigramEmbeddings;

/// Trait for embedding providers.
///
/// Documents and queries are embedded separately: hosted models distinguish
/// the two input purposes, and retrieval quality depends on using the right
/// one.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "cohere", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for a batch of document fragments.
    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a search query.
    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider by name.
///
/// # Arguments
/// * `provider` - Provider identifier ("cohere", "trigram")
/// * `model` - Embedding model identifier
/// * `dimensions` - Expected embedding dimensions
/// * `api_key` - API key (for hosted providers)
/// * `timeout` - Bounded per-call timeout for hosted providers
pub fn create_embedder(
    provider: &str,
    model: &str,
    dimensions: usize,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be at least 1".to_string(),
        ));
    }

    match provider.to_lowercase().as_str() {
        "cohere" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Cohere embeddings require an API key".to_string())
            })?;
            Ok(Arc::new(CohereEmbeddings::new(
                api_key, model, dimensions, timeout,
            )))
        }
        "trigram" => Ok(Arc::new(TrigramEmbeddings::new(dimensions))),
        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: cohere, trigram",
            provider
        ))),
    }
}
