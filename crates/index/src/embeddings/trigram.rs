//! Trigram embedding provider for local, offline operation.

use crate::embeddings::EmbeddingProvider;
use consulta_core::AppResult;

/// Trigram-based embedding provider.
///
/// Generates deterministic embeddings from character trigrams and word
/// frequencies. Not semantically accurate like a neural model, but the
/// vectors are consistent and content-dependent, which is enough for
/// development, tests, and offline use.
#[derive(Debug)]
pub struct TrigramEmbeddings {
    dimensions: usize,
}

impl TrigramEmbeddings {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Generate a trigram-based embedding for text.
    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .collect();

        let mut word_freq = std::collections::HashMap::new();
        for word in &words {
            *word_freq.entry(*word).or_insert(0) += 1;
        }

        // Map each unique word to multiple dimensions based on character
        // trigrams plus the whole word
        for (word, freq) in word_freq.iter() {
            let chars: Vec<char> = word.chars().collect();
            for i in 0..chars.len().saturating_sub(2) {
                let trigram = format!("{}{}{}", chars[i], chars[i + 1], chars[i + 2]);
                let trigram_hash = trigram
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));

                let dim_idx = (trigram_hash as usize) % self.dimensions;
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let base_dim = (word_hash as usize) % self.dimensions;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramEmbeddings {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_documents(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.generate_embedding(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(self.generate_embedding(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_dimensions() {
        let provider = TrigramEmbeddings::new(384);
        let embedding = provider.embed_query("the tower is tall").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }

    #[tokio::test]
    async fn test_embedding_deterministic() {
        let provider = TrigramEmbeddings::new(384);
        let a = provider.embed_query("la torre mide 50 metros").await.unwrap();
        let b = provider.embed_query("la torre mide 50 metros").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let provider = TrigramEmbeddings::new(384);
        let a = provider.embed_query("la torre mide 50 metros").await.unwrap();
        let b = provider.embed_query("el gato duerme en la cocina").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = TrigramEmbeddings::new(16);
        let embedding = provider.embed_query("").await.unwrap();
        assert!(embedding.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let provider = TrigramEmbeddings::new(128);
        let batch = provider
            .embed_documents(&["una frase de prueba".to_string()])
            .await
            .unwrap();
        let single = provider.embed_query("una frase de prueba").await.unwrap();
        assert_eq!(batch[0], single);
    }
}
