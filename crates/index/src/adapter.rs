//! Similarity search adapter.
//!
//! [`SimilarityIndex`] is the only surface the query pipeline sees: free
//! text in, relevance-ranked fragments out. [`VectorIndex`] implements it
//! over the fragments loaded from the SQLite store.

use crate::embeddings::EmbeddingProvider;
use crate::store::{self, Fragment};
use consulta_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

/// Similarity search over the ingested document.
///
/// Implementations must be safe for concurrent read-only queries: the index
/// is populated once at startup and never mutated during query processing.
#[async_trait::async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Return the fragments most semantically similar to `query_text`,
    /// ordered by relevance.
    ///
    /// The query is passed through without validation; empty input is
    /// allowed. Zero results is a valid outcome, not an error.
    async fn search(&self, query_text: &str) -> AppResult<Vec<String>>;
}

/// In-memory vector index backed by the SQLite fragment store.
pub struct VectorIndex {
    fragments: Vec<Fragment>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl VectorIndex {
    /// Open the index from the fragment store at `db_path`.
    ///
    /// A missing store means the document was never ingested; that surfaces
    /// as `IndexUnavailable` here rather than as a crash at query time.
    pub fn open(
        db_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> AppResult<Self> {
        if !db_path.exists() {
            return Err(AppError::IndexUnavailable(format!(
                "No index found at {:?}. Run 'consulta ingest' first.",
                db_path
            )));
        }

        let conn = store::open_store(db_path)?;
        let fragments = store::load_fragments(&conn)?;

        tracing::info!("Loaded {} fragments from {:?}", fragments.len(), db_path);

        Ok(Self {
            fragments,
            embedder,
            top_k,
        })
    }

    /// Build an index directly from fragments, without a backing store.
    pub fn from_fragments(
        fragments: Vec<Fragment>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            fragments,
            embedder,
            top_k,
        }
    }

    /// Number of fragments in the index.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

#[async_trait::async_trait]
impl SimilarityIndex for VectorIndex {
    async fn search(&self, query_text: &str) -> AppResult<Vec<String>> {
        if self.fragments.is_empty() {
            tracing::debug!("Similarity search over empty index");
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed_query(query_text)
            .await
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to embed query: {}", e)))?;

        let mut scored: Vec<(&Fragment, f32)> = self
            .fragments
            .iter()
            .map(|fragment| {
                let score = store::cosine_similarity(&query_embedding, &fragment.embedding);
                (fragment, score)
            })
            .collect();

        // Sort by score descending
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.top_k);

        tracing::debug!(
            "Retrieved {} fragments (top score {:.3})",
            scored.len(),
            scored.first().map(|(_, s)| *s).unwrap_or(0.0)
        );

        Ok(scored
            .into_iter()
            .map(|(fragment, _)| fragment.text.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramEmbeddings;

    async fn build_index(texts: &[&str], top_k: usize) -> VectorIndex {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TrigramEmbeddings::new(384));
        let embeddings = embedder
            .embed_documents(&texts.iter().map(|t| t.to_string()).collect::<Vec<_>>())
            .await
            .unwrap();

        let fragments = texts
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, embedding))| Fragment {
                id: format!("f{}", i),
                document_id: "doc1".to_string(),
                position: i as u32,
                text: text.to_string(),
                embedding,
            })
            .collect();

        VectorIndex::from_fragments(fragments, embedder, top_k)
    }

    #[tokio::test]
    async fn test_search_ranks_relevant_fragment_first() {
        let index = build_index(
            &[
                "El gato duerme en la cocina durante la tarde.",
                "La torre mide cincuenta metros de altura.",
                "Las recetas tradicionales llevan aceite de oliva.",
            ],
            3,
        )
        .await;

        let results = index.search("¿Cuánto mide la torre?").await.unwrap();
        assert!(!results.is_empty());
        assert!(results[0].contains("torre"));
    }

    #[tokio::test]
    async fn test_search_respects_top_k() {
        let index = build_index(
            &["uno dos tres", "cuatro cinco seis", "siete ocho nueve"],
            2,
        )
        .await;

        let results = index.search("uno dos").await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_fragments() {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TrigramEmbeddings::new(384));
        let index = VectorIndex::from_fragments(Vec::new(), embedder, 4);

        let results = index.search("cualquier pregunta").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_passes_through() {
        // No input validation: an empty question still gets a search
        let index = build_index(&["fragmento de prueba"], 4).await;
        let results = index.search("").await;
        assert!(results.is_ok());
    }

    #[test]
    fn test_open_missing_store_is_index_unavailable() {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(TrigramEmbeddings::new(384));
        let result = VectorIndex::open(Path::new("/nonexistent/index.db"), embedder, 4);

        match result {
            Err(AppError::IndexUnavailable(msg)) => assert!(msg.contains("consulta ingest")),
            other => panic!("Expected IndexUnavailable, got {:?}", other.map(|_| ())),
        }
    }
}
