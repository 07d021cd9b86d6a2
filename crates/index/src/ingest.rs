//! Document ingestion.
//!
//! Loads the source document, splits it into overlapping fragments, embeds
//! each fragment, and persists everything in the SQLite store. Ingestion
//! replaces any previously indexed content; the query pipeline never runs
//! concurrently with it.

use crate::chunker::{split_text, SplitConfig};
use crate::embeddings::EmbeddingProvider;
use crate::store::{self, DocumentRecord, Fragment};
use chrono::Utc;
use consulta_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Summary of a completed ingestion run.
#[derive(Debug, Clone)]
pub struct IngestStats {
    /// Number of fragments stored
    pub fragments: u32,

    /// Size of the source document in bytes
    pub document_bytes: u64,
}

/// Ingest a source document into the fragment store at `db_path`.
///
/// # Arguments
/// * `document_path` - Path to the source document (plain text or markdown)
/// * `db_path` - Path to the SQLite fragment store
/// * `embedder` - Embedding provider for fragment vectors
/// * `config` - Chunking parameters
pub async fn ingest_document(
    document_path: &Path,
    db_path: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    config: &SplitConfig,
) -> AppResult<IngestStats> {
    tracing::info!("Ingesting document {:?}", document_path);

    let contents = std::fs::read_to_string(document_path).map_err(|e| {
        AppError::Ingest(format!(
            "Failed to read document {:?}: {}",
            document_path, e
        ))
    })?;

    let chunks = split_text(&contents, config);
    tracing::info!("Split document into {} fragments", chunks.len());

    let embeddings = embedder
        .embed_documents(&chunks)
        .await
        .map_err(|e| AppError::Ingest(format!("Failed to embed fragments: {}", e)))?;

    if embeddings.len() != chunks.len() {
        return Err(AppError::Ingest(format!(
            "Embedding count mismatch: {} fragments, {} embeddings",
            chunks.len(),
            embeddings.len()
        )));
    }

    let conn = store::open_store(db_path)?;
    store::reset_store(&conn)?;

    let document = DocumentRecord {
        id: Uuid::new_v4().to_string(),
        path: document_path.to_path_buf(),
        ingested_at: Utc::now(),
        size_bytes: contents.len() as u64,
    };
    store::insert_document(&conn, &document)?;

    for (position, (text, embedding)) in chunks.into_iter().zip(embeddings).enumerate() {
        let fragment = Fragment {
            id: Uuid::new_v4().to_string(),
            document_id: document.id.clone(),
            position: position as u32,
            text,
            embedding,
        };
        store::insert_fragment(&conn, &fragment)?;
    }

    let (_, fragment_count) = store::get_stats(&conn)?;
    tracing::info!("Ingestion complete: {} fragments stored", fragment_count);

    Ok(IngestStats {
        fragments: fragment_count,
        document_bytes: document.size_bytes,
    })
}
