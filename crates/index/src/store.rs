//! SQLite-backed fragment store.
//!
//! Persists the ingested document's fragments and their embeddings. The
//! store is written only by ingestion; query-time access goes through
//! [`crate::adapter::VectorIndex`], which loads all fragments into memory
//! once at startup.

use chrono::{DateTime, Utc};
use consulta_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// A stored document fragment with its embedding.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub id: String,
    pub document_id: String,
    pub position: u32,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// An ingested source document.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: String,
    pub path: PathBuf,
    pub ingested_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Open the SQLite store, creating tables if needed.
pub fn open_store(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::IndexUnavailable(format!("Failed to create index directory: {}", e))
        })?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to open SQLite store: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            ingested_at TEXT NOT NULL,
            size_bytes INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS fragments (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            FOREIGN KEY (document_id) REFERENCES documents(id)
        );

        CREATE INDEX IF NOT EXISTS idx_fragments_document ON fragments(document_id);
        "#,
    )
    .map_err(|e| AppError::IndexUnavailable(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Opened SQLite store at {:?}", db_path);
    Ok(conn)
}

/// Insert a document record into the store.
pub fn insert_document(conn: &Connection, document: &DocumentRecord) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO documents (id, path, ingested_at, size_bytes)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            document.id,
            document.path.to_string_lossy().to_string(),
            document.ingested_at.to_rfc3339(),
            document.size_bytes as i64,
        ],
    )
    .map_err(|e| AppError::IndexUnavailable(format!("Failed to insert document: {}", e)))?;

    Ok(())
}

/// Insert a fragment with its embedding into the store.
pub fn insert_fragment(conn: &Connection, fragment: &Fragment) -> AppResult<()> {
    let embedding_bytes = embedding_to_bytes(&fragment.embedding);

    conn.execute(
        "INSERT OR REPLACE INTO fragments (id, document_id, position, text, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fragment.id,
            fragment.document_id,
            fragment.position as i64,
            fragment.text,
            embedding_bytes,
        ],
    )
    .map_err(|e| AppError::IndexUnavailable(format!("Failed to insert fragment: {}", e)))?;

    Ok(())
}

/// Load all fragments, ordered by position.
pub fn load_fragments(conn: &Connection) -> AppResult<Vec<Fragment>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, document_id, position, text, embedding
             FROM fragments ORDER BY position",
        )
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to prepare query: {}", e)))?;

    let fragments_iter = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let embedding = bytes_to_embedding(&embedding_bytes)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

            Ok(Fragment {
                id: row.get(0)?,
                document_id: row.get(1)?,
                position: row.get::<_, i64>(2)? as u32,
                text: row.get(3)?,
                embedding,
            })
        })
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to query fragments: {}", e)))?;

    let mut fragments = Vec::new();
    for fragment in fragments_iter {
        fragments.push(fragment.map_err(|e| {
            AppError::IndexUnavailable(format!("Failed to read fragment row: {}", e))
        })?);
    }

    Ok(fragments)
}

/// Get document and fragment counts for the store.
pub fn get_stats(conn: &Connection) -> AppResult<(u32, u32)> {
    let documents_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to count documents: {}", e)))?;

    let fragments_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM fragments", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to count fragments: {}", e)))?;

    Ok((documents_count, fragments_count))
}

/// Reset the store (delete all data).
pub fn reset_store(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM fragments", [])
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to delete fragments: {}", e)))?;

    conn.execute("DELETE FROM documents", [])
        .map_err(|e| AppError::IndexUnavailable(format!("Failed to delete documents: {}", e)))?;

    tracing::info!("Reset fragment store");
    Ok(())
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::IndexUnavailable(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        embedding.push(value);
    }

    Ok(embedding)
}

/// Calculate cosine similarity between two vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_fragment(id: &str, position: u32, embedding: Vec<f32>) -> Fragment {
        Fragment {
            id: id.to_string(),
            document_id: "doc1".to_string(),
            position,
            text: format!("fragmento {}", position),
            embedding,
        }
    }

    #[test]
    fn test_open_store_creates_tables() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = open_store(temp_file.path()).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert!(table_count >= 2); // documents and fragments tables
    }

    #[test]
    fn test_insert_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = open_store(temp_file.path()).unwrap();

        let document = DocumentRecord {
            id: "doc1".to_string(),
            path: PathBuf::from("documento.md"),
            ingested_at: Utc::now(),
            size_bytes: 100,
        };
        insert_document(&conn, &document).unwrap();

        insert_fragment(&conn, &sample_fragment("f2", 1, vec![0.0, 1.0, 0.0])).unwrap();
        insert_fragment(&conn, &sample_fragment("f1", 0, vec![1.0, 0.0, 0.0])).unwrap();

        let fragments = load_fragments(&conn).unwrap();
        assert_eq!(fragments.len(), 2);
        // Ordered by position regardless of insertion order
        assert_eq!(fragments[0].id, "f1");
        assert_eq!(fragments[1].id, "f2");
        assert_eq!(fragments[0].embedding, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_stats_and_reset() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = open_store(temp_file.path()).unwrap();

        let document = DocumentRecord {
            id: "doc1".to_string(),
            path: PathBuf::from("documento.md"),
            ingested_at: Utc::now(),
            size_bytes: 100,
        };
        insert_document(&conn, &document).unwrap();
        insert_fragment(&conn, &sample_fragment("f1", 0, vec![1.0])).unwrap();

        assert_eq!(get_stats(&conn).unwrap(), (1, 1));

        reset_store(&conn).unwrap();
        assert_eq!(get_stats(&conn).unwrap(), (0, 0));
    }

    #[test]
    fn test_embedding_roundtrip() {
        let embedding = vec![0.25, -1.5, 3.75];
        let bytes = embedding_to_bytes(&embedding);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), embedding);

        assert!(bytes_to_embedding(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![1.0, 0.0, 0.0];
        let d = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&c, &d).abs() < 0.001);

        // Zero vector and mismatched lengths are defined
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
