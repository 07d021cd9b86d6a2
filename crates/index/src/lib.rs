//! Similarity index crate for the Consulta service.
//!
//! This crate owns everything between a source document and a queryable
//! similarity index:
//! - Splitting the document into overlapping text fragments
//! - Embedding fragments via a pluggable provider
//! - Persisting fragments in a SQLite store
//! - Serving concurrent read-only similarity searches over the loaded index
//!
//! The index is populated once by ingestion and never mutated during query
//! processing; the query pipeline only sees the [`SimilarityIndex`] trait.

pub mod adapter;
pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod store;

// Re-export main types
pub use adapter::{SimilarityIndex, VectorIndex};
pub use chunker::{split_text, SplitConfig};
pub use embeddings::{create_embedder, EmbeddingProvider};
pub use ingest::{ingest_document, IngestStats};
pub use store::Fragment;
