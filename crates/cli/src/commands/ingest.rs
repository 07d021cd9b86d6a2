//! Ingest command handler.
//!
//! Splits the source document into fragments, embeds them, and replaces
//! the contents of the fragment store.

use clap::Args;
use consulta_core::{config::AppConfig, AppError, AppResult};
use consulta_index::{create_embedder, ingest_document, SplitConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Ingest a document into the similarity index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Path to the document (falls back to the configured document)
    pub document: Option<PathBuf>,

    /// Fragment size in characters
    #[arg(long, default_value = "512")]
    pub chunk_size: usize,

    /// Overlap between consecutive fragments, in characters
    #[arg(long, default_value = "128")]
    pub chunk_overlap: usize,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        config.validate()?;

        let document = self
            .document
            .clone()
            .or_else(|| config.document.clone())
            .ok_or_else(|| {
                AppError::Config(
                    "No document given. Pass a path or set index.document in the config file"
                        .to_string(),
                )
            })?;

        let embedder = create_embedder(
            &config.embedding_provider,
            &config.embedding_model,
            config.embedding_dimensions,
            config.resolve_api_key().as_deref(),
            Duration::from_secs(config.gateway_timeout_secs),
        )?;

        let split_config = SplitConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        };

        let stats =
            ingest_document(&document, &config.index_path(), embedder, &split_config).await?;

        println!(
            "Ingested {:?}: {} fragments ({} bytes)",
            document, stats.fragments, stats.document_bytes
        );

        Ok(())
    }
}
