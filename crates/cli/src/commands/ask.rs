//! Ask command handler.
//!
//! Runs one question through the full query pipeline: similarity search,
//! language detection, grounded generation, and translation.

use clap::Args;
use consulta_core::{config::AppConfig, AppResult};
use consulta_index::{create_embedder, VectorIndex};
use consulta_llm::create_client;
use consulta_pipeline::{LanguageCode, Query, QueryPipeline};
use consulta_prompt::PromptStore;
use std::sync::Arc;
use std::time::Duration;

/// Ask a question against the ingested document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Name attributed to the asker, echoed in the response
    #[arg(short, long, default_value = "anonymous")]
    pub user: String,

    /// Target language for the answer (skips detection)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        config.validate()?;

        let timeout = Duration::from_secs(config.gateway_timeout_secs);
        let api_key = config.resolve_api_key();

        // Builtin prompt templates, plus any overrides in .consulta/prompts/
        let mut prompts = PromptStore::builtin()?;
        let prompts_dir = config.prompts_dir();
        if prompts_dir.is_dir() {
            let loaded = prompts.load_overrides(&prompts_dir)?;
            tracing::debug!("Loaded {} prompt overrides from {:?}", loaded, prompts_dir);
        }

        let embedder = create_embedder(
            &config.embedding_provider,
            &config.embedding_model,
            config.embedding_dimensions,
            api_key.as_deref(),
            timeout,
        )?;

        let index = VectorIndex::open(&config.index_path(), embedder, config.top_k)?;
        tracing::debug!("Index ready with {} fragments", index.fragment_count());

        let gateway = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            api_key.as_deref(),
            timeout,
        )?;

        let pipeline = QueryPipeline::new(
            Arc::new(index),
            gateway,
            Arc::new(prompts),
            config.model.clone(),
        );

        let query = Query::new(&self.user, &self.question);
        let target = self
            .language
            .as_deref()
            .map(LanguageCode::normalize);

        let response = pipeline.process_with_target(&query, target).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        } else {
            println!("{}", response.answer);
        }

        Ok(())
    }
}
