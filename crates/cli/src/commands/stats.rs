//! Stats command handler.
//!
//! Shows what the fragment store currently holds.

use clap::Args;
use consulta_core::{config::AppConfig, AppResult};
use consulta_index::store::{get_stats, open_store};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index_path = config.index_path();
        if !index_path.exists() {
            println!("No index found. Run 'consulta ingest' first.");
            return Ok(());
        }

        let conn = open_store(&index_path)?;
        let (documents, fragments) = get_stats(&conn)?;

        if self.json {
            let output = serde_json::json!({
                "indexPath": index_path,
                "documents": documents,
                "fragments": fragments,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Index: {:?}", index_path);
            println!("Documents: {}", documents);
            println!("Fragments: {}", fragments);
        }

        Ok(())
    }
}
