//! Pipeline orchestration.

use crate::detector::LanguageDetector;
use crate::generator::AnswerGenerator;
use crate::translator::AnswerTranslator;
use crate::types::{LanguageCode, Query, QueryResponse};
use consulta_core::AppResult;
use consulta_index::SimilarityIndex;
use consulta_llm::LlmClient;
use consulta_prompt::PromptStore;
use std::sync::Arc;

/// The four-stage query pipeline.
///
/// Owns the per-stage components and the shared read-only index; one
/// instance serves any number of queries.
pub struct QueryPipeline {
    index: Arc<dyn SimilarityIndex>,
    detector: LanguageDetector,
    generator: AnswerGenerator,
    translator: AnswerTranslator,
}

impl QueryPipeline {
    pub fn new(
        index: Arc<dyn SimilarityIndex>,
        gateway: Arc<dyn LlmClient>,
        prompts: Arc<PromptStore>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            index,
            detector: LanguageDetector::new(gateway.clone(), prompts.clone(), model.clone()),
            generator: AnswerGenerator::new(gateway.clone(), prompts.clone(), model.clone()),
            translator: AnswerTranslator::new(gateway, prompts, model),
        }
    }

    /// Process a query, translating into the question's detected language.
    pub async fn process(&self, query: &Query) -> AppResult<QueryResponse> {
        self.process_with_target(query, None).await
    }

    /// Process a query with an explicit target language, skipping detection.
    pub async fn process_with_target(
        &self,
        query: &Query,
        target: Option<LanguageCode>,
    ) -> AppResult<QueryResponse> {
        tracing::info!(user = %query.user_name, "Processing query");

        let fragments = self.index.search(&query.question).await?;
        tracing::debug!("Retrieved {} context fragments", fragments.len());

        let target = match target {
            Some(language) => language,
            None => self.detector.detect(&query.question).await?,
        };
        tracing::debug!(language = %target, "Target language resolved");

        let answer = self.generator.generate(&query.question, &fragments).await?;

        Ok(self
            .translator
            .translate(&query.user_name, &answer, &target)
            .await)
    }
}
