//! Answer translation with graceful degradation.
//!
//! Rewrites the generated Spanish answer into the target language via a
//! few-shot prompt. This is the only stage that recovers locally: whatever
//! goes wrong, the caller always receives the structured response shape,
//! with the untranslated answer substituted on failure.

use crate::types::{ends_with_emoji, trailing_emoji_run, LanguageCode, QueryResponse};
use consulta_core::AppResult;
use consulta_llm::{LlmClient, LlmRequest};
use consulta_prompt::{ids, render_prompt, PromptStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Answer translator backed by the gateway.
pub struct AnswerTranslator {
    gateway: Arc<dyn LlmClient>,
    prompts: Arc<PromptStore>,
    model: String,
}

impl AnswerTranslator {
    pub fn new(
        gateway: Arc<dyn LlmClient>,
        prompts: Arc<PromptStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            prompts,
            model: model.into(),
        }
    }

    /// Translate `answer` into `target`, returning the terminal response.
    ///
    /// Never fails: on any gateway or prompt error the original answer is
    /// returned untranslated, and the failure is logged distinctly from
    /// success. When the target equals the base generation language the
    /// gateway may return the text unchanged, which is acceptable.
    pub async fn translate(
        &self,
        user_name: &str,
        answer: &str,
        target: &LanguageCode,
    ) -> QueryResponse {
        match self.try_translate(answer, target).await {
            Ok(translated) => QueryResponse {
                user_name: user_name.to_string(),
                answer: translated,
            },
            Err(e) => {
                tracing::warn!(
                    "Translation to '{}' failed, returning untranslated answer: {}",
                    target,
                    e
                );
                QueryResponse {
                    user_name: user_name.to_string(),
                    answer: answer.to_string(),
                }
            }
        }
    }

    async fn try_translate(&self, text: &str, target: &LanguageCode) -> AppResult<String> {
        let definition = self.prompts.get(ids::ANSWER_TRANSLATE)?;

        let mut variables = HashMap::new();
        variables.insert("text".to_string(), text.to_string());
        variables.insert("target_language".to_string(), target.as_str().to_string());
        let prompt = render_prompt(definition, &variables)?;

        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);
        let response = self.gateway.complete(&request).await?;

        let mut translated = response.content.trim().to_string();

        // The trailing emoji run is the answer's summary; if the model
        // dropped it, restore it from the source text
        let source_run = trailing_emoji_run(text);
        if !source_run.is_empty() && !ends_with_emoji(&translated) {
            tracing::debug!("Restoring trailing emoji run dropped by translation");
            translated = format!("{} {}", translated.trim_end(), source_run);
        }

        Ok(translated)
    }
}
