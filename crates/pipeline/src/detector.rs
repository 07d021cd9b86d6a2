//! Query language detection.
//!
//! Classifies the question's language with a fixed few-shot prompt. The
//! "default to 'es' when unsure" policy lives inside the prompt itself; the
//! code only normalizes the raw completion defensively.

use crate::types::LanguageCode;
use consulta_core::AppResult;
use consulta_llm::{LlmClient, LlmRequest};
use consulta_prompt::{ids, render_prompt, PromptStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Language detector backed by the gateway.
pub struct LanguageDetector {
    gateway: Arc<dyn LlmClient>,
    prompts: Arc<PromptStore>,
    model: String,
}

impl LanguageDetector {
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

    /// Detect the language of `question`.
    ///
    /// Gateway failures propagate; there is no fallback at this stage.
    pub async fn detect(&self, question: &str) -> AppResult<LanguageCode> {
        let definition = self.prompts.get(ids::LANGUAGE_DETECT)?;

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        let prompt = render_prompt(definition, &variables)?;

        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);
        let response = self.gateway.complete(&request).await?;

        let language = LanguageCode::normalize(&response.content);
        tracing::info!("Detected query language: {}", language);

        Ok(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;

    fn detector(gateway: MockGateway) -> (Arc<MockGateway>, LanguageDetector) {
        let gateway = Arc::new(gateway);
        let prompts = Arc::new(PromptStore::builtin().unwrap());
        let detector = LanguageDetector::new(gateway.clone(), prompts, "test-model");
        (gateway, detector)
    }

    #[tokio::test]
    async fn test_detect_english() {
        let (gateway, detector) = detector(MockGateway::with_responses(vec![Ok("en")]));

        let language = detector.detect("How tall is the tower?").await.unwrap();
        assert_eq!(language.as_str(), "en");

        // The live question is embedded after the few-shot examples
        let prompts = gateway.seen_prompts();
        assert!(prompts[0].contains("Pregunta: How tall is the tower?"));
        assert!(prompts[0].contains("responde 'es' por defecto"));
    }

    #[tokio::test]
    async fn test_detect_normalizes_messy_completion() {
        let (_, detector) = detector(MockGateway::with_responses(vec![Ok("  ES \n")]));
        let language = detector.detect("¿Cuánto mide la torre?").await.unwrap();
        assert_eq!(language.as_str(), "es");
    }

    #[tokio::test]
    async fn test_detect_prose_defaults_to_base() {
        let (_, detector) =
            detector(MockGateway::with_responses(vec![Ok("I think it is English")]));
        let language = detector.detect("hmm").await.unwrap();
        assert!(language.is_base());
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let (_, detector) = detector(MockGateway::with_responses(vec![Err("backend down")]));
        let result = detector.detect("¿Cómo estás?").await;
        assert!(result.is_err());
    }
}
