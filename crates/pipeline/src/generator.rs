//! Grounded answer generation.
//!
//! Produces a one-sentence Spanish answer from the retrieved fragments,
//! regardless of the query language. Keeping generation in a single
//! canonical language keeps the prompt grounded and easy to evaluate;
//! translation happens in the next stage.

use consulta_core::AppResult;
use consulta_llm::{LlmClient, LlmRequest};
use consulta_prompt::{ids, render_prompt, PromptStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Separator between context fragments in the prompt.
const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Answer generator backed by the gateway.
pub struct AnswerGenerator {
    gateway: Arc<dyn LlmClient>,
    prompts: Arc<PromptStore>,
    model: String,
}

impl AnswerGenerator {
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

    /// Generate a grounded answer to `question` from `context`.
    ///
    /// Empty context is valid: the prompt instructs the model to say it
    /// does not know when the fragments do not support an answer. Gateway
    /// failures propagate; there is no fallback at this stage.
    pub async fn generate(&self, question: &str, context: &[String]) -> AppResult<String> {
        let definition = self.prompts.get(ids::ANSWER_GENERATE)?;

        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), context.join(FRAGMENT_SEPARATOR));
        let prompt = render_prompt(definition, &variables)?;

        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);
        let response = self.gateway.complete(&request).await?;

        let answer = response.content.trim().to_string();
        tracing::debug!("Generated answer ({} bytes)", answer.len());

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;

    fn generator(gateway: MockGateway) -> (Arc<MockGateway>, AnswerGenerator) {
        let gateway = Arc::new(gateway);
        let prompts = Arc::new(PromptStore::builtin().unwrap());
        let generator = AnswerGenerator::new(gateway.clone(), prompts, "test-model");
        (gateway, generator)
    }

    #[tokio::test]
    async fn test_generate_with_context() {
        let (gateway, generator) = generator(MockGateway::with_responses(vec![Ok(
            "La torre mide 50 metros. 🏗️",
        )]));

        let context = vec![
            "The tower is 50 meters tall.".to_string(),
            "It was built in 1920.".to_string(),
        ];
        let answer = generator
            .generate("How tall is the tower?", &context)
            .await
            .unwrap();

        assert_eq!(answer, "La torre mide 50 metros. 🏗️");

        // Fragments are joined with a blank line inside the prompt
        let prompts = gateway.seen_prompts();
        assert!(prompts[0].contains("The tower is 50 meters tall.\n\nIt was built in 1920."));
        assert!(prompts[0].contains("Pregunta: How tall is the tower?"));
    }

    #[tokio::test]
    async fn test_generate_with_empty_context() {
        let (gateway, generator) =
            generator(MockGateway::with_responses(vec![Ok("No lo sé. 🤷")]));

        let answer = generator.generate("¿Cuánto pesa la luna?", &[]).await.unwrap();
        assert_eq!(answer, "No lo sé. 🤷");

        let prompts = gateway.seen_prompts();
        assert!(prompts[0].contains("Contexto: \n"));
    }

    #[tokio::test]
    async fn test_generate_trims_completion() {
        let (_, generator) = generator(MockGateway::with_responses(vec![Ok(
            "\n  La torre mide 50 metros. 🏗️  \n",
        )]));

        let answer = generator.generate("altura?", &[]).await.unwrap();
        assert_eq!(answer, "La torre mide 50 metros. 🏗️");
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let (_, generator) = generator(MockGateway::with_responses(vec![Err("timeout")]));
        let result = generator.generate("pregunta", &[]).await;
        assert!(result.is_err());
    }
}
