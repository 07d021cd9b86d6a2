//! Prompt rendering.

use crate::types::PromptDefinition;
use consulta_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Render a prompt definition with the supplied variables.
///
/// Every variable the definition declares must be present; extra variables
/// are ignored. Rendering performs no HTML escaping since prompts are plain
/// text.
///
/// # Example
/// ```
/// use consulta_prompt::{render_prompt, PromptStore, ids};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = PromptStore::builtin()?;
/// let def = store.get(ids::LANGUAGE_DETECT)?;
///
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "How are you?".to_string());
///
/// let prompt = render_prompt(def, &vars)?;
/// assert!(prompt.contains("How are you?"));
/// # Ok(())
/// # }
/// ```
pub fn render_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    tracing::debug!("Rendering prompt: {}", definition.id);

    for var in &definition.variables {
        if !variables.contains_key(var) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' is missing required variable '{}'",
                definition.id, var
            )));
        }
    }

    render_template(&definition.template, variables)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ids, PromptStore};

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "¿Cómo estás?".to_string());

        let result = render_template("Pregunta: {{question}}", &vars);
        assert_eq!(result.unwrap(), "Pregunta: ¿Cómo estás?");
    }

    #[test]
    fn test_render_prompt_missing_variable() {
        let store = PromptStore::builtin().unwrap();
        let def = store.get(ids::ANSWER_GENERATE).unwrap();

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "test".to_string());
        // "context" deliberately absent

        let result = render_prompt(def, &vars);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("missing required variable 'context'"));
    }

    #[test]
    fn test_render_detect_prompt_embeds_question() {
        let store = PromptStore::builtin().unwrap();
        let def = store.get(ids::LANGUAGE_DETECT).unwrap();

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "How tall is the tower?".to_string());

        let prompt = render_prompt(def, &vars).unwrap();
        assert!(prompt.contains("Pregunta: How tall is the tower?"));
        assert!(prompt.contains("responde 'es' por defecto"));
    }

    #[test]
    fn test_render_does_not_escape_html() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "a < b && b > c?".to_string());

        let result = render_template("{{question}}", &vars).unwrap();
        assert_eq!(result, "a < b && b > c?");
    }

    #[test]
    fn test_render_translate_prompt() {
        let store = PromptStore::builtin().unwrap();
        let def = store.get(ids::ANSWER_TRANSLATE).unwrap();

        let mut vars = HashMap::new();
        vars.insert(
            "text".to_string(),
            "La torre mide 50 metros. 🏗️".to_string(),
        );
        vars.insert("target_language".to_string(), "en".to_string());

        let prompt = render_prompt(def, &vars).unwrap();
        assert!(prompt.contains("Texto: La torre mide 50 metros. 🏗️"));
        assert!(prompt.contains("Idioma destino: en"));
    }
}
