//! Prompt store: built-in definitions plus workspace overrides.

use crate::types::PromptDefinition;
use consulta_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// Identifiers of the built-in pipeline prompts.
pub mod ids {
    /// Few-shot language classification of the user's question.
    pub const LANGUAGE_DETECT: &str = "language.detect";

    /// Grounded answer generation from retrieved fragments.
    pub const ANSWER_GENERATE: &str = "answer.generate";

    /// Few-shot answer translation into the target language.
    pub const ANSWER_TRANSLATE: &str = "answer.translate";
}

/// Built-in template sources, embedded at compile time.
const BUILTIN_TEMPLATES: &[&str] = &[
    include_str!("../templates/language_detect.yml"),
    include_str!("../templates/answer_generate.yml"),
    include_str!("../templates/answer_translate.yml"),
];

/// A collection of prompt definitions keyed by id.
///
/// Constructed once at startup from the embedded defaults, optionally
/// overlaid with workspace-local YAML files, then shared read-only with the
/// pipeline components.
#[derive(Debug, Clone)]
pub struct PromptStore {
    definitions: HashMap<String, PromptDefinition>,
}

impl PromptStore {
    /// Build the store from the embedded default templates.
    pub fn builtin() -> AppResult<Self> {
        let mut definitions = HashMap::new();

        for source in BUILTIN_TEMPLATES {
            let definition: PromptDefinition = serde_yaml::from_str(source).map_err(|e| {
                AppError::Prompt(format!("Failed to parse built-in prompt: {}", e))
            })?;
            validate_prompt(&definition)?;
            definitions.insert(definition.id.clone(), definition);
        }

        Ok(Self { definitions })
    }

    /// Overlay definitions from a workspace prompts directory.
    ///
    /// Each `<id>.yml` file in `dir` replaces the built-in definition with
    /// the same id (or adds a new one). A missing directory is not an error.
    ///
    /// Returns the number of overrides applied.
    pub fn load_overrides(&mut self, dir: &Path) -> AppResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut applied = 0;

        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("yml") {
                continue;
            }

            let contents = std::fs::read_to_string(path).map_err(|e| {
                AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
            })?;

            let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
                AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e))
            })?;

            validate_prompt(&definition)?;

            tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
            self.definitions.insert(definition.id.clone(), definition);
            applied += 1;
        }

        Ok(applied)
    }

    /// Look up a prompt definition by id.
    pub fn get(&self, id: &str) -> AppResult<&PromptDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt id: {}", id)))
    }

    /// List all known prompt ids.
    pub fn prompt_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.definitions.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    // Every declared variable must appear as a placeholder in the template
    for var in &def.variables {
        let placeholder = format!("{{{{{}}}}}", var);
        if !def.template.contains(&placeholder) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' declares variable '{}' but the template has no {} placeholder",
                def.id, var, placeholder
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_store_has_pipeline_prompts() {
        let store = PromptStore::builtin().unwrap();
        assert!(store.get(ids::LANGUAGE_DETECT).is_ok());
        assert!(store.get(ids::ANSWER_GENERATE).is_ok());
        assert!(store.get(ids::ANSWER_TRANSLATE).is_ok());
        assert_eq!(store.prompt_ids().len(), 3);
    }

    #[test]
    fn test_builtin_detect_prompt_carries_default_instruction() {
        // The "es" fallback is a product decision baked into the prompt
        let store = PromptStore::builtin().unwrap();
        let def = store.get(ids::LANGUAGE_DETECT).unwrap();
        assert!(def.template.contains("responde 'es' por defecto"));
        assert!(def.template.contains("{{question}}"));
    }

    #[test]
    fn test_builtin_generate_prompt_mandates_spanish() {
        let store = PromptStore::builtin().unwrap();
        let def = store.get(ids::ANSWER_GENERATE).unwrap();
        assert!(def.template.contains("Genera la respuesta en español."));
        assert!(def.template.contains("tercera persona"));
        assert!(def.template.contains("{{context}}"));
    }

    #[test]
    fn test_builtin_translate_prompt_preserves_emoji_instruction() {
        let store = PromptStore::builtin().unwrap();
        let def = store.get(ids::ANSWER_TRANSLATE).unwrap();
        assert!(def.template.contains("manteniendo los emojis al final"));
        assert!(def.template.contains("{{target_language}}"));
    }

    #[test]
    fn test_unknown_prompt_id() {
        let store = PromptStore::builtin().unwrap();
        assert!(store.get("does.not.exist").is_err());
    }

    #[test]
    fn test_load_overrides_replaces_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let content = r#"
id: language.detect
title: Custom detection
apiVersion: "1.1"
variables: [question]
template: "Detecta: {{question}}"
"#;
        fs::write(temp_dir.path().join("language_detect.yml"), content).unwrap();

        let mut store = PromptStore::builtin().unwrap();
        let applied = store.load_overrides(temp_dir.path()).unwrap();

        assert_eq!(applied, 1);
        let def = store.get(ids::LANGUAGE_DETECT).unwrap();
        assert_eq!(def.title, "Custom detection");
    }

    #[test]
    fn test_load_overrides_missing_dir() {
        let mut store = PromptStore::builtin().unwrap();
        let applied = store
            .load_overrides(Path::new("/nonexistent/prompts"))
            .unwrap();
        assert_eq!(applied, 0);
    }

    #[test]
    fn test_validate_rejects_undeclared_placeholder() {
        let def = PromptDefinition {
            id: "bad.prompt".to_string(),
            title: "Bad".to_string(),
            api_version: "1.0".to_string(),
            variables: vec!["question".to_string()],
            template: "No placeholder here".to_string(),
        };
        assert!(validate_prompt(&def).is_err());
    }
}
