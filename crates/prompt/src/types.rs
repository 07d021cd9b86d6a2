//! Prompt definition types.

use serde::{Deserialize, Serialize};

/// A prompt template loaded from YAML.
///
/// The template body uses Handlebars placeholders; `variables` names the
/// placeholders a caller must supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier (e.g., "answer.generate")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Required template variables
    #[serde(default)]
    pub variables: Vec<String>,

    /// Template string with Handlebars syntax
    pub template: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: test.prompt
title: Test Prompt
apiVersion: "1.0"
variables: [question]
template: "Pregunta: {{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "test.prompt");
        assert_eq!(def.variables, vec!["question".to_string()]);
        assert!(def.template.contains("{{question}}"));
    }
}
