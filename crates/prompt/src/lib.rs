//! Prompt system for the Consulta service.
//!
//! Prompt templates are versioned configuration data rather than string
//! literals buried in the pipeline: each template is a YAML definition with
//! named Handlebars placeholders, loaded into a [`PromptStore`] and injected
//! into the pipeline components. This keeps prompt formatting testable
//! independently of gateway invocation, and lets a workspace override any
//! built-in template from `.consulta/prompts/`.

pub mod builder;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::render_prompt;
pub use store::{ids, PromptStore};
pub use types::PromptDefinition;
