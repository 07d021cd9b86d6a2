//! Query-processing pipeline for the Consulta service.
//!
//! One request flows through four stages, strictly in order:
//! 1. Similarity search over the ingested document
//! 2. Language detection of the question
//! 3. Grounded answer generation (always in Spanish)
//! 4. Answer translation into the detected or requested language
//!
//! Stages 1-3 propagate failures to the caller unmodified; the translator
//! alone degrades gracefully, returning the untranslated answer in the
//! normal response shape. Each request owns its values end to end; the only
//! shared state is the read-only similarity index.

pub mod detector;
pub mod generator;
pub mod orchestrator;
pub mod translator;
pub mod types;

// Re-export main types
pub use detector::LanguageDetector;
pub use generator::AnswerGenerator;
pub use orchestrator::QueryPipeline;
pub use translator::AnswerTranslator;
pub use types::{LanguageCode, Query, QueryResponse};
