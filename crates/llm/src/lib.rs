//! Language-model gateway crate for the Consulta service.
//!
//! This crate provides a provider-agnostic abstraction for submitting a
//! prompt to a text-generation backend and receiving a completion. The
//! gateway is treated as synchronous and stateless: one prompt in, one
//! completion out, no session or context across calls.
//!
//! # Providers
//! - **Cohere**: hosted chat API (default)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use consulta_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{CohereClient, OllamaClient};
