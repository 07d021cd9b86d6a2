//! Configuration management for the Consulta service.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.consulta/config.yaml)
//!
//! The configuration is workspace-centric: the index, prompt overrides, and
//! config file all live under `.consulta/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Environment variable holding the Cohere API key.
pub const DEFAULT_API_KEY_ENV: &str = "COHERE_API_KEY";

/// Main application configuration.
///
/// This struct holds all global configuration options that affect behavior
/// across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .consulta/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Gateway provider (e.g., "cohere", "ollama")
    pub provider: String,

    /// Model identifier for completions
    pub model: String,

    /// Optional custom gateway endpoint
    pub endpoint: Option<String>,

    /// Environment variable holding the gateway API key
    pub api_key_env: String,

    /// API key for the gateway provider (overrides `api_key_env`)
    pub api_key: Option<String>,

    /// Per-call timeout for gateway round-trips, in seconds
    pub gateway_timeout_secs: u64,

    /// Embedding provider ("cohere", "trigram")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimensions
    pub embedding_dimensions: usize,

    /// Number of fragments returned per similarity search
    pub top_k: usize,

    /// Path to the source document for ingestion
    pub document: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    gateway: Option<GatewayConfig>,
    embeddings: Option<EmbeddingsConfig>,
    index: Option<IndexConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GatewayConfig {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingsConfig {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexConfig {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    document: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "cohere".to_string(),
            model: "command-r-plus-04-2024".to_string(),
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            gateway_timeout_secs: 30,
            embedding_provider: "cohere".to_string(),
            embedding_model: "embed-english-v3.0".to_string(),
            embedding_dimensions: 1024,
            top_k: 4,
            document: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `CONSULTA_WORKSPACE`: Override workspace path
    /// - `CONSULTA_CONFIG`: Path to config file
    /// - `CONSULTA_PROVIDER`: Gateway provider
    /// - `CONSULTA_MODEL`: Model identifier
    /// - `CONSULTA_API_KEY`: Explicit API key (takes precedence)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("CONSULTA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("CONSULTA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".consulta/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("CONSULTA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CONSULTA_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("CONSULTA_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(gateway) = config_file.gateway {
            if let Some(provider) = gateway.provider {
                result.provider = provider;
            }
            if let Some(model) = gateway.model {
                result.model = model;
            }
            if let Some(endpoint) = gateway.endpoint {
                result.endpoint = Some(endpoint);
            }
            if let Some(api_key_env) = gateway.api_key_env {
                result.api_key_env = api_key_env;
            }
            if let Some(timeout) = gateway.timeout_secs {
                result.gateway_timeout_secs = timeout;
            }
        }

        if let Some(embeddings) = config_file.embeddings {
            if let Some(provider) = embeddings.provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = embeddings.model {
                result.embedding_model = model;
            }
            if let Some(dimensions) = embeddings.dimensions {
                result.embedding_dimensions = dimensions;
            }
        }

        if let Some(index) = config_file.index {
            if let Some(top_k) = index.top_k {
                result.top_k = top_k;
            }
            if let Some(document) = index.document {
                result.document = Some(PathBuf::from(document));
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .consulta directory.
    pub fn consulta_dir(&self) -> PathBuf {
        self.workspace.join(".consulta")
    }

    /// Get the path to the SQLite fragment store.
    pub fn index_path(&self) -> PathBuf {
        self.consulta_dir().join("index.db")
    }

    /// Get the directory holding prompt template overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.consulta_dir().join("prompts")
    }

    /// Ensure the .consulta directory exists.
    pub fn ensure_consulta_dir(&self) -> AppResult<()> {
        let dir = self.consulta_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .consulta directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolve the gateway API key.
    ///
    /// An explicit `CONSULTA_API_KEY` takes precedence; otherwise the
    /// configured provider environment variable is consulted.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        std::env::var(&self.api_key_env).ok()
    }

    /// Validate configuration for the active providers.
    ///
    /// Hosted providers require an API key in the environment; a missing key
    /// is a configuration error rather than a runtime failure.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["cohere", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        let known_embedders = ["cohere", "trigram"];
        if !known_embedders.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                known_embedders.join(", ")
            )));
        }

        let needs_key = self.provider == "cohere" || self.embedding_provider == "cohere";
        if needs_key && self.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.api_key_env
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config(
                "index.topK must be at least 1".to_string(),
            ));
        }

        if self.embedding_dimensions == 0 {
            return Err(AppError::Config(
                "embeddings.dimensions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "cohere");
        assert_eq!(config.model, "command-r-plus-04-2024");
        assert_eq!(config.top_k, 4);
        assert_eq!(config.gateway_timeout_secs, 30);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_consulta_paths() {
        let config = AppConfig::default();
        assert!(config.consulta_dir().ends_with(".consulta"));
        assert!(config.index_path().ends_with(".consulta/index.db"));
        assert!(config.prompts_dir().ends_with(".consulta/prompts"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama_with_trigram() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.embedding_provider = "trigram".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_cohere_requires_key() {
        let mut config = AppConfig::default();
        config.api_key_env = "CONSULTA_TEST_MISSING_KEY".to_string();
        assert!(config.validate().is_err());

        config.api_key = Some("test-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = AppConfig::default();
        config.api_key = Some("test-key".to_string());
        config.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_embedding_dimensions() {
        let mut config = AppConfig::default();
        config.api_key = Some("test-key".to_string());
        config.embedding_dimensions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_yaml() {
        let yaml = r#"
gateway:
  provider: ollama
  model: llama3.2
  timeoutSecs: 10
embeddings:
  provider: trigram
  dimensions: 384
index:
  topK: 6
  document: docs/manual.md
logging:
  level: debug
  color: false
"#;
        let dir = std::env::temp_dir().join("consulta-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, yaml).unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "llama3.2");
        assert_eq!(merged.gateway_timeout_secs, 10);
        assert_eq!(merged.embedding_provider, "trigram");
        assert_eq!(merged.embedding_dimensions, 384);
        assert_eq!(merged.top_k, 6);
        assert_eq!(merged.document, Some(PathBuf::from("docs/manual.md")));
        assert_eq!(merged.log_level, Some("debug".to_string()));
        assert!(merged.no_color);
    }
}
