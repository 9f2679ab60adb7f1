//! Configuration management for the medbot CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (medbot.yaml)
//!
//! Credentials are never stored in the config file itself; provider sections
//! name the environment variable that holds the secret (`apiKeyEnv`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default number of passages retrieved per question.
pub const DEFAULT_TOP_K: usize = 10;

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands. It is built once at startup and passed
/// explicitly into the pipeline factory; nothing reads it as ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider (e.g., "gemini", "ollama")
    pub provider: String,

    /// Model identifier for the active LLM provider
    pub model: String,

    /// API key override for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Retrieval configuration (embedding + index + top-k)
    pub retrieval: RetrievalConfig,
}

/// LLM configuration from medbot.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Get the model name for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Gemini { model, .. } => model,
            Self::Ollama { model, .. } => model,
        }
    }

    /// Get the configured endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Gemini { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Get the per-request timeout in seconds, if configured.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::Gemini { timeout, .. } => *timeout,
            Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Retrieval configuration: how questions become evidence passages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum number of passages retrieved per question
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

/// Embedding provider configuration.
///
/// The embedding model must be the same one used to build the index;
/// keeping them consistent is the operator's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider identifier ("huggingface", "ollama", "mock")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Expected embedding dimensions
    pub dimensions: usize,

    /// Optional custom endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the provider API token
    #[serde(rename = "apiKeyEnv", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "huggingface".to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            endpoint: None,
            api_key_env: Some("HF_API_TOKEN".to_string()),
        }
    }
}

/// Vector index configuration.
///
/// The index is pre-built and externally maintained; medbot only queries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Provider identifier ("pinecone", "memory")
    pub provider: String,

    /// Index name (e.g., "medicalbot")
    pub name: String,

    /// Environment variable holding the index host URL
    #[serde(rename = "hostEnv", skip_serializing_if = "Option::is_none")]
    pub host_env: Option<String>,

    /// Environment variable holding the index API key
    #[serde(rename = "apiKeyEnv", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Optional index namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// For the in-memory index: directory of text passages to load
    #[serde(rename = "corpusDir", skip_serializing_if = "Option::is_none")]
    pub corpus_dir: Option<PathBuf>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: "pinecone".to_string(),
            name: "medicalbot".to_string(),
            host_env: Some("PINECONE_INDEX_HOST".to_string()),
            api_key_env: Some("PINECONE_API_KEY".to_string()),
            namespace: None,
            corpus_dir: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `MEDBOT_CONFIG`: Path to config file (default: ./medbot.yaml)
    /// - `MEDBOT_PROVIDER`: LLM provider
    /// - `MEDBOT_MODEL`: Model identifier
    /// - `MEDBOT_API_KEY`: LLM API key override
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None)
    }

    /// Load configuration with an explicitly chosen config file.
    ///
    /// The explicit path (e.g., from a `--config` flag) takes precedence
    /// over `MEDBOT_CONFIG`; both fall back to `./medbot.yaml`.
    pub fn load_with(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        config.config_file = config_file.or_else(|| {
            std::env::var("MEDBOT_CONFIG").ok().map(PathBuf::from)
        });

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("medbot.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("MEDBOT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MEDBOT_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("MEDBOT_API_KEY").ok();
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

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        top_k: Option<usize>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(top_k) = top_k {
            self.retrieval.top_k = top_k;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the active LLM provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the LLM API key from environment variables.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        // Explicit MEDBOT_API_KEY wins
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        // Provider-specific apiKeyEnv indirection
        if let Some(ProviderConfig::Gemini { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(&api_key_env) {
                return Some(key);
            }
        }

        // Conventional fallback for the default provider
        if provider == "gemini" {
            return std::env::var("GEMINI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration for the active providers.
    ///
    /// This is the startup gate: a config that fails here must not serve
    /// any request.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["gemini", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "gemini" && self.resolve_api_key("gemini").is_none() {
            return Err(AppError::Config(
                "Gemini provider requires an API key (set GEMINI_API_KEY or MEDBOT_API_KEY)"
                    .to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        let embedding = &self.retrieval.embedding;
        match embedding.provider.as_str() {
            "huggingface" => {
                let env_var = embedding
                    .api_key_env
                    .as_deref()
                    .unwrap_or("HF_API_TOKEN");
                if std::env::var(env_var).is_err() {
                    return Err(AppError::Config(format!(
                        "HuggingFace embedding provider requires token in environment variable: {}",
                        env_var
                    )));
                }
            }
            "ollama" | "mock" => {}
            other => {
                return Err(AppError::Config(format!(
                    "Unknown embedding provider: {}. Supported: huggingface, ollama, mock",
                    other
                )));
            }
        }

        let index = &self.retrieval.index;
        match index.provider.as_str() {
            "pinecone" => {
                for (label, env_var) in [
                    ("index host", index.host_env.as_deref()),
                    ("index API key", index.api_key_env.as_deref()),
                ] {
                    match env_var {
                        Some(var) if std::env::var(var).is_ok() => {}
                        Some(var) => {
                            return Err(AppError::Config(format!(
                                "Pinecone {} not found in environment variable: {}",
                                label, var
                            )));
                        }
                        None => {
                            return Err(AppError::Config(format!(
                                "Pinecone index requires {} configuration (hostEnv/apiKeyEnv)",
                                label
                            )));
                        }
                    }
                }
            }
            "memory" => {}
            other => {
                return Err(AppError::Config(format!(
                    "Unknown index provider: {}. Supported: pinecone, memory",
                    other
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.retrieval.top_k, DEFAULT_TOP_K);
        assert_eq!(config.retrieval.index.name, "medicalbot");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            Some(5),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert_eq!(overridden.retrieval.top_k, 5);
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
    fn test_validate_zero_top_k() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.retrieval.embedding.provider = "mock".to_string();
        config.retrieval.index.provider = "memory".to_string();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_local_stack() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.retrieval.embedding.provider = "mock".to_string();
        config.retrieval.index.provider = "memory".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medbot.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
      timeout: 60
retrieval:
  topK: 4
  embedding:
    provider: mock
    model: trigram-v1
    dimensions: 384
  index:
    provider: memory
    name: medicalbot
logging:
  level: debug
"#
        )
        .unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.model, "llama3.2");
        assert_eq!(merged.retrieval.top_k, 4);
        assert_eq!(merged.retrieval.embedding.provider, "mock");
        assert_eq!(merged.retrieval.index.provider, "memory");
        assert_eq!(merged.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_load_with_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(
            &path,
            r#"
retrieval:
  topK: 3
  embedding:
    provider: mock
    model: trigram-v1
    dimensions: 384
  index:
    provider: memory
    name: medicalbot
"#,
        )
        .unwrap();

        // A file named outside MEDBOT_CONFIG must still be merged
        let config = AppConfig::load_with(Some(path.clone())).unwrap();
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.index.provider, "memory");
    }

    #[test]
    fn test_merge_yaml_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medbot.yaml");
        std::fs::write(&path, "llm: [not a map").unwrap();

        let mut config = AppConfig::default();
        assert!(matches!(
            config.merge_yaml(&path),
            Err(AppError::Config(_))
        ));
    }
}
