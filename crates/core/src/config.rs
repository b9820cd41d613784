//! Configuration management for docsqa.
//!
//! Settings are loaded from a YAML file and then overridden by environment
//! variables. Every section has defaults so a missing or partial file still
//! yields a runnable configuration.
//!
//! Resolution order for the config file:
//! 1. explicit path argument
//! 2. `DOCSQA_CONFIG` environment variable
//! 3. `config/docsqa.yaml`
//! 4. `config/docsqa.example.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Storage engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("docsqa.db"),
        }
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name ("ollama" or "mock")
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Embedding dimensions, fixed per deployment
    pub dimensions: usize,
    /// Base URL for HTTP providers
    pub base_url: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            base_url: None,
        }
    }
}

/// Reranker model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerSettings {
    /// Provider name ("cohere" or "mock")
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Minimum interval between provider calls, in milliseconds.
    /// Zero disables the gate.
    pub min_interval_ms: u64,
}

impl Default for RerankerSettings {
    fn default() -> Self {
        Self {
            provider: "cohere".to_string(),
            model: "rerank-multilingual-v3.0".to_string(),
            api_key_env: "COHERE_API_KEY".to_string(),
            min_interval_ms: 0,
        }
    }
}

/// LLM configuration for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name ("ollama" or "mock")
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Base URL for HTTP providers
    pub base_url: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            base_url: None,
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

/// Vision model configuration (image descriptions at ingestion time).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Provider name ("ollama" or "mock")
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Base URL for HTTP providers
    pub base_url: Option<String>,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llava".to_string(),
            base_url: None,
        }
    }
}

/// Query scope validator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Whether scope validation runs at all
    pub enabled: bool,
    /// Provider name for the classifier LLM
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Base URL for HTTP providers
    pub base_url: Option<String>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            base_url: None,
        }
    }
}

/// All model configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsSettings {
    pub embedding: EmbeddingSettings,
    pub reranker: RerankerSettings,
    pub llm: LlmSettings,
    pub vision: VisionSettings,
    pub validator: ValidatorSettings,
}

/// Hybrid search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridSearchSettings {
    /// Weight for the vector-similarity signal
    pub vector_weight: f32,
    /// Weight for the keyword-relevance signal
    pub keyword_weight: f32,
    /// Candidate cap per sub-search
    pub top_k_candidates: usize,
}

impl Default for HybridSearchSettings {
    fn default() -> Self {
        Self {
            vector_weight: 0.7,
            keyword_weight: 0.3,
            top_k_candidates: 25,
        }
    }
}

/// Evidence filtering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceSettings {
    /// Absolute rerank-score quality gate
    pub min_score: f32,
    /// Source counts at or below this are insufficient
    pub insufficient_threshold: usize,
    /// Upper bound (exclusive) of the medium band
    pub medium_threshold: usize,
    /// Upper bound (exclusive) of the high band
    pub high_threshold: usize,
    /// Hard cap on returned sources
    pub max_sources: usize,
}

impl Default for EvidenceSettings {
    fn default() -> Self {
        Self {
            min_score: 0.75,
            insufficient_threshold: 2,
            medium_threshold: 2,
            high_threshold: 3,
            max_sources: 5,
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub hybrid: HybridSearchSettings,
    pub evidence: EvidenceSettings,
}

/// Ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// Directory scanned for markdown documents
    pub docs_dir: PathBuf,
    /// Base URL of the deployed documentation, used to build section links
    pub docs_base_url: Option<String>,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            docs_base_url: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log level when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub models: ModelsSettings,
    pub search: SearchSettings,
    pub ingestion: IngestionSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from a YAML file, falling back to defaults when no
    /// file is found, then apply environment overrides.
    pub fn load(config_path: Option<&Path>) -> AppResult<Self> {
        let mut settings = match Self::resolve_path(config_path) {
            Some(path) => Self::from_yaml(&path)?,
            None => Self::default(),
        };

        // Environment variables override YAML values
        if let Ok(db_path) = std::env::var("DOCSQA_DB_PATH") {
            settings.database.path = PathBuf::from(db_path);
        }
        if let Ok(docs_dir) = std::env::var("DOCSQA_DOCS_DIR") {
            settings.ingestion.docs_dir = PathBuf::from(docs_dir);
        }

        Ok(settings)
    }

    /// Parse a YAML settings file.
    pub fn from_yaml(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    fn resolve_path(config_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var("DOCSQA_CONFIG") {
            return Some(PathBuf::from(path));
        }
        for candidate in ["config/docsqa.yaml", "config/docsqa.example.yaml"] {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Model identifiers reported in query responses and traces, keyed by
    /// capability name.
    pub fn models_used(&self) -> std::collections::HashMap<String, String> {
        let m = &self.models;
        [
            ("embedder", format!("{}:{}", m.embedding.provider, m.embedding.model)),
            ("reranker", format!("{}:{}", m.reranker.provider, m.reranker.model)),
            ("llm", format!("{}:{}", m.llm.provider, m.llm.model)),
            ("vision", format!("{}:{}", m.vision.provider, m.vision.model)),
            ("validator", format!("{}:{}", m.validator.provider, m.validator.model)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.search.hybrid.vector_weight, 0.7);
        assert_eq!(settings.search.hybrid.keyword_weight, 0.3);
        assert_eq!(settings.search.hybrid.top_k_candidates, 25);
        assert_eq!(settings.search.evidence.min_score, 0.75);
        assert_eq!(settings.search.evidence.insufficient_threshold, 2);
        assert_eq!(settings.search.evidence.medium_threshold, 2);
        assert_eq!(settings.search.evidence.high_threshold, 3);
        assert_eq!(settings.search.evidence.max_sources, 5);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "search:\n  hybrid:\n    vector_weight: 0.5\n    keyword_weight: 0.5"
        )
        .unwrap();

        let settings = Settings::from_yaml(file.path()).unwrap();
        assert_eq!(settings.search.hybrid.vector_weight, 0.5);
        // Untouched sections keep their defaults
        assert_eq!(settings.search.hybrid.top_k_candidates, 25);
        assert_eq!(settings.search.evidence.max_sources, 5);
    }

    #[test]
    fn test_models_used_keys() {
        let settings = Settings::default();
        let used = settings.models_used();
        for key in ["embedder", "reranker", "llm", "vision", "validator"] {
            assert!(used.contains_key(key), "missing {}", key);
        }
        assert_eq!(used["embedder"], "ollama:nomic-embed-text");
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "search: [not, a, map").unwrap();
        let err = Settings::from_yaml(file.path()).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }
}
