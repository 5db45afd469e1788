use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{PolyglotError, Result};

// Default values for optional engine settings
fn default_source_language() -> String {
    "eng_Latn".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_verify_on_load() -> bool {
    true
}

fn default_api_token_env() -> String {
    "HF_TOKEN".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub languages: LanguagesConfig,
    pub engine: EngineConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesConfig {
    /// Path to the JSON language table
    pub path: PathBuf,
    /// What to do when two records share a display name
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// LastWins: a later record replaces an earlier one with the same name
    #[default]
    LastWins,
    /// Reject: loading fails on the first repeated name
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the inference endpoint
    pub endpoint: String,
    /// Primary translation model
    pub model: String,
    /// Smaller model used when the alternate option is selected
    pub alternate_model: String,
    /// Compute device: auto, cpu, cuda or cuda:N
    pub device: String,
    /// FLORES-200 code of the source text
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Probe the model status when an engine is constructed
    #[serde(default = "default_verify_on_load")]
    pub verify_on_load: bool,
    /// Environment variable holding the bearer token, if any
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP service binds to
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: LanguagesConfig {
                path: PathBuf::from("language.json"),
                duplicates: DuplicatePolicy::LastWins,
            },
            engine: EngineConfig {
                endpoint: "https://api-inference.huggingface.co".to_string(),
                model: "facebook/nllb-200-distilled-600M".to_string(),
                alternate_model: "Helsinki-NLP/opus-mt-en-ROMANCE".to_string(),
                device: "auto".to_string(),
                source_language: default_source_language(),
                timeout_secs: default_timeout_secs(),
                verify_on_load: default_verify_on_load(),
                api_token_env: default_api_token_env(),
            },
            server: ServerConfig {
                bind: "127.0.0.1:8080".to_string(),
            },
        }
    }
}

impl EngineConfig {
    /// Read the bearer token from the configured environment variable
    pub fn api_token(&self) -> Option<String> {
        std::env::var(&self.api_token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PolyglotError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| PolyglotError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PolyglotError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| PolyglotError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polyglot.toml");

        let mut config = Config::default();
        config.languages.duplicates = DuplicatePolicy::Reject;
        config.engine.device = "cuda:1".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.languages.duplicates, DuplicatePolicy::Reject);
        assert_eq!(loaded.engine.device, "cuda:1");
        assert_eq!(loaded.engine.model, "facebook/nllb-200-distilled-600M");
    }

    #[test]
    fn test_optional_engine_fields_use_defaults() {
        let toml = r#"
            [languages]
            path = "langs.json"

            [engine]
            endpoint = "http://localhost:9000"
            model = "facebook/nllb-200-distilled-600M"
            alternate_model = "Helsinki-NLP/opus-mt-en-ROMANCE"
            device = "cpu"

            [server]
            bind = "0.0.0.0:8080"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.languages.duplicates, DuplicatePolicy::LastWins);
        assert_eq!(config.engine.source_language, "eng_Latn");
        assert_eq!(config.engine.timeout_secs, 300);
        assert!(config.engine.verify_on_load);
        assert_eq!(config.engine.api_token_env, "HF_TOKEN");
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = Config::from_file("/nonexistent/polyglot.toml").unwrap_err();
        assert!(matches!(err, PolyglotError::Config(_)));
    }
}
