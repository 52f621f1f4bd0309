use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use rfpcat_core::config::{LlmConfig, OllamaConfig, OutlineConfig, DEFAULT_HEADING_MARKER};

/// CLI configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default LLM provider name (openai, anthropic, ollama)
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model per provider
    #[serde(default)]
    pub default_models: HashMap<String, String>,

    /// API keys keyed by provider name
    #[serde(default)]
    pub api_keys: HashMap<String, String>,

    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// OpenAI-compatible base URL
    #[serde(default = "default_openai_url")]
    pub openai_base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion budget for one categorization
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Line prefix that marks section headings in categorized text
    #[serde(default = "default_heading_marker")]
    pub heading_marker: String,

    /// Default server URL for remote mode
    #[serde(default)]
    pub server_url: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_heading_marker() -> String {
    DEFAULT_HEADING_MARKER.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_models: HashMap::new(),
            api_keys: HashMap::new(),
            ollama_url: default_ollama_url(),
            openai_base_url: default_openai_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            heading_marker: default_heading_marker(),
            server_url: None,
        }
    }
}

impl CliConfig {
    /// Return the default config directory path: ~/.config/rfpcat/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("rfpcat");
        Ok(config_dir)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load config from the given path, or the default path.
    /// Writes and returns the default config if the file does not exist.
    ///
    /// A `HEADING_MARKER` set in the environment replaces the file's marker,
    /// the same variable the server reads.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = Self::load_file(path)?;
        Ok(config.with_marker_override(OutlineConfig::env_marker()))
    }

    fn with_marker_override(mut self, marker: Option<String>) -> Self {
        if let Some(marker) = marker {
            debug!(%marker, "heading marker taken from environment");
            self.heading_marker = marker;
        }
        self
    }

    fn load_file(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            debug!(?config_path, "Loading config");
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config: {}", config_path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
            Ok(config)
        } else {
            debug!(?config_path, "Config file not found, using defaults");
            let config = Self::default();
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let toml_str = toml::to_string_pretty(&config)
                .context("failed to serialize default config")?;
            std::fs::write(&config_path, toml_str).ok();
            Ok(config)
        }
    }

    /// Resolve an API key for the given provider.
    /// Priority: cli_override > env var > config file.
    pub fn resolve_api_key(&self, provider: &str, cli_override: Option<&str>) -> Option<String> {
        if let Some(key) = cli_override {
            return Some(key.to_string());
        }

        let env_var = match provider {
            "claude" | "anthropic" => "ANTHROPIC_API_KEY",
            "openai" => "OPENAI_API_KEY",
            _ => return self.api_keys.get(provider).cloned(),
        };
        if let Ok(key) = std::env::var(env_var) {
            if !key.is_empty() {
                return Some(key);
            }
        }

        self.api_keys.get(provider).cloned()
    }

    /// Resolve the model name for a provider.
    /// Priority: cli_override > config file > provider default.
    pub fn resolve_model(&self, provider: &str, cli_override: Option<&str>) -> String {
        if let Some(model) = cli_override {
            return model.to_string();
        }
        if let Some(model) = self.default_models.get(provider) {
            return model.clone();
        }
        match provider {
            "claude" | "anthropic" => "claude-sonnet-4-5-20250929".to_string(),
            "openai" => "gpt-3.5-turbo".to_string(),
            "ollama" => "llama3.2".to_string(),
            _ => "default".to_string(),
        }
    }

    /// Provider settings in the shape `rfpcat-llm` builds providers from.
    pub fn provider_configs(
        &self,
        provider: &str,
        model: &str,
        api_key: Option<String>,
    ) -> (LlmConfig, OllamaConfig) {
        let is_anthropic = matches!(provider, "claude" | "anthropic");
        let llm = LlmConfig {
            provider: provider.to_string(),
            openai_api_key: if is_anthropic { None } else { api_key.clone() },
            openai_model: model.to_string(),
            openai_base_url: Some(self.openai_base_url.clone()),
            anthropic_api_key: if is_anthropic { api_key } else { None },
            anthropic_model: model.to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let ollama = OllamaConfig {
            url: self.ollama_url.clone(),
            model: model.to_string(),
        };
        (llm, ollama)
    }
}
